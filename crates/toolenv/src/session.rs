// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Activation of an environment into a ready session.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::environment::{EnvMap, apply_ops, flatten_vars, generate_startup_script};
use crate::materialize::{AggregateEnvironment, join_paths, materialize};
use crate::{DEFAULT_SHELL, EnvironmentDescriptor};

#[cfg(test)]
#[path = "./session_test.rs"]
mod session_test;

/// Sources the init script and dumps the resulting environment.
///
/// `$1` is the script, `$2` the file receiving `env -0` output. The output
/// path is saved first so the script may freely reset positional parameters.
const INIT_WRAPPER: &str = r#"__toolenv_env_out="$2"
. "$1" || exit $?
command -p env -0 > "$__toolenv_env_out"
"#;

/// Variables maintained by the shell itself rather than the init script.
const SHELL_INTERNAL_VARS: &[&str] = &["PWD", "OLDPWD", "SHLVL", "_"];

/// Options for activation.
#[derive(Debug, Clone)]
pub struct ActivateOptions {
    /// Shell used to run the init script.
    pub shell: PathBuf,
    /// Environment to start from; the process environment when unset.
    pub base_env: Option<EnvMap>,
}

impl Default for ActivateOptions {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            base_env: None,
        }
    }
}

/// Outcome of running the init script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    Failed { code: Option<i32>, message: String },
}

/// An activated environment.
#[derive(Debug, Clone)]
pub struct Session {
    pub name: String,
    pub aggregate: AggregateEnvironment,
    /// Environment the session started from.
    pub base_env: EnvMap,
    /// Environment after activation.
    pub env: EnvMap,
    /// Output of the init script.
    pub stdout: String,
    pub stderr: String,
    pub status: SessionStatus,
}

impl Session {
    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    /// Shell statements reproducing this session on top of its base environment.
    pub fn startup_script(&self) -> String {
        generate_startup_script(&self.base_env, &self.env)
    }

    /// Convert a failed session into an error.
    pub fn into_ready(self) -> crate::Result<Self> {
        match &self.status {
            SessionStatus::Ready => Ok(self),
            SessionStatus::Failed { message, .. } => Err(crate::Error::InitFailed {
                name: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Build the pre-init environment for a materialized descriptor.
pub fn prepare_env(
    descriptor: &EnvironmentDescriptor,
    aggregate: &AggregateEnvironment,
    base: &EnvMap,
) -> EnvMap {
    let mut env = base.clone();

    env.insert("TOOLENV_NAME".to_string(), descriptor.name.clone());
    env.insert("TOOLENV_PATHS".to_string(), aggregate.joined_paths());

    let bins: Vec<PathBuf> = aggregate.bin_dirs().collect();
    let mut path = join_paths(bins.iter().map(PathBuf::as_path));
    if let Some(existing) = base.get("PATH").filter(|p| !p.is_empty()) {
        if !path.is_empty() {
            path.push(':');
        }
        path.push_str(existing);
    }
    if !path.is_empty() {
        env.insert("PATH".to_string(), path);
    }

    env.insert(
        "TOOLENV_SYSTEM".to_string(),
        std::env::consts::OS.to_lowercase(),
    );
    env.insert(
        "TOOLENV_ARCH".to_string(),
        std::env::consts::ARCH.to_lowercase(),
    );

    env.extend(flatten_vars(&descriptor.vars));
    apply_ops(&mut env, &descriptor.environment);
    env
}

/// Materialize a descriptor and run its init script.
///
/// Resolution errors are returned as errors. A failing init script yields a
/// session whose status is [`SessionStatus::Failed`].
pub async fn activate<C: Catalog + ?Sized>(
    descriptor: &EnvironmentDescriptor,
    catalog: &C,
    options: &ActivateOptions,
) -> crate::Result<Session> {
    let aggregate = materialize(descriptor, catalog)?;
    let base_env = options
        .base_env
        .clone()
        .unwrap_or_else(|| std::env::vars().collect());
    let prepared = prepare_env(descriptor, &aggregate, &base_env);

    let mut session = Session {
        name: descriptor.name.clone(),
        aggregate,
        base_env,
        env: prepared,
        stdout: String::new(),
        stderr: String::new(),
        status: SessionStatus::Ready,
    };

    let Some(init) = &descriptor.init else {
        tracing::info!(env = %session.name, "activated");
        return Ok(session);
    };

    let tmp_dir = TempDir::new()?;
    let script_path = tmp_dir.path().join("init.sh");
    let env_path = tmp_dir.path().join("env.out");
    tokio::fs::write(&script_path, init).await?;

    tracing::debug!(env = %session.name, shell = %options.shell.display(), "running init script");
    let output = tokio::process::Command::new(&options.shell)
        .arg("-c")
        .arg(INIT_WRAPPER)
        .arg("toolenv-init")
        .arg(&script_path)
        .arg(&env_path)
        .env_clear()
        .envs(&session.env)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| crate::Error::InitFailed {
            name: session.name.clone(),
            message: format!("could not start {}: {e}", options.shell.display()),
        })?;

    session.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    session.stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let code = output.status.code();
        let message = match session.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => line.trim().to_string(),
            None => match code {
                Some(code) => format!("init script exited with status {code}"),
                None => "init script was terminated by a signal".to_string(),
            },
        };
        tracing::warn!(env = %session.name, ?code, "init script failed");
        session.status = SessionStatus::Failed { code, message };
        return Ok(session);
    }

    let dumped = match tokio::fs::read(&env_path).await {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => {
            session.status = SessionStatus::Failed {
                code: output.status.code(),
                message: "init script exited before its environment could be captured"
                    .to_string(),
            };
            return Ok(session);
        }
    };

    let mut captured = parse_env_dump(&dumped);
    for name in SHELL_INTERNAL_VARS {
        match session.env.get(*name) {
            Some(value) => {
                captured.insert(name.to_string(), value.clone());
            }
            None => {
                captured.remove(*name);
            }
        }
    }
    session.env = captured;

    tracing::info!(env = %session.name, "activated");
    Ok(session)
}

/// Parse NUL-separated `NAME=value` entries.
fn parse_env_dump(bytes: &[u8]) -> EnvMap {
    bytes
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let entry = String::from_utf8_lossy(entry);
            let (name, value) = entry.split_once('=')?;
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}
