// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Layered toolenv configuration.
//!
//! Sources, from lowest to highest precedence:
//!
//! 1. `/etc/toolenv/config.yaml`
//! 2. `~/.config/toolenv/config.yaml`
//! 3. `<registry>/config.yaml`
//! 4. `TOOLENV__*` environment variables (`__` separates nested keys,
//!    e.g. `TOOLENV__CATALOGS__NIXPKGS=/nix/store`)

use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::DirectoryCatalog;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// Name of the configuration file inside each config directory.
pub const CONFIG_FILENAME: &str = "config.yaml";

const ENV_PREFIX: &str = "TOOLENV";

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

/// Shell used for init scripts when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Root directory of each tool source, keyed by source name.
    #[serde(default)]
    pub catalogs: IndexMap<String, PathBuf>,

    /// Shell that runs init scripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<PathBuf>,
}

impl Config {
    /// Load the full stack of configuration sources.
    pub fn load(registry_dir: Option<&Path>) -> crate::Result<Self> {
        let mut files = vec![PathBuf::from("/etc/toolenv").join(CONFIG_FILENAME)];
        if let Some(dir) = dirs::config_dir() {
            files.push(dir.join("toolenv").join(CONFIG_FILENAME));
        }
        if let Some(dir) = registry_dir {
            files.push(dir.join(CONFIG_FILENAME));
        }
        Self::load_from(&files, true)
    }

    /// Load configuration from specific files, optionally overlaying the
    /// process environment. Missing files are skipped.
    pub fn load_from<P: AsRef<Path>>(files: &[P], with_env: bool) -> crate::Result<Self> {
        Self::build(files, with_env.then(env_source))
    }

    fn build<P: AsRef<Path>>(files: &[P], env: Option<Environment>) -> crate::Result<Self> {
        let mut builder = config::Config::builder();
        for path in files {
            let path = path.as_ref();
            tracing::trace!(path = %path.display(), "config source");
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Yaml)
                    .required(false),
            );
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        for (source, root) in cfg.catalogs.iter_mut() {
            if root.as_os_str().is_empty() {
                return Err(crate::Error::ValidationFailed(format!(
                    "catalog '{source}' has an empty root directory"
                )));
            }
            let expanded = root
                .to_str()
                .and_then(|s| s.strip_prefix("~/"))
                .and_then(|rest| dirs::home_dir().map(|home| home.join(rest)));
            if let Some(expanded) = expanded {
                *root = expanded;
            }
        }
        Ok(cfg)
    }

    /// Shell that runs init scripts.
    pub fn shell(&self) -> PathBuf {
        self.shell
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SHELL))
    }

    /// Build a directory catalog from the configured roots.
    pub fn catalog(&self) -> DirectoryCatalog {
        let mut catalog = DirectoryCatalog::new();
        for (source, root) in &self.catalogs {
            catalog.add_source(source.clone(), root.clone());
        }
        catalog
    }
}
