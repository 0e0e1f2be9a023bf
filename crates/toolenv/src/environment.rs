// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Environment variable operations and shell script rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// Environment variables of a session, ordered by name.
pub type EnvMap = BTreeMap<String, String>;

const DEFAULT_SEPARATOR: &str = ":";

/// A single environment operation from a descriptor's `environment:` list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EnvOp {
    Set(SetEnv),
    Unset(UnsetEnv),
    Prepend(PrependEnv),
    Append(AppendEnv),
    Comment(CommentEnv),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SetEnv {
    pub set: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UnsetEnv {
    pub unset: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrependEnv {
    pub prepend: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppendEnv {
    pub append: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommentEnv {
    pub comment: String,
}

impl EnvOp {
    /// Variable touched by this operation, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            EnvOp::Set(s) => Some(&s.set),
            EnvOp::Unset(u) => Some(&u.unset),
            EnvOp::Prepend(p) => Some(&p.prepend),
            EnvOp::Append(a) => Some(&a.append),
            EnvOp::Comment(_) => None,
        }
    }

    /// Apply this operation to an environment.
    pub fn apply(&self, env: &mut EnvMap) {
        match self {
            EnvOp::Set(s) => {
                env.insert(s.set.clone(), s.value.clone());
            }
            EnvOp::Unset(u) => {
                env.remove(&u.unset);
            }
            EnvOp::Prepend(p) => {
                let sep = p.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
                let value = match env.get(&p.prepend) {
                    Some(existing) if !existing.is_empty() => {
                        format!("{}{sep}{existing}", p.value)
                    }
                    _ => p.value.clone(),
                };
                env.insert(p.prepend.clone(), value);
            }
            EnvOp::Append(a) => {
                let sep = a.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
                let value = match env.get(&a.append) {
                    Some(existing) if !existing.is_empty() => {
                        format!("{existing}{sep}{}", a.value)
                    }
                    _ => a.value.clone(),
                };
                env.insert(a.append.clone(), value);
            }
            EnvOp::Comment(_) => {}
        }
    }
}

/// Apply operations in order.
pub fn apply_ops(env: &mut EnvMap, ops: &[EnvOp]) {
    for op in ops {
        op.apply(env);
    }
}

/// Flatten a nested mapping into upper-case variables.
///
/// Nested keys are joined with `_`, so `{project: {stage: dev}}` becomes
/// `PROJECT_STAGE=dev`. Sequences are joined with `:`; nulls become empty.
pub fn flatten_vars(vars: &serde_yaml::Mapping) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(vars, "", &mut out);
    out
}

fn flatten_into(vars: &serde_yaml::Mapping, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in vars {
        let Some(key) = scalar_to_string(key) else {
            continue;
        };
        let key = format!("{prefix}{}", key.to_uppercase());
        match value {
            serde_yaml::Value::Mapping(nested) => {
                flatten_into(nested, &format!("{key}_"), out);
            }
            serde_yaml::Value::Sequence(items) => {
                let joined = items
                    .iter()
                    .filter_map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join(DEFAULT_SEPARATOR);
                out.push((key, joined));
            }
            other => out.push((key, scalar_to_string(other).unwrap_or_default())),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// Render the difference between two environments as a POSIX shell script.
///
/// Variables that are new or changed in `env` are exported, variables that
/// only exist in `base` are unset.
pub fn generate_startup_script(base: &EnvMap, env: &EnvMap) -> String {
    let mut script = String::new();

    for name in base.keys() {
        if !env.contains_key(name) && is_valid_name(name) {
            script.push_str(&format!("unset {name}\n"));
        }
    }

    for (name, value) in env {
        if base.get(name) == Some(value) || !is_valid_name(name) {
            continue;
        }
        script.push_str(&format!("export {name}=\"{}\"\n", escape(value)));
    }

    script
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
