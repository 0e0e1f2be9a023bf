// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Lock file structures and helpers for toolenv.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::Catalog;
use crate::{Error, Registry};

#[cfg(test)]
#[path = "./lock_test.rs"]
mod lock_test;

/// Lock file API version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum LockApiVersion {
    #[serde(rename = "toolenv/v0/lock")]
    V0,
}

/// Lock file capturing descriptor sources and resolved tool locations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockFile {
    pub api: LockApiVersion,
    pub generated: GenerationMetadata,
    /// Locked environments keyed by name, in registry order.
    pub environments: IndexMap<String, LockedEnvironment>,
}

/// Metadata about when and where the lock was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub toolenv_version: String,
    pub hostname: String,
}

/// A single descriptor in the lock.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockedEnvironment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub tools: Vec<LockedTool>,
}

/// Resolved tool in a locked environment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockedTool {
    pub reference: String,
    pub path: PathBuf,
}

impl LockFile {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
            error: e,
            yaml_content: yaml,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::InvalidYaml {
            error: e,
            yaml_content: String::new(),
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

fn hash_file(path: &Path) -> crate::Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::ReadFailed {
        path: path.to_path_buf(),
        error: e,
    })?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

fn lock_environments<C: Catalog + ?Sized>(
    registry: &Registry,
    catalog: &C,
) -> crate::Result<IndexMap<String, LockedEnvironment>> {
    let mut environments = IndexMap::new();
    for descriptor in registry.iter() {
        let aggregate = crate::materialize(descriptor, catalog)?;
        let sha256 = descriptor
            .source_path
            .as_deref()
            .map(hash_file)
            .transpose()?;
        environments.insert(
            descriptor.name.clone(),
            LockedEnvironment {
                source: descriptor.source_path.clone(),
                sha256,
                tools: aggregate
                    .contributions
                    .into_iter()
                    .map(|c| LockedTool {
                        reference: c.tool.to_string(),
                        path: c.path,
                    })
                    .collect(),
            },
        );
    }
    Ok(environments)
}

/// Generate a lock file for every descriptor in the registry.
pub fn generate_lock<C: Catalog + ?Sized>(
    registry: &Registry,
    catalog: &C,
) -> crate::Result<LockFile> {
    Ok(LockFile {
        api: LockApiVersion::V0,
        generated: GenerationMetadata {
            timestamp: Utc::now(),
            toolenv_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        },
        environments: lock_environments(registry, catalog)?,
    })
}

/// Compare a lock file against the current registry and catalog.
pub fn verify_lock<C: Catalog + ?Sized>(
    lock: &LockFile,
    registry: &Registry,
    catalog: &C,
) -> crate::Result<Vec<LockChange>> {
    let current = lock_environments(registry, catalog)?;
    let mut changes = Vec::new();

    for (name, locked) in &lock.environments {
        let Some(actual) = current.get(name) else {
            changes.push(LockChange::new(LockChangeKind::EnvironmentRemoved, name));
            continue;
        };

        if locked.sha256 != actual.sha256 {
            changes.push(LockChange {
                kind: LockChangeKind::SourceChanged,
                reference: name.clone(),
                expected: locked.sha256.clone(),
                actual: actual.sha256.clone(),
            });
        }

        for tool in &locked.tools {
            match actual.tools.iter().find(|t| t.reference == tool.reference) {
                None => changes.push(LockChange {
                    kind: LockChangeKind::ToolRemoved,
                    reference: format!("{name}: {}", tool.reference),
                    expected: Some(tool.path.display().to_string()),
                    actual: None,
                }),
                Some(found) if found.path != tool.path => changes.push(LockChange {
                    kind: LockChangeKind::ToolPathChanged,
                    reference: format!("{name}: {}", tool.reference),
                    expected: Some(tool.path.display().to_string()),
                    actual: Some(found.path.display().to_string()),
                }),
                Some(_) => {}
            }
        }

        for tool in &actual.tools {
            if !locked.tools.iter().any(|t| t.reference == tool.reference) {
                changes.push(LockChange {
                    kind: LockChangeKind::ToolAdded,
                    reference: format!("{name}: {}", tool.reference),
                    expected: None,
                    actual: Some(tool.path.display().to_string()),
                });
            }
        }
    }

    for name in current.keys() {
        if !lock.environments.contains_key(name) {
            changes.push(LockChange::new(LockChangeKind::EnvironmentAdded, name));
        }
    }

    Ok(changes)
}

/// A single detected change between lock and current registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockChange {
    pub kind: LockChangeKind,
    pub reference: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl LockChange {
    fn new(kind: LockChangeKind, reference: &str) -> Self {
        Self {
            kind,
            reference: reference.to_string(),
            expected: None,
            actual: None,
        }
    }
}

/// Types of lock mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChangeKind {
    EnvironmentAdded,
    EnvironmentRemoved,
    SourceChanged,
    ToolAdded,
    ToolRemoved,
    ToolPathChanged,
}
