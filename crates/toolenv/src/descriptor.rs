// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Descriptor file parsing and data types for `*.toolenv.yaml` files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::environment::EnvOp;
use crate::{DESCRIPTOR_SUFFIX, ToolReference};

#[cfg(test)]
#[path = "./descriptor_test.rs"]
mod descriptor_test;

/// API version for descriptor files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "toolenv/v0")]
    V0,
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// A named environment and the tools it is built from.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct EnvironmentDescriptor {
    /// API version identifier.
    #[serde(default)]
    pub api: ApiVersion,

    /// Unique environment name. Defaults to the file stem when loaded from disk.
    #[serde(default)]
    pub name: String,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tools aggregated into the environment, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolReference>,

    /// Nested variables flattened into `PARENT_CHILD=value` on activation.
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub vars: serde_yaml::Mapping,

    /// Environment variable operations (set, unset, prepend, append, comment).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvOp>,

    /// Shell statements run once per activation.
    #[serde(default, alias = "initScript", skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl EnvironmentDescriptor {
    /// Create a descriptor with the given name and tools.
    pub fn new<S: Into<String>>(name: S, tools: Vec<ToolReference>) -> Self {
        Self {
            name: name.into(),
            tools,
            ..Default::default()
        }
    }

    /// Attach an init script.
    pub fn with_init<S: Into<String>>(mut self, init: S) -> Self {
        self.init = Some(init.into());
        self
    }

    /// Parse descriptor from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();

        let value: serde_yaml::Value =
            serde_yaml::from_str(&yaml).map_err(|e| crate::Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        let with_version: ApiVersionMapping =
            serde_yaml::from_value(value.clone()).map_err(|e| crate::Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        let mut descriptor: Self = match with_version.api {
            ApiVersion::V0 => {
                serde_yaml::from_value(value).map_err(|e| crate::Error::InvalidYaml {
                    error: e,
                    yaml_content: yaml,
                })?
            }
        };

        if descriptor
            .init
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            descriptor.init = None;
        }

        Ok(descriptor)
    }

    /// Load descriptor from file path.
    ///
    /// A missing `name` is filled in from the file name.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut descriptor = Self::from_yaml(yaml)?;
        if descriptor.name.trim().is_empty() {
            descriptor.name = name_from_path(path).unwrap_or_default();
        }
        descriptor.source_path = Some(path.to_path_buf());
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate descriptor invariants.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::ValidationFailed(
                "environment name must not be empty".to_string(),
            ));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(crate::Error::ValidationFailed(format!(
                "environment name '{}' must not contain whitespace",
                self.name
            )));
        }
        Ok(())
    }

    /// Tool references that appear more than once, in first-seen order.
    pub fn duplicate_tools(&self) -> Vec<&ToolReference> {
        let mut seen = indexmap::IndexSet::new();
        let mut dupes = indexmap::IndexSet::new();
        for tool in &self.tools {
            if !seen.insert(tool) {
                dupes.insert(tool);
            }
        }
        dupes.into_iter().collect()
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> crate::Result<String> {
        serde_yaml::to_string(self).map_err(|e| crate::Error::InvalidYaml {
            error: e,
            yaml_content: String::new(),
        })
    }
}

/// Environment name implied by a descriptor file name.
pub fn name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name
        .strip_suffix(DESCRIPTOR_SUFFIX)
        .or_else(|| file_name.strip_suffix(".yaml"))
        .unwrap_or(file_name);
    (!name.is_empty()).then(|| name.to_string())
}
