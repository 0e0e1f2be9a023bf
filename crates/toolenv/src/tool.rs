// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Tool references of the form `source.name`.

use std::fmt::{Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "./tool_test.rs"]
mod tool_test;

/// A pointer to an installable artifact, qualified by its source catalog.
///
/// The textual form splits at the first `.`, so `nixpkgs.nodePackages.pnpm`
/// has source `nixpkgs` and name `nodePackages.pnpm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolReference {
    source: String,
    name: String,
}

impl ToolReference {
    pub fn new<S: Into<String>, N: Into<String>>(source: S, name: N) -> crate::Result<Self> {
        let source = source.into();
        let name = name.into();
        if source.is_empty()
            || source.contains(char::is_whitespace)
            || !is_single_component(&name)
        {
            return Err(Error::InvalidToolReference(format!("{source}.{name}")));
        }
        Ok(Self { source, name })
    }

    /// Symbolic name of the package collection.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifier within the collection.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Names are looked up as a single entry beneath a catalog root.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
}

impl FromStr for ToolReference {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        let (source, name) = s
            .split_once('.')
            .ok_or_else(|| Error::InvalidToolReference(s.to_string()))?;
        Self::new(source, name).map_err(|_| Error::InvalidToolReference(s.to_string()))
    }
}

impl TryFrom<String> for ToolReference {
    type Error = Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<ToolReference> for String {
    fn from(value: ToolReference) -> Self {
        value.to_string()
    }
}

impl Display for ToolReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.source, self.name)
    }
}
