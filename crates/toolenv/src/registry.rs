// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! The set of named environment descriptors known to a process.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{DESCRIPTOR_SUFFIX, EnvironmentDescriptor, Error};

#[cfg(test)]
#[path = "./registry_test.rs"]
mod registry_test;

/// Maximum number of suggestions attached to a [`Error::NotFound`].
const MAX_SUGGESTIONS: usize = 3;

/// Named environment descriptors, in registration order.
///
/// Populated once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: IndexMap<String, EnvironmentDescriptor>,
    source_dirs: Vec<PathBuf>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// Fails with [`Error::DuplicateName`] if the name is taken, leaving the
    /// existing descriptor in place.
    pub fn register(&mut self, descriptor: EnvironmentDescriptor) -> crate::Result<()> {
        descriptor.validate()?;
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(Error::DuplicateName(descriptor.name));
        }
        tracing::debug!(name = %descriptor.name, tools = descriptor.tools.len(), "registered environment");
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Look up a descriptor by name.
    pub fn resolve(&self, name: &str) -> crate::Result<&EnvironmentDescriptor> {
        self.descriptors.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
            similar: self.similar_names(name),
        })
    }

    /// Names of all descriptors, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Directories descriptors were loaded from, in load order.
    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    /// Load every `*.toolenv.yaml` file in a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> crate::Result<Self> {
        let mut registry = Self::new();
        registry.extend_from_dir(dir.as_ref())?;
        Ok(registry)
    }

    /// Load several directories into one registry.
    ///
    /// Names must be unique across all of them.
    pub fn load_dirs<I, P>(dirs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registry = Self::new();
        for dir in dirs {
            registry.extend_from_dir(dir.as_ref())?;
        }
        Ok(registry)
    }

    fn extend_from_dir(&mut self, dir: &Path) -> crate::Result<()> {
        for path in descriptor_files(dir)? {
            tracing::trace!(path = %path.display(), "loading descriptor");
            self.register(EnvironmentDescriptor::load(&path)?)?;
        }
        self.source_dirs.push(dir.to_path_buf());
        Ok(())
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        self.names()
            .filter(|candidate| {
                let candidate = candidate.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
            .take(MAX_SUGGESTIONS)
            .map(String::from)
            .collect()
    }
}

/// Descriptor files in a directory, sorted by file name.
pub fn descriptor_files(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::ReadFailed {
            path: dir.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let pattern = dir.join(format!("*{DESCRIPTOR_SUFFIX}"));
    let pattern = pattern.to_string_lossy();
    let paths = glob::glob(&pattern)
        .map_err(|e| Error::ValidationFailed(format!("invalid registry path {pattern}: {e}")))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::ReadFailed {
                path,
                error: e.into(),
            }
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
