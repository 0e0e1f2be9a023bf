// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Tool catalog lookup contract and the catalogs shipped with toolenv.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::ToolReference;

#[cfg(test)]
#[path = "./catalog_test.rs"]
mod catalog_test;

/// Maps a tool reference to the filesystem location of its artifact.
///
/// `Ok(None)` means the catalog does not know the tool. Errors are reserved
/// for failures of the catalog itself.
pub trait Catalog {
    fn lookup(&self, tool: &ToolReference) -> crate::Result<Option<PathBuf>>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn lookup(&self, tool: &ToolReference) -> crate::Result<Option<PathBuf>> {
        (**self).lookup(tool)
    }
}

/// Catalog backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: HashMap<ToolReference, PathBuf>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the location for a tool.
    pub fn insert<P: Into<PathBuf>>(&mut self, tool: ToolReference, path: P) {
        self.entries.insert(tool, path.into());
    }

    /// Builder-style variant of [`MemoryCatalog::insert`].
    pub fn with<P: Into<PathBuf>>(mut self, tool: ToolReference, path: P) -> Self {
        self.insert(tool, path);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn lookup(&self, tool: &ToolReference) -> crate::Result<Option<PathBuf>> {
        Ok(self.entries.get(tool).cloned())
    }
}

/// Catalog where each source is a directory holding one entry per tool.
///
/// `source.name` resolves to `<root of source>/<name>` when that path exists.
#[derive(Debug, Clone, Default)]
pub struct DirectoryCatalog {
    roots: IndexMap<String, PathBuf>,
}

impl DirectoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the root directory for a source name.
    pub fn add_source<S: Into<String>, P: Into<PathBuf>>(&mut self, source: S, root: P) {
        self.roots.insert(source.into(), root.into());
    }

    pub fn root(&self, source: &str) -> Option<&Path> {
        self.roots.get(source).map(PathBuf::as_path)
    }

    /// Configured source names.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }
}

impl Catalog for DirectoryCatalog {
    fn lookup(&self, tool: &ToolReference) -> crate::Result<Option<PathBuf>> {
        // Keys loaded through the config crate are case-folded.
        let root = self
            .roots
            .get(tool.source())
            .or_else(|| self.roots.get(&tool.source().to_lowercase()));
        let Some(root) = root else {
            tracing::debug!(source = tool.source(), "no catalog root configured");
            return Ok(None);
        };

        let candidate = root.join(tool.name());
        match dunce::canonicalize(&candidate) {
            Ok(path) => Ok(Some(path)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(crate::Error::ReadFailed {
                path: candidate,
                error: err,
            }),
        }
    }
}
