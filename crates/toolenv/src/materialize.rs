// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Resolution of a descriptor's tools into an aggregate environment.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::catalog::Catalog;
use crate::{EnvironmentDescriptor, Error, ToolReference};

#[cfg(test)]
#[path = "./materialize_test.rs"]
mod materialize_test;

/// A tool reference together with the location it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub tool: ToolReference,
    pub path: PathBuf,
}

/// The union of filesystem locations contributed by a descriptor's tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateEnvironment {
    /// Name of the descriptor this was materialized from.
    pub descriptor: String,

    /// De-duplicated paths, in order of first contribution.
    pub paths: IndexSet<PathBuf>,

    /// Every resolved tool, in declaration order (duplicates included).
    pub contributions: Vec<Contribution>,
}

impl AggregateEnvironment {
    pub fn new<S: Into<String>>(descriptor: S) -> Self {
        Self {
            descriptor: descriptor.into(),
            ..Default::default()
        }
    }

    /// Union one contribution into the aggregate.
    ///
    /// Adding a path that is already present keeps its original position.
    pub fn add(&mut self, tool: ToolReference, path: PathBuf) {
        self.paths.insert(path.clone());
        self.contributions.push(Contribution { tool, path });
    }

    pub fn has_paths(&self) -> bool {
        !self.paths.is_empty()
    }

    /// `bin` directories of every path, in aggregate order.
    pub fn bin_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.paths.iter().map(|p| p.join("bin"))
    }

    /// Paths joined with `:` for export into an environment variable.
    pub fn joined_paths(&self) -> String {
        join_paths(self.paths.iter().map(PathBuf::as_path))
    }
}

pub(crate) fn join_paths<'a>(paths: impl Iterator<Item = &'a Path>) -> String {
    paths
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Resolve every tool of a descriptor and union the results.
///
/// Stops at the first tool the catalog cannot resolve; no partial aggregate
/// is ever returned.
pub fn materialize<C: Catalog + ?Sized>(
    descriptor: &EnvironmentDescriptor,
    catalog: &C,
) -> crate::Result<AggregateEnvironment> {
    let mut aggregate = AggregateEnvironment::new(descriptor.name.clone());

    for tool in &descriptor.tools {
        let path = catalog
            .lookup(tool)?
            .ok_or_else(|| Error::UnresolvedTool(tool.to_string()))?;
        tracing::debug!(env = %descriptor.name, %tool, path = %path.display(), "resolved tool");
        aggregate.add(tool.clone(), path);
    }

    Ok(aggregate)
}
