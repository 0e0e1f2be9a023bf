// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Locating the registry directories to load descriptors from.

use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "./discovery_test.rs"]
mod discovery_test;

use crate::{REGISTRY_DIRNAME, Registry};

/// Options for discovery behavior.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Explicit registry directory (from --registry or TOOLENV_REGISTRY).
    /// Disables walking up the directory tree.
    pub registry: Option<PathBuf>,

    /// Additional registry directories (from TOOLENV_INCLUDE), loaded after
    /// the primary one.
    pub includes: Vec<String>,
}

impl DiscoveryOptions {
    /// Split a colon-separated list of directories, as found in TOOLENV_INCLUDE.
    pub fn parse_include_list(value: &str) -> Vec<String> {
        value
            .split(':')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Registry directories to load, primary first.
pub fn discover_registry<P: AsRef<Path>>(
    start_path: P,
    options: &DiscoveryOptions,
) -> crate::Result<Vec<PathBuf>> {
    let start = resolve_start_path(start_path.as_ref());

    let primary = match &options.registry {
        Some(explicit) => {
            let path = expand_path(explicit.to_string_lossy().as_ref(), &start)?;
            dunce::canonicalize(&path).map_err(|e| crate::Error::ReadFailed {
                path: path.clone(),
                error: e,
            })?
        }
        None => find_in_tree(&start)?,
    };

    let mut dirs = vec![primary];
    for include in &options.includes {
        let path = expand_path(include, &start)?;
        let path = dunce::canonicalize(&path).map_err(|e| crate::Error::ReadFailed {
            path: path.clone(),
            error: e,
        })?;
        if !dirs.contains(&path) {
            dirs.push(path);
        }
    }

    tracing::debug!(?dirs, "discovered registry directories");
    Ok(dirs)
}

/// Discover the registry directories and load them.
pub fn discover_and_load<P: AsRef<Path>>(
    start_path: P,
    options: &DiscoveryOptions,
) -> crate::Result<Registry> {
    let dirs = discover_registry(start_path, options)?;
    Registry::load_dirs(&dirs)
}

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        start_path.to_owned()
    } else {
        match std::env::var("PWD").ok() {
            Some(pwd) => PathBuf::from(pwd).join(start_path),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join(start_path),
        }
    }
}

/// Walk up from `start` to the nearest directory holding a registry.
fn find_in_tree(start: &Path) -> crate::Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(REGISTRY_DIRNAME);
        if candidate.is_dir() {
            return Ok(dunce::canonicalize(&candidate).unwrap_or(candidate));
        }
        if !current.pop() {
            return Err(crate::Error::RegistryNotFound(start.to_path_buf()));
        }
    }
}

/// Expand `~/` and relative paths against `base`.
fn expand_path(path: &str, base: &Path) -> crate::Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            crate::Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
        })?;
        Ok(home.join(rest))
    } else if Path::new(path).is_absolute() {
        Ok(PathBuf::from(path))
    } else {
        Ok(base.join(path))
    }
}
