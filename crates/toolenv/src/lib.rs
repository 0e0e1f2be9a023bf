// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! toolenv - Named Tool Environments
//!
//! This crate provides the core library for pinning sets of development tools
//! into named, reproducible environments described by `*.toolenv.yaml` files.
//!
//! # Overview
//!
//! Each descriptor names an environment, lists the tools it aggregates as
//! `source.name` references into a tool catalog, and may carry an init script
//! that adjusts variables when the environment is activated. Descriptors live
//! in a `.toolenv/` registry directory and are loaded once per process.
//!
//! # Example
//!
//! ```yaml
//! # .toolenv/template.toolenv.yaml
//! api: toolenv/v0
//! description: "Development tools"
//!
//! tools:
//!   - growthatpkgs.node
//!   - nixpkgs.shellcheck
//!
//! init: |
//!   unset PYTHONPATH
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod lock;
pub mod materialize;
pub mod registry;
pub mod session;
pub mod tool;

pub use catalog::{Catalog, DirectoryCatalog, MemoryCatalog};
pub use crate::config::{Config, DEFAULT_SHELL};
pub use descriptor::{ApiVersion, EnvironmentDescriptor};
pub use discovery::{DiscoveryOptions, discover_and_load, discover_registry};
pub use environment::{EnvMap, EnvOp, generate_startup_script};
pub use error::{Error, Result};
pub use lock::{LockChange, LockChangeKind, LockFile, generate_lock, verify_lock};
pub use materialize::{AggregateEnvironment, Contribution, materialize};
pub use registry::Registry;
pub use session::{ActivateOptions, Session, SessionStatus, activate};
pub use tool::ToolReference;

/// Well-known name of the directory holding descriptor files.
pub const REGISTRY_DIRNAME: &str = ".toolenv";

/// Suffix shared by all descriptor files.
pub const DESCRIPTOR_SUFFIX: &str = ".toolenv.yaml";

/// Well-known filename for lock files, inside the registry directory.
pub const LOCK_FILENAME: &str = "toolenv.lock.yaml";
