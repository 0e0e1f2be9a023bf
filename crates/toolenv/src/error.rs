// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for toolenv operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with toolenv Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during toolenv operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Two descriptors share a name
    #[error("Duplicate environment name: {0}")]
    #[diagnostic(
        code(toolenv::duplicate_name),
        help("Environment names must be unique across all loaded registry directories")
    )]
    DuplicateName(String),

    /// Requested environment is not registered
    #[error("No environment named '{name}'")]
    #[diagnostic(code(toolenv::not_found), help("{}", suggestion_message(similar)))]
    NotFound { name: String, similar: Vec<String> },

    /// A tool reference could not be mapped to an artifact
    #[error("Unresolved tool reference: {0}")]
    #[diagnostic(
        code(toolenv::unresolved_tool),
        help("Check that the catalog for this source is configured and provides the tool")
    )]
    UnresolvedTool(String),

    /// A tool reference is not of the form `source.name`
    #[error("Invalid tool reference '{0}', expected 'source.name'")]
    #[diagnostic(code(toolenv::invalid_tool_reference))]
    InvalidToolReference(String),

    /// No .toolenv directory found in directory tree
    #[error("No .toolenv directory found in {0:?} or any parent directory")]
    #[diagnostic(
        code(toolenv::registry_not_found),
        help("Create one with 'toolenv init' or point at a registry with --registry")
    )]
    RegistryNotFound(PathBuf),

    /// Invalid YAML in descriptor file
    #[error("Invalid descriptor file: {error}")]
    #[diagnostic(
        code(toolenv::invalid_yaml),
        help("Check YAML syntax and ensure 'api: toolenv/v0' is present")
    )]
    InvalidYaml {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(toolenv::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(toolenv::validation_failed))]
    ValidationFailed(String),

    /// The init script could not be started or its environment not captured
    #[error("Failed to run init script for '{name}': {message}")]
    #[diagnostic(code(toolenv::init_failed))]
    InitFailed { name: String, message: String },

    /// Configuration loading error
    #[error(transparent)]
    #[diagnostic(code(toolenv::config_error))]
    Config(#[from] ::config::ConfigError),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(toolenv::io_error))]
    Io(#[from] std::io::Error),
}

fn suggestion_message(similar: &[String]) -> String {
    if similar.is_empty() {
        "Run 'toolenv list' to see the available environments".to_string()
    } else {
        format!("Did you mean one of: {}?", similar.join(", "))
    }
}
