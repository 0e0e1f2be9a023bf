// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use rstest::rstest;

use super::*;
use crate::catalog::MemoryCatalog;
use crate::environment::{EnvOp, SetEnv};
use crate::{Error, ToolReference};

const TEMPLATE_TOOLS: [&str; 6] = [
    "growthatpkgs.node",
    "growthatpkgs.poetry",
    "nixpkgs.act",
    "nixpkgs.gitflow",
    "nixpkgs.shellcheck",
    "nixpkgs.python3",
];

fn tools(names: &[&str]) -> Vec<ToolReference> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

fn catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    for name in TEMPLATE_TOOLS {
        let tool: ToolReference = name.parse().unwrap();
        let path = PathBuf::from("/store").join(tool.name());
        catalog.insert(tool, path);
    }
    catalog
}

fn options(base: &[(&str, &str)]) -> ActivateOptions {
    ActivateOptions {
        base_env: Some(
            base.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_init_script_unsets_pythonpath() {
    let descriptor =
        EnvironmentDescriptor::new("template", tools(&TEMPLATE_TOOLS)).with_init("unset PYTHONPATH");
    let options = options(&[("PATH", "/usr/bin:/bin"), ("PYTHONPATH", "/usr/lib/python")]);

    let session = activate(&descriptor, &catalog(), &options).await.unwrap();

    assert!(session.is_ready(), "{:?}", session.status);
    assert!(!session.env.contains_key("PYTHONPATH"));
    assert_eq!(session.aggregate.paths.len(), 6);
    assert!(session.startup_script().contains("unset PYTHONPATH\n"));
}

#[tokio::test]
async fn test_prepared_environment_exposes_paths() {
    let descriptor = EnvironmentDescriptor::new("ci.template", tools(&["growthatpkgs.node"]));
    let options = options(&[("PATH", "/usr/bin")]);

    let session = activate(&descriptor, &catalog(), &options).await.unwrap();

    assert!(session.is_ready());
    assert_eq!(session.env["TOOLENV_NAME"], "ci.template");
    assert_eq!(session.env["TOOLENV_PATHS"], "/store/node");
    assert_eq!(session.env["PATH"], "/store/node/bin:/usr/bin");
    assert_eq!(session.env["TOOLENV_SYSTEM"], std::env::consts::OS);
}

#[tokio::test]
async fn test_init_script_exports_are_captured() {
    let mut descriptor = EnvironmentDescriptor::new("dev", tools(&["nixpkgs.act"]))
        .with_init("export GREETING=\"hello $STAGE\"\necho ready\n");
    descriptor.environment.push(EnvOp::Set(SetEnv {
        set: "STAGE".to_string(),
        value: "development".to_string(),
    }));
    let options = options(&[("PATH", "/usr/bin:/bin")]);

    let session = activate(&descriptor, &catalog(), &options).await.unwrap();

    assert!(session.is_ready(), "{:?}", session.status);
    assert_eq!(session.env["GREETING"], "hello development");
    assert_eq!(session.stdout.trim(), "ready");
    assert!(!session.env.contains_key("SHLVL"));
    assert!(!session.env.contains_key("PWD"));
}

#[tokio::test]
async fn test_failing_init_script_marks_session_failed() {
    let descriptor = EnvironmentDescriptor::new("cd", tools(&["nixpkgs.act"]))
        .with_init("echo broken >&2\nexit 3\n");
    let options = options(&[("PATH", "/usr/bin:/bin")]);

    let session = activate(&descriptor, &catalog(), &options).await.unwrap();

    assert_eq!(
        session.status,
        SessionStatus::Failed {
            code: Some(3),
            message: "broken".to_string(),
        }
    );
    // The aggregate is kept as-is.
    assert_eq!(session.aggregate.paths.len(), 1);
    assert!(matches!(session.into_ready(), Err(Error::InitFailed { .. })));
}

#[tokio::test]
async fn test_early_exit_before_capture_marks_session_failed() {
    let descriptor = EnvironmentDescriptor::new("cd", tools(&["nixpkgs.act"]))
        .with_init("export NODE_ENV=production\nexit 0\n");
    let options = options(&[("PATH", "/usr/bin:/bin")]);

    let session = activate(&descriptor, &catalog(), &options).await.unwrap();

    assert!(matches!(
        session.status,
        SessionStatus::Failed { code: Some(0), .. }
    ));
    assert!(!session.env.contains_key("NODE_ENV"));
}

#[rstest]
fn test_empty_path_is_left_unset() {
    let descriptor = EnvironmentDescriptor::new("empty", Vec::new());
    let aggregate = AggregateEnvironment::new("empty");

    let env = prepare_env(&descriptor, &aggregate, &EnvMap::new());

    assert!(!env.contains_key("PATH"));
    assert_eq!(env.get("TOOLENV_NAME").map(String::as_str), Some("empty"));
}

#[tokio::test]
async fn test_unresolved_tool_is_an_error() {
    let descriptor = EnvironmentDescriptor::new("ci", tools(&["growthatpkgs.missing"]))
        .with_init("touch should-not-run");

    let err = activate(&descriptor, &catalog(), &options(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedTool(ref r) if r == "growthatpkgs.missing"));
}

#[tokio::test]
async fn test_missing_shell_is_an_error() {
    let descriptor = EnvironmentDescriptor::new("ci", Vec::new()).with_init("true");
    let options = ActivateOptions {
        shell: PathBuf::from("/nonexistent/shell"),
        base_env: Some(EnvMap::new()),
    };

    let err = activate(&descriptor, &catalog(), &options).await.unwrap_err();
    assert!(matches!(err, Error::InitFailed { .. }));
}

#[test]
fn test_parse_env_dump() {
    let env = parse_env_dump(b"A=1\0B=x=y\0\0=bad\0C=\0");
    assert_eq!(env.len(), 3);
    assert_eq!(env["B"], "x=y");
    assert_eq!(env["C"], "");
}
