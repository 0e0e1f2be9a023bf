// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_parse_minimal_descriptor() {
    let yaml = r#"
api: toolenv/v0
name: ci.template
tools:
  - growthatpkgs.node
"#;
    let descriptor = EnvironmentDescriptor::from_yaml(yaml).expect("Should parse descriptor");
    assert_eq!(descriptor.api, ApiVersion::V0);
    assert_eq!(descriptor.name, "ci.template");
    assert_eq!(descriptor.tools.len(), 1);
    assert_eq!(descriptor.tools[0].source(), "growthatpkgs");
    assert!(descriptor.init.is_none());
}

#[rstest]
fn test_parse_full_descriptor() {
    let yaml = r#"
api: toolenv/v0
name: template
description: "Development tools"
tools:
  - growthatpkgs.node
  - growthatpkgs.poetry
  - nixpkgs.act
  - nixpkgs.gitflow
  - nixpkgs.shellcheck
  - nixpkgs.python3
vars:
  project:
    stage: development
environment:
  - set: NODE_ENV
    value: development
init: |
  unset PYTHONPATH
"#;
    let descriptor = EnvironmentDescriptor::from_yaml(yaml).expect("Should parse descriptor");
    assert_eq!(descriptor.description.as_deref(), Some("Development tools"));
    assert_eq!(descriptor.tools.len(), 6);
    assert_eq!(descriptor.environment.len(), 1);
    assert_eq!(descriptor.vars.len(), 1);
    assert_eq!(descriptor.init.as_deref(), Some("unset PYTHONPATH\n"));
}

#[rstest]
fn test_init_script_alias_and_blank_normalization() {
    let with_alias =
        EnvironmentDescriptor::from_yaml("name: cd\ninitScript: export A=1\n").unwrap();
    assert_eq!(with_alias.init.as_deref(), Some("export A=1"));

    let blank = EnvironmentDescriptor::from_yaml("name: cd\ninit: \"  \"\n").unwrap();
    assert!(blank.init.is_none());
}

#[rstest]
fn test_invalid_api_version() {
    let err = EnvironmentDescriptor::from_yaml("api: toolenv/v9\nname: x\n").unwrap_err();
    assert!(matches!(err, crate::Error::InvalidYaml { .. }));
}

#[rstest]
fn test_invalid_tool_reference_is_yaml_error() {
    let err = EnvironmentDescriptor::from_yaml("name: x\ntools:\n  - node\n").unwrap_err();
    assert!(matches!(err, crate::Error::InvalidYaml { .. }));
}

#[rstest]
fn test_load_defaults_name_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ci.toolenv.yaml");
    std::fs::write(&path, "api: toolenv/v0\ntools:\n  - growthatpkgs.node\n").unwrap();

    let descriptor = EnvironmentDescriptor::load(&path).unwrap();
    assert_eq!(descriptor.name, "ci");
    assert_eq!(descriptor.source_path, Some(path));
}

#[rstest]
fn test_validate_rejects_empty_name() {
    let descriptor = EnvironmentDescriptor::new("", Vec::new());
    assert!(matches!(
        descriptor.validate(),
        Err(crate::Error::ValidationFailed(_))
    ));
}

#[rstest]
fn test_duplicate_tools_reported_once() {
    let node: ToolReference = "growthatpkgs.node".parse().unwrap();
    let act: ToolReference = "nixpkgs.act".parse().unwrap();
    let descriptor =
        EnvironmentDescriptor::new("dev", vec![node.clone(), act, node.clone(), node.clone()]);
    assert_eq!(descriptor.duplicate_tools(), vec![&node]);
}

#[rstest]
fn test_yaml_round_trip_keeps_tool_order() {
    let descriptor = EnvironmentDescriptor::new(
        "dev",
        vec![
            "nixpkgs.b".parse().unwrap(),
            "nixpkgs.a".parse().unwrap(),
        ],
    )
    .with_init("unset PYTHONPATH");

    let yaml = descriptor.to_yaml().unwrap();
    let parsed = EnvironmentDescriptor::from_yaml(yaml).unwrap();
    assert_eq!(parsed, descriptor);
}
