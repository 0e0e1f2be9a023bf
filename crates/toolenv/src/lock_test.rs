// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::ToolReference;
use crate::catalog::MemoryCatalog;

fn tool(s: &str) -> ToolReference {
    s.parse().unwrap()
}

fn setup() -> (TempDir, Registry, MemoryCatalog) {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("ci.toolenv.yaml"),
        "api: toolenv/v0\ntools:\n  - growthatpkgs.node\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("template.toolenv.yaml"),
        "api: toolenv/v0\ntools:\n  - growthatpkgs.node\n  - nixpkgs.act\n",
    )
    .unwrap();

    let registry = Registry::load_dir(tmp.path()).unwrap();
    let catalog = MemoryCatalog::new()
        .with(tool("growthatpkgs.node"), "/store/node-18")
        .with(tool("nixpkgs.act"), "/store/act");
    (tmp, registry, catalog)
}

#[rstest]
fn test_generate_lock_records_every_environment() {
    let (_tmp, registry, catalog) = setup();
    let lock = generate_lock(&registry, &catalog).unwrap();

    assert_eq!(lock.api, LockApiVersion::V0);
    assert_eq!(
        lock.environments.keys().collect::<Vec<_>>(),
        vec!["ci", "template"]
    );
    let template = &lock.environments["template"];
    assert_eq!(template.tools.len(), 2);
    assert_eq!(template.tools[1].path, PathBuf::from("/store/act"));
    assert!(template.sha256.is_some());
}

#[rstest]
fn test_verify_unchanged_lock() {
    let (tmp, registry, catalog) = setup();
    let lock_path = tmp.path().join("toolenv.lock.yaml");
    generate_lock(&registry, &catalog)
        .unwrap()
        .save(&lock_path)
        .unwrap();

    let lock = LockFile::load(&lock_path).unwrap();
    let changes = verify_lock(&lock, &registry, &catalog).unwrap();
    assert!(changes.is_empty(), "{changes:?}");
}

#[rstest]
fn test_verify_detects_tool_path_change() {
    let (_tmp, registry, catalog) = setup();
    let lock = generate_lock(&registry, &catalog).unwrap();

    let upgraded = catalog.with(tool("growthatpkgs.node"), "/store/node-20");
    let changes = verify_lock(&lock, &registry, &upgraded).unwrap();

    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.kind == LockChangeKind::ToolPathChanged));
    assert_eq!(changes[0].reference, "ci: growthatpkgs.node");
    assert_eq!(changes[0].actual.as_deref(), Some("/store/node-20"));
}

#[rstest]
fn test_verify_detects_added_and_removed_environments() {
    let (tmp, registry, catalog) = setup();
    let mut lock = generate_lock(&registry, &catalog).unwrap();
    lock.environments.shift_remove("ci");
    lock.environments.insert(
        "old".to_string(),
        LockedEnvironment {
            source: None,
            sha256: None,
            tools: Vec::new(),
        },
    );

    std::fs::write(
        tmp.path().join("template.toolenv.yaml"),
        "api: toolenv/v0\ntools:\n  - growthatpkgs.node\n",
    )
    .unwrap();
    let registry = Registry::load_dir(tmp.path()).unwrap();

    let kinds: Vec<_> = verify_lock(&lock, &registry, &catalog)
        .unwrap()
        .into_iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            LockChangeKind::SourceChanged,
            LockChangeKind::ToolRemoved,
            LockChangeKind::EnvironmentRemoved,
            LockChangeKind::EnvironmentAdded,
        ]
    );
}
