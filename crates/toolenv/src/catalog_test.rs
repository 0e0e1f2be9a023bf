// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn tool(s: &str) -> ToolReference {
    s.parse().unwrap()
}

#[rstest]
fn test_memory_catalog_lookup() {
    let catalog = MemoryCatalog::new().with(tool("growthatpkgs.node"), "/store/node");

    assert_eq!(
        catalog.lookup(&tool("growthatpkgs.node")).unwrap(),
        Some(PathBuf::from("/store/node"))
    );
    assert_eq!(catalog.lookup(&tool("nixpkgs.node")).unwrap(), None);
}

#[rstest]
fn test_directory_catalog_resolves_existing_entries() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("nixpkgs");
    std::fs::create_dir_all(root.join("shellcheck")).unwrap();

    let mut catalog = DirectoryCatalog::new();
    catalog.add_source("nixpkgs", &root);

    let found = catalog
        .lookup(&tool("nixpkgs.shellcheck"))
        .unwrap()
        .expect("Should resolve shellcheck");
    assert!(found.ends_with("nixpkgs/shellcheck"));

    assert_eq!(catalog.lookup(&tool("nixpkgs.missing")).unwrap(), None);
}

#[rstest]
fn test_directory_catalog_unknown_source() {
    let catalog = DirectoryCatalog::new();
    assert_eq!(catalog.lookup(&tool("growthatpkgs.node")).unwrap(), None);
    assert_eq!(catalog.sources().count(), 0);
}

#[rstest]
fn test_directory_catalog_matches_case_folded_sources() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("growth");
    std::fs::create_dir_all(root.join("node")).unwrap();

    // Source names loaded from config arrive lower-cased.
    let mut catalog = DirectoryCatalog::new();
    catalog.add_source("growthatpkgs", &root);

    let found = catalog.lookup(&tool("GrowthAtPkgs.node")).unwrap();
    assert_eq!(found, Some(dunce::canonicalize(root.join("node")).unwrap()));
}

#[rstest]
#[case("nixpkgs.../outside")]
#[case("nixpkgs.sub/../../outside")]
#[case("nixpkgs./outside")]
#[case("nixpkgs..")]
fn test_directory_catalog_cannot_escape_root(#[case] reference: &str) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("pkgs");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    std::fs::create_dir_all(tmp.path().join("outside")).unwrap();

    let mut catalog = DirectoryCatalog::new();
    catalog.add_source("nixpkgs", &root);

    let err = reference.parse::<ToolReference>().unwrap_err();
    assert!(matches!(err, crate::Error::InvalidToolReference(_)));
    assert_eq!(catalog.lookup(&tool("nixpkgs.outside")).unwrap(), None);
}
