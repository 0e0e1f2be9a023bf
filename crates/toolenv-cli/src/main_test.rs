// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use clap::CommandFactory;
use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_cli_definition_is_valid() {
    Opt::command().debug_assert();
}

#[rstest]
fn test_run_accepts_trailing_command() {
    let opt = Opt::try_parse_from(["toolenv", "run", "ci", "--", "node", "--version"]).unwrap();
    match opt.cmd {
        Command::Run(cmd) => {
            assert_eq!(cmd.name, "ci");
            assert_eq!(cmd.command, vec!["node", "--version"]);
        }
        _ => panic!("expected run command"),
    }
}

#[rstest]
fn test_registry_flags_load_explicit_registry() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("ci.toolenv.yaml"),
        "api: toolenv/v0\nname: ci.template\ntools:\n  - growthatpkgs.node\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("config.yaml"),
        "catalogs:\n  growthatpkgs: /opt/growthatpkgs\n",
    )
    .unwrap();

    let flags = RegistryFlags {
        registry: Some(tmp.path().to_path_buf()),
        include: String::new(),
    };
    let loaded = flags.load().unwrap();

    assert_eq!(loaded.registry.names().collect::<Vec<_>>(), vec!["ci.template"]);
    assert!(loaded.config.catalogs.contains_key("growthatpkgs"));
    assert!(loaded.primary_dir().ends_with(tmp.path().file_name().unwrap()));
}
