// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `toolenv shell` command.

use clap::Args;
use miette::Result;

/// Enter interactive shell in environment
#[derive(Debug, Args)]
pub struct CmdShell {
    /// Environment name
    name: String,

    #[clap(flatten)]
    registry: crate::RegistryFlags,

    /// Shell to use
    #[clap(long)]
    shell: Option<String>,
}

impl CmdShell {
    pub async fn run(&mut self) -> Result<i32> {
        let shell = self
            .shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "/bin/bash".to_string());

        let mut run_cmd = super::cmd_run::CmdRun {
            name: self.name.clone(),
            registry: self.registry.clone(),
            command: vec![shell],
        };

        run_cmd.run().await
    }
}
