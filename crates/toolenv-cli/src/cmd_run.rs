// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `toolenv run` command.

use clap::Args;
use miette::Result;

/// Run a command inside an environment
#[derive(Debug, Args)]
pub struct CmdRun {
    /// Environment name
    pub name: String,

    #[clap(flatten)]
    pub registry: crate::RegistryFlags,

    /// Command to run (default: $SHELL)
    #[clap(last = true)]
    pub command: Vec<String>,
}

impl CmdRun {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;
        let descriptor = loaded.registry.resolve(&self.name)?;

        let options = toolenv::ActivateOptions {
            shell: loaded.config.shell(),
            base_env: None,
        };

        tracing::info!("Activating {}...", descriptor.name);
        let session = toolenv::activate(descriptor, &loaded.config.catalog(), &options).await?;
        print!("{}", session.stdout);
        eprint!("{}", session.stderr);
        let session = session.into_ready()?;

        let (command, args) = match self.command.split_first() {
            Some((cmd, args)) => (cmd.clone(), args.to_vec()),
            None => {
                let shell = session
                    .base_env
                    .get("SHELL")
                    .cloned()
                    .unwrap_or_else(|| "/bin/bash".to_string());
                (shell, Vec::new())
            }
        };

        tracing::info!("Entering environment: {}", session.name);
        let status = tokio::process::Command::new(&command)
            .args(&args)
            .env_clear()
            .envs(&session.env)
            .status()
            .await
            .map_err(|e| miette::miette!("Failed to execute {command}: {e}"))?;

        Ok(status.code().unwrap_or(1))
    }
}
