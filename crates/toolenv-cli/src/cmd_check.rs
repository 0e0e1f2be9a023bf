// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that environments resolve against the configured catalog.

use clap::Args;
use colored::Colorize;
use miette::Result;

/// Verify that environments resolve
#[derive(Debug, Args)]
pub struct CmdCheck {
    /// Environments to check (default: all)
    names: Vec<String>,

    #[clap(flatten)]
    registry: crate::RegistryFlags,
}

impl CmdCheck {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;
        let catalog = loaded.config.catalog();

        let names: Vec<String> = if self.names.is_empty() {
            loaded.registry.names().map(String::from).collect()
        } else {
            self.names.clone()
        };

        let mut failures = 0;
        for name in &names {
            let descriptor = loaded.registry.resolve(name)?;

            for dupe in descriptor.duplicate_tools() {
                tracing::warn!(env = %name, tool = %dupe, "tool listed more than once");
            }

            match toolenv::materialize(descriptor, &catalog) {
                Ok(aggregate) => {
                    println!(
                        "{} {} ({} path(s))",
                        "✓".green(),
                        name,
                        aggregate.paths.len()
                    );
                }
                Err(err) => {
                    failures += 1;
                    println!("{} {}: {}", "✗".red(), name, err);
                }
            }
        }

        if failures > 0 {
            eprintln!("{failures} of {} environment(s) failed to resolve", names.len());
            return Ok(1);
        }
        Ok(0)
    }
}
