// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use clap::Args;
use colored::Colorize;
use miette::Result;

/// List available environments
#[derive(Debug, Args)]
pub struct CmdList {
    #[clap(flatten)]
    registry: crate::RegistryFlags,

    /// Print names only
    #[clap(long)]
    names: bool,
}

impl CmdList {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;

        if self.names {
            for name in loaded.registry.names() {
                println!("{name}");
            }
            return Ok(0);
        }

        for dir in &loaded.dirs {
            println!("{} {}", "Registry:".bold(), dir.display());
        }
        println!();

        if loaded.registry.is_empty() {
            println!("  {}", "(no environments)".dimmed());
            return Ok(0);
        }

        let width = loaded.registry.names().map(str::len).max().unwrap_or(0);
        for descriptor in loaded.registry.iter() {
            let tools = format!("{} tool(s)", descriptor.tools.len());
            println!(
                "  {:width$}  {:>10}  {}",
                descriptor.name.cyan(),
                tools,
                descriptor.description.as_deref().unwrap_or("").dimmed(),
            );
        }

        Ok(0)
    }
}
