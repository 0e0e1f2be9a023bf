// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `toolenv show` command.

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

/// Display an environment and its resolved tools
#[derive(Debug, Args)]
pub struct CmdShow {
    /// Environment name
    name: String,

    #[clap(flatten)]
    registry: crate::RegistryFlags,

    /// Skip resolving tools against the catalog
    #[clap(long)]
    no_resolve: bool,

    /// Output format: table, yaml, json
    #[clap(long, default_value = "table")]
    format: String,
}

impl CmdShow {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;
        let descriptor = loaded.registry.resolve(&self.name)?;

        let aggregate = if self.no_resolve {
            None
        } else {
            Some(toolenv::materialize(descriptor, &loaded.config.catalog())?)
        };

        match self.format.as_str() {
            "yaml" => self.show_yaml(descriptor)?,
            "json" => self.show_json(descriptor, aggregate.as_ref())?,
            _ => self.show_table(descriptor, aggregate.as_ref()),
        }

        Ok(0)
    }

    fn show_table(
        &self,
        descriptor: &toolenv::EnvironmentDescriptor,
        aggregate: Option<&toolenv::AggregateEnvironment>,
    ) {
        println!("{} {}", "Environment:".bold(), descriptor.name.cyan());
        if let Some(desc) = &descriptor.description {
            println!("  {}", desc.dimmed());
        }
        if let Some(path) = &descriptor.source_path {
            println!("  {}", path.display().to_string().dimmed());
        }
        println!();

        println!("{}", "Tools:".bold());
        println!();
        if descriptor.tools.is_empty() {
            println!("  {}", "(no tools)".dimmed());
        }
        for (i, tool) in descriptor.tools.iter().enumerate() {
            let location = aggregate
                .and_then(|a| a.contributions.get(i))
                .map(|c| format!(" -> {}", c.path.display()))
                .unwrap_or_default();
            println!("  {}. {}{}", i + 1, tool.to_string().green(), location.dimmed());
        }

        if let Some(aggregate) = aggregate {
            println!();
            println!("Total: {} unique path(s)", aggregate.paths.len());
        }

        if !descriptor.environment.is_empty() {
            println!();
            println!("{}", "Environment Variables:".bold());
            println!();
            for (i, op) in descriptor.environment.iter().enumerate() {
                match op {
                    toolenv::EnvOp::Set(s) => {
                        println!("  {}. {} = {}", i + 1, s.set.cyan(), s.value.green());
                    }
                    toolenv::EnvOp::Unset(u) => {
                        println!("  {}. unset {}", i + 1, u.unset.cyan());
                    }
                    toolenv::EnvOp::Prepend(p) => {
                        println!(
                            "  {}. {} = {} + ${}",
                            i + 1,
                            p.prepend.cyan(),
                            p.value.green(),
                            p.prepend
                        );
                    }
                    toolenv::EnvOp::Append(a) => {
                        println!(
                            "  {}. {} = ${} + {}",
                            i + 1,
                            a.append.cyan(),
                            a.append,
                            a.value.green()
                        );
                    }
                    toolenv::EnvOp::Comment(c) => {
                        println!("  # {}", c.comment.dimmed());
                    }
                }
            }
        }

        if let Some(init) = &descriptor.init {
            println!();
            println!("{}", "Init Script:".bold());
            println!();
            for line in init.lines() {
                println!("  {line}");
            }
        }
    }

    fn show_yaml(&self, descriptor: &toolenv::EnvironmentDescriptor) -> Result<()> {
        if let Some(path) = &descriptor.source_path {
            println!("# {}", path.display());
        }
        print!("{}", descriptor.to_yaml()?);
        Ok(())
    }

    fn show_json(
        &self,
        descriptor: &toolenv::EnvironmentDescriptor,
        aggregate: Option<&toolenv::AggregateEnvironment>,
    ) -> Result<()> {
        let value = serde_json::json!({
            "name": descriptor.name,
            "description": descriptor.description,
            "source": descriptor.source_path,
            "tools": descriptor.tools.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "paths": aggregate.map(|a| a.paths.iter().collect::<Vec<_>>()),
            "init": descriptor.init,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).into_diagnostic()?
        );
        Ok(())
    }
}
