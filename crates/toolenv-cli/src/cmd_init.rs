// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `toolenv init` command.

use std::path::PathBuf;

use clap::Args;
use miette::Result;

/// Create a new environment descriptor
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Name of the new environment
    name: String,

    /// Directory holding the registry (created if missing)
    #[clap(long, default_value = toolenv::REGISTRY_DIRNAME)]
    dir: PathBuf,

    /// Add a tool reference (source.name)
    #[clap(long = "tool")]
    tools: Vec<String>,

    /// Optional description
    #[clap(long)]
    description: Option<String>,

    /// Init script statement, may be repeated
    #[clap(long = "init")]
    init: Vec<String>,
}

impl CmdInit {
    pub async fn run(&mut self) -> Result<i32> {
        let tools = self
            .tools
            .iter()
            .map(|t| t.parse::<toolenv::ToolReference>())
            .collect::<toolenv::Result<Vec<_>>>()?;

        let mut descriptor = toolenv::EnvironmentDescriptor::new(self.name.clone(), tools);
        descriptor.description = self.description.clone();
        if !self.init.is_empty() {
            descriptor.init = Some(format!("{}\n", self.init.join("\n")));
        }
        descriptor.validate()?;

        let path = self
            .dir
            .join(format!("{}{}", self.name, toolenv::DESCRIPTOR_SUFFIX));
        if path.exists() {
            return Err(miette::miette!(
                "Environment '{}' already exists at {:?}",
                self.name,
                path
            ));
        }

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| miette::miette!("Failed to create {:?}: {}", self.dir, e))?;

        let content = format!(
            "# toolenv environment descriptor\n\
            # Tools are 'source.name' references resolved through the catalogs\n\
            # configured in config.yaml; the init script runs on every activation.\n\
            \n\
            {}",
            descriptor.to_yaml()?
        );
        std::fs::write(&path, content)
            .map_err(|e| miette::miette!("Failed to write {:?}: {}", path, e))?;

        println!("Created {:?}", path);
        println!();
        println!("Next steps:");
        println!("  1. Edit the file to add your tools");
        println!("  2. Run 'toolenv show {}' to preview the environment", self.name);
        println!("  3. Run 'toolenv shell {}' to enter the environment", self.name);

        Ok(0)
    }
}
