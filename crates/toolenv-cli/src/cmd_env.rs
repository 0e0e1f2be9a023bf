// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

use clap::Args;
use miette::Result;

/// Print shell statements that activate an environment
///
/// Intended for `eval "$(toolenv env NAME)"`.
#[derive(Debug, Args)]
pub struct CmdEnv {
    /// Environment name
    name: String,

    #[clap(flatten)]
    registry: crate::RegistryFlags,
}

impl CmdEnv {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;
        let descriptor = loaded.registry.resolve(&self.name)?;

        let options = toolenv::ActivateOptions {
            shell: loaded.config.shell(),
            base_env: None,
        };
        let session = toolenv::activate(descriptor, &loaded.config.catalog(), &options).await?;

        // stdout is reserved for the script itself
        eprint!("{}{}", session.stdout, session.stderr);
        let session = session.into_ready()?;

        print!("{}", session.startup_script());
        Ok(0)
    }
}
