// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! toolenv - Named Tool Environments CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_check;
mod cmd_env;
mod cmd_init;
mod cmd_list;
mod cmd_lock;
mod cmd_run;
mod cmd_shell;
mod cmd_show;

use cmd_check::CmdCheck;
use cmd_env::CmdEnv;
use cmd_init::CmdInit;
use cmd_list::CmdList;
use cmd_lock::CmdLock;
use cmd_run::CmdRun;
use cmd_shell::CmdShell;
use cmd_show::CmdShow;

#[derive(Parser)]
#[clap(
    name = "toolenv",
    about = "Named Tool Environments",
    version,
    long_about = "Activate named, reproducible sets of development tools described by .toolenv.yaml files"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Where to find descriptors.
#[derive(Parser, Clone, Debug, Default)]
pub struct RegistryFlags {
    /// Registry directory (default: nearest .toolenv above the current directory)
    #[clap(long, short = 'r', env = "TOOLENV_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Additional registry directories, colon-separated
    #[clap(long, env = "TOOLENV_INCLUDE", default_value = "")]
    pub include: String,
}

/// A loaded registry together with its configuration.
pub struct Loaded {
    pub dirs: Vec<PathBuf>,
    pub registry: toolenv::Registry,
    pub config: toolenv::Config,
}

impl Loaded {
    /// Primary registry directory.
    pub fn primary_dir(&self) -> &std::path::Path {
        &self.dirs[0]
    }
}

impl RegistryFlags {
    pub fn discovery_options(&self) -> toolenv::DiscoveryOptions {
        toolenv::DiscoveryOptions {
            registry: self.registry.clone(),
            includes: toolenv::DiscoveryOptions::parse_include_list(&self.include),
        }
    }

    /// Discover and load the registry and configuration.
    pub fn load(&self) -> Result<Loaded> {
        let dirs = toolenv::discover_registry(".", &self.discovery_options())?;
        let registry = toolenv::Registry::load_dirs(&dirs)?;
        let config = toolenv::Config::load(dirs.first().map(PathBuf::as_path))?;
        tracing::debug!(
            environments = registry.len(),
            catalogs = config.catalogs.len(),
            "loaded registry"
        );
        Ok(Loaded {
            dirs,
            registry,
            config,
        })
    }
}

#[derive(Subcommand)]
enum Command {
    /// List available environments
    List(CmdList),

    /// Display an environment and its resolved tools
    Show(CmdShow),

    /// Verify that environments resolve
    Check(CmdCheck),

    /// Enter interactive shell in environment
    Shell(CmdShell),

    /// Run a command inside an environment
    Run(CmdRun),

    /// Print shell statements that activate an environment
    Env(CmdEnv),

    /// Create a new environment descriptor
    Init(CmdInit),

    /// Generate or verify the lock file
    Lock(CmdLock),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::List(mut cmd) => cmd.run().await,
            Command::Show(mut cmd) => cmd.run().await,
            Command::Check(mut cmd) => cmd.run().await,
            Command::Shell(mut cmd) => cmd.run().await,
            Command::Run(mut cmd) => cmd.run().await,
            Command::Env(mut cmd) => cmd.run().await,
            Command::Init(mut cmd) => cmd.run().await,
            Command::Lock(mut cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;
