// Copyright (c) Contributors to the toolenv project.
// SPDX-License-Identifier: Apache-2.0

//! Generate or verify lock files for toolenv registries.

use clap::Args;
use miette::Result;

/// Generate or verify the lock file
#[derive(Debug, Args)]
pub struct CmdLock {
    #[clap(flatten)]
    registry: crate::RegistryFlags,

    /// Update existing lock file
    #[clap(long)]
    update: bool,

    /// Force regeneration even if up-to-date
    #[clap(long)]
    force: bool,

    /// Verify lock is current (exit 1 if not)
    #[clap(long)]
    check: bool,
}

impl CmdLock {
    pub async fn run(&mut self) -> Result<i32> {
        let loaded = self.registry.load()?;
        let catalog = loaded.config.catalog();
        let lock_path = loaded.primary_dir().join(toolenv::LOCK_FILENAME);

        if self.check {
            if !lock_path.exists() {
                eprintln!("No lock file found at {:?}", lock_path);
                return Ok(2);
            }

            let lock = toolenv::LockFile::load(&lock_path)?;
            let changes = toolenv::verify_lock(&lock, &loaded.registry, &catalog)?;

            if !changes.is_empty() {
                eprintln!("Lock file is out of date:");
                for change in &changes {
                    eprintln!("  - {:?}: {}", change.kind, change.reference);
                    if let (Some(exp), Some(act)) = (&change.expected, &change.actual) {
                        eprintln!("    Expected: {}", exp);
                        eprintln!("    Actual:   {}", act);
                    }
                }
                return Ok(1);
            }

            println!("Lock file is up to date");
            return Ok(0);
        }

        if lock_path.exists() && !self.update && !self.force {
            return Err(miette::miette!(
                "Lock file already exists at {:?}. Use --update or --force",
                lock_path
            ));
        }

        if lock_path.exists() && self.update && !self.force {
            let existing = toolenv::LockFile::load(&lock_path)?;
            if toolenv::verify_lock(&existing, &loaded.registry, &catalog)?.is_empty() {
                println!("Lock file is up to date");
                return Ok(0);
            }
        }

        let lock = toolenv::generate_lock(&loaded.registry, &catalog)?;
        lock.save(&lock_path)?;
        println!("Generated lock file: {:?}", lock_path);

        Ok(0)
    }
}
