// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Convoy - hierarchy-aware fleet messaging.
//!
//! This is the binary entry point for the Convoy server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod directory;
mod doctor;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use convoy_config::{ConfigError, ConvoyConfig};

/// Convoy - hierarchy-aware fleet messaging.
#[derive(Parser, Debug)]
#[command(name = "convoy", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Manage the mirrored user directory.
    Directory {
        #[command(subcommand)]
        action: DirectoryCommands,
    },
    /// Run diagnostic checks against the configuration and database.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DirectoryCommands {
    /// Upsert users from a TOML file with `[[users]]` entries.
    Import {
        /// Path to the directory file.
        path: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ConvoyConfig, Vec<ConfigError>> {
    match path {
        Some(path) => convoy_config::load_and_validate_path(path),
        None => convoy_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("convoy: use --help for available commands");
        return;
    };

    // Doctor reports config problems itself instead of exiting on them.
    if let Commands::Doctor { plain } = command {
        let loaded = load_config(cli.config.as_ref());
        if !doctor::run_doctor(loaded, plain).await {
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            convoy_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Directory {
            action: DirectoryCommands::Import { path },
        } => directory::run_import(&config, &path).await.map(|count| {
            println!("convoy: imported {count} user(s) from {}", path.display());
        }),
        Commands::Doctor { .. } => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("convoy: {e}");
        std::process::exit(1);
    }
}
