//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// s4g static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// subcommands (default: serve the current folder)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site with the default theme
    #[command(visible_alias = "n")]
    New {
        /// Folder for the new site
        #[arg(short, long, default_value = "site1", value_hint = clap::ValueHint::DirPath)]
        folder: PathBuf,
    },

    /// Watch, rebuild and serve a site with live reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Site folder
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub folder: PathBuf,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Rebuild on file changes
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub watch: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            interface: None,
            port: None,
            watch: None,
            verbose: false,
        }
    }
}

impl Cli {
    /// Explicit command, or `serve` with defaults.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            args: ServeArgs::default(),
        })
    }
}
