use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `netmedic` - diagnose and repair home WiFi from a plain-language question.
#[derive(Parser, Debug)]
#[command(name = "netmedic")]
#[command(version)]
#[command(about = "Diagnose and repair home WiFi problems.", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.netmedic/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question about the network, fixing it when asked to
    Diagnose {
        /// What is wrong, e.g. "my wifi keeps dropping, fix it"
        query: String,

        /// Include the throughput test and trace route
        #[arg(long)]
        slow: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a diagnostic snapshot without changing anything
    Status {
        /// Include the throughput test and trace route
        #[arg(long)]
        slow: bool,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which fix actions a query would run, without running them
    Plan {
        query: String,
    },
}
