//! CLI command definitions for the `taleweaver` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod backend;
pub mod tale;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Generate, store, and share children's stories.
#[derive(Parser)]
#[command(name = "taleweaver", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate a tale draft without saving it.
    Generate {
        /// Age band: 3-4, 5-8 or 9-12.
        #[arg(long)]
        age: String,

        /// What the story is about.
        #[arg(long)]
        topic: String,

        #[arg(long)]
        setting: Option<String>,

        #[arg(long)]
        characters: Option<String>,

        /// happy, adventurous, educational or calming (default: happy).
        #[arg(long)]
        mood: Option<String>,
    },

    /// List stored tales.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Check connectivity to the configured generation backend.
    #[command(name = "check-backend")]
    CheckBackend,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// Public tales, newest first.
    Public {
        /// Mark tales liked by this user.
        #[arg(long)]
        viewer: Option<String>,
    },

    /// Tales authored by a user, newest first.
    Mine {
        #[arg(long)]
        user: String,
    },
}
