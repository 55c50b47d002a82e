//! CLI command definitions for the `parlor` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat session history with an LRU session cache.
#[derive(Parser)]
#[command(name = "parlor", version, about, long_about = None)]
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

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "PARLOR_LOG_JSON")]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "PARLOR_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Save one chat turn to a session.
    Save {
        /// User who wrote the message.
        #[arg(long)]
        user: String,

        /// Session the turn belongs to.
        #[arg(long)]
        session: String,

        /// The user's message.
        #[arg(long)]
        message: String,

        /// The assistant's response (may be empty).
        #[arg(long)]
        response: String,
    },

    /// Show the history of a session.
    History {
        /// Session id.
        session: String,
    },

    /// List a user's sessions, most recent first.
    Sessions {
        /// User id.
        user: String,
    },

    /// Show every turn a user has written.
    Chats {
        /// User id.
        user: String,
    },

    /// Mint a new session id.
    #[command(name = "new-session")]
    NewSession,

    /// Delete a session and its history.
    #[command(name = "delete-session", alias = "rm")]
    DeleteSession {
        /// Session id.
        session: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },

    /// Store and cache status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
