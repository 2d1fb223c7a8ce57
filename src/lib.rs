//! # Devin CLI Library
//!
//! Core library for the `devin` command-line client: credential storage,
//! parameter resolution, request building and the session API client.

use clap::Parser;

pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod credential;
pub mod error;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod request;
pub mod resolver;
pub mod schema;
pub mod session;

pub use client::{SessionClient, SessionCreated};
pub use credential::{
    Credential, CredentialStore, CredentialValidity, FileCredentialStore, MemoryCredentialStore,
};
pub use error::SessionError;
pub use resolver::{resolve, ExplicitFlags, InteractionMode, Prompter, ResolvedParams};
pub use session::{launch, Launched};

/// Command-line client for creating Devin sessions
///
/// Parameters come from flags (or their environment variables), interactive
/// prompts and schema defaults. The API token comes from `DEVIN_API_KEY` or
/// the token saved by `devin auth`.
#[derive(Parser)]
#[command(
    name = "devin",
    version,
    args_conflicts_with_subcommands = true,
    about = "Create and manage Devin sessions",
    long_about = "Create Devin sessions from the command line.\n\nRun without arguments for an interactive walkthrough, pass flags for scripting\n(add --non-interactive to never prompt), and use 'devin auth' to save your API token."
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<commands::Commands>,

    #[command(flatten)]
    pub create: commands::create::CreateArgs,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
