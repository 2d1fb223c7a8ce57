//! # Devin CLI
//!
//! Command-line client for the Devin session API.
//!
//! ## Quick Start
//!
//! ```bash
//! # Save your API token
//! devin auth
//!
//! # Interactive walkthrough
//! devin
//!
//! # Scripted, never prompts
//! devin --prompt "Fix the flaky test" --tags ci,tests --idempotent --non-interactive
//!
//! # Start from a playbook
//! devin playbook --playbook-id pb-123 --prompt "Upgrade dependencies"
//! ```
//!
//! Failures exit non-zero with a code per failure class (see `SessionError::exit_code`).

use clap::Parser;
use devin_cli::{commands, logging, Cli, SessionError};

/// Main entry point for the Devin CLI
///
/// Parses command-line arguments and delegates to the command handler. Errors
/// are printed to stderr and mapped onto the process exit code.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(err) = commands::run(cli.cmd, cli.create).await {
        eprintln!("❌ Error: {err:#}");
        let session_err = err.downcast_ref::<SessionError>();
        if matches!(session_err, Some(SessionError::MissingCredential)) {
            eprintln!("\nTo set up authentication, run:\n  devin auth");
            eprintln!("\nOr set the environment variable:\n  export DEVIN_API_KEY=your_token_here");
        }
        std::process::exit(session_err.map_or(1, SessionError::exit_code));
    }
}
