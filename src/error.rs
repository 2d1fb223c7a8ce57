//! Failure taxonomy for credential handling, parameter resolution and
//! session submission.
//!
//! Every failure the core can produce is one of these variants, so the
//! invocation boundary can pick an exit code and a remedy without string
//! matching.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No credential in the environment or the credential file.
    #[error("no Devin API token found; run 'devin auth' or export DEVIN_API_KEY")]
    MissingCredential,
    /// The remote service rejected the credential.
    #[error("credential rejected: {0}")]
    InvalidCredential(String),
    /// Connection failure or timeout; the credential was never judged.
    #[error("service unreachable: {0}")]
    Unreachable(String),
    /// Missing/malformed parameter or a request the service rejected as invalid.
    #[error("{0}")]
    Validation(String),
    /// A referenced snapshot, secret, knowledge or playbook id does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error (HTTP {status}): {message}")]
    TransientServer { status: u16, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::Io(_) => 1,
            SessionError::Validation(_) => 2,
            SessionError::MissingCredential => 3,
            SessionError::InvalidCredential(_) => 4,
            SessionError::NotFound(_) => 5,
            SessionError::Unreachable(_) => 6,
            SessionError::TransientServer { .. } => 7,
        }
    }

    /// Whether resubmitting unchanged could succeed. The client itself never
    /// retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::Unreachable(_) | SessionError::TransientServer { .. }
        )
    }
}
