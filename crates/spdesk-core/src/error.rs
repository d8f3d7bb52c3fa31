//! Error taxonomy for the core service.
//!
//! Every failing operation returns a descriptive error to the caller; nothing
//! here panics or terminates the process on a remote failure. Retries, if any,
//! belong to the remote query engine, not to this crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or parsing the credential file.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed credential file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("credential file has no siteUrl")]
    MissingSiteUrl,

    #[error("invalid siteUrl: {0}")]
    InvalidSiteUrl(#[from] url::ParseError),
}

/// Failure surfaced by the remote-content client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The operation's cancellation token fired before the call returned.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation outlived the configured global timeout.
    #[error("operation timed out")]
    TimedOut,

    /// The remote service answered with a non-success status.
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or protocol failure below the API layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Stage at which a streamed save failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Open,
    Read,
    Write,
    Flush,
}

impl std::fmt::Display for TransferStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransferStage::Open => "open",
            TransferStage::Read => "read",
            TransferStage::Write => "write",
            TransferStage::Flush => "flush",
        };
        f.write_str(s)
    }
}

/// Top-level error type returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Credential file missing, unreadable or malformed. Fatal to
    /// `ensure_ready`; recoverable by fixing the configuration and retrying.
    #[error("failed to load credentials from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: CredentialError,
    },

    /// Rejected before any network call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Surfaced verbatim from the remote-content client.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Failure while streaming a remote payload to local storage.
    #[error("transfer failed during {stage}: {source}")]
    Transfer {
        stage: TransferStage,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    /// True when the error is the cooperative-cancellation variant.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Remote(RemoteError::Cancelled))
    }
}
