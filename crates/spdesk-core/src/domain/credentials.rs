//! Credential file loading.
//!
//! The credential file (`private.json` by convention) is produced by an
//! external tool; this module only reads and validates it. The authentication
//! protocol itself is not implemented here: whatever header material the file
//! carries is attached to requests verbatim.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Default request timeout applied when the credential file carries no hint.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Optional client hints nested in the credential file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// Per-request timeout in seconds; non-positive means "use the default".
    pub timeout_seconds: i64,
    /// Informational proxy hint; the transport honors environment proxies.
    pub proxy: Option<String>,
}

/// Contents of the credential configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub site_url: String,
    /// Bearer token material, attached as an `Authorization` header.
    pub bearer_token: Option<String>,
    /// Raw cookie material, attached as a `Cookie` header.
    pub cookie: Option<String>,
    pub options: Option<ClientOptions>,
}

impl Credentials {
    /// Read and validate the credential file at `path`.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let raw = std::fs::read_to_string(path)?;
        let creds: Credentials = serde_json::from_str(&raw)?;
        if creds.site_url.trim().is_empty() {
            return Err(CredentialError::MissingSiteUrl);
        }
        Ok(creds)
    }

    /// Effective per-request timeout: the file's hint when positive, else 30s.
    pub fn effective_timeout(&self) -> std::time::Duration {
        let hint = self.options.as_ref().map(|o| o.timeout_seconds).unwrap_or(0);
        if hint > 0 {
            std::time::Duration::from_secs(hint as u64)
        } else {
            std::time::Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        }
    }
}
