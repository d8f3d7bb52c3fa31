//! Service configuration.
//!
//! One immutable snapshot per session: replacing the configuration through
//! [`crate::service::session::SessionManager::set_config`] discards the live
//! session, and the next call rebuilds everything from the new snapshot.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Runtime configuration submitted by the UI.
///
/// The HTTP tuning knobs are deliberately not part of the UI contract; they
/// keep their defaults unless a host embeds the core directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    /// Path to the credential file.
    pub config_path: String,
    /// Optional site URL override; empty means "use the credential file's".
    pub site_url: String,
    /// Global per-operation timeout in seconds; non-positive means unbounded.
    pub global_timeout_secs: i64,
    /// Strip `__`-prefixed metadata keys from returned records.
    pub clean_output: bool,

    /// Total idle-connection budget. reqwest pools per host, so the per-host
    /// knob below is the one that takes effect; this is kept for parity with
    /// hosts that tune both.
    #[serde(skip)]
    pub http_max_idle_conns: i64,
    #[serde(skip)]
    pub http_max_idle_per_host: i64,
    /// Idle pool timeout in seconds. Kept below typical proxy idle cutoffs.
    #[serde(skip)]
    pub http_idle_timeout_secs: i64,
    #[serde(skip)]
    pub http_handshake_timeout_secs: i64,
    #[serde(skip)]
    pub http_disable_keep_alives: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            config_path: "private.json".to_string(),
            site_url: String::new(),
            global_timeout_secs: 60,
            clean_output: false,
            http_max_idle_conns: 40,
            http_max_idle_per_host: 4,
            http_idle_timeout_secs: 20,
            http_handshake_timeout_secs: 10,
            http_disable_keep_alives: false,
        }
    }
}

impl ServiceConfig {
    /// Global operation timeout, or `None` when unbounded.
    pub fn global_timeout(&self) -> Option<Duration> {
        if self.global_timeout_secs > 0 {
            Some(Duration::from_secs(self.global_timeout_secs as u64))
        } else {
            None
        }
    }

    /// Credential file path, defaulting to `private.json` when unset.
    pub fn credential_path(&self) -> &str {
        if self.config_path.is_empty() {
            "private.json"
        } else {
            &self.config_path
        }
    }
}
