//! Application state management.
//!
//! Holds the core service shared between Tauri commands.

use std::sync::Arc;

use spdesk_core::domain::ServiceConfig;
use spdesk_core::service::ContentService;
use tracing::info;

/// Global application state accessible from commands.
pub struct AppState {
    /// The remote-content service facade.
    pub service: Arc<ContentService>,
}

impl AppState {
    /// Create the application state with safe default configuration.
    ///
    /// The frontend can replace the configuration at any time through the
    /// `set_config` command; the session rebuilds lazily on the next call.
    pub fn new() -> Self {
        let config = ServiceConfig::default();
        info!(
            credential_path = %config.config_path,
            timeout_secs = config.global_timeout_secs,
            "content service initialized"
        );
        Self {
            service: Arc::new(ContentService::new(config)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
