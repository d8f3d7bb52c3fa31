//! Lazy, idempotent session construction.
//!
//! A [`Session`] owns exactly one authenticated client bound to one
//! configuration snapshot. It is created on first use, discarded whenever the
//! configuration changes and rebuilt lazily on the next call. The session and
//! its transport are the only shared mutable resources in the core, and they
//! are replaced wholesale, never partially mutated.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::rest::RestContentClient;
use crate::client::ContentClient;
use crate::domain::{Credentials, ServiceConfig};
use crate::error::{CredentialError, ServiceError};
use crate::service::transport::{spawn_janitor, Transport, TransportTuning};

/// Builds the authenticated client for a freshly constructed session.
///
/// The default factory produces a [`RestContentClient`]; tests inject their
/// own to observe construction or substitute a mock.
pub type ClientFactory = Arc<
    dyn Fn(&Credentials, Arc<Transport>) -> Result<Arc<dyn ContentClient>, CredentialError>
        + Send
        + Sync,
>;

/// Live authenticated client plus the resources tied to its lifetime.
pub struct Session {
    client: Arc<dyn ContentClient>,
    transport: Arc<Transport>,
    janitor_stop: CancellationToken,
}

impl Session {
    pub fn client(&self) -> Arc<dyn ContentClient> {
        Arc::clone(&self.client)
    }

    pub fn transport(&self) -> Arc<Transport> {
        Arc::clone(&self.transport)
    }

    #[cfg(test)]
    pub(crate) fn janitor_stop(&self) -> &CancellationToken {
        &self.janitor_stop
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The janitor has a clear owner: it dies with its session.
        self.janitor_stop.cancel();
    }
}

/// Manages the configuration snapshot and the lazily-built session.
pub struct SessionManager {
    config: RwLock<ServiceConfig>,
    session: tokio::sync::Mutex<Option<Arc<Session>>>,
    factory: ClientFactory,
}

fn default_factory() -> ClientFactory {
    Arc::new(|creds, transport| {
        let client = RestContentClient::new(creds, transport)?;
        Ok(Arc::new(client) as Arc<dyn ContentClient>)
    })
}

impl SessionManager {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_factory(config, default_factory())
    }

    pub fn with_factory(config: ServiceConfig, factory: ClientFactory) -> Self {
        Self {
            config: RwLock::new(config),
            session: tokio::sync::Mutex::new(None),
            factory,
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ServiceConfig {
        self.config.read().clone()
    }

    /// Global operation timeout from the current snapshot.
    pub fn global_timeout(&self) -> Option<Duration> {
        self.config.read().global_timeout()
    }

    /// Replace the configuration snapshot and discard any live session.
    ///
    /// This is the only path that changes which endpoint or credentials are
    /// used at runtime; the next `ensure_ready` rebuilds from scratch.
    pub async fn set_config(&self, config: ServiceConfig) {
        *self.config.write() = config;
        let dropped = self.session.lock().await.take();
        if dropped.is_some() {
            info!("configuration replaced, session discarded");
        }
    }

    /// Return the live session, building it first if necessary.
    ///
    /// Idempotent: concurrent callers serialize on the session slot and the
    /// expensive setup runs at most once per configuration generation.
    pub async fn ensure_ready(&self) -> Result<Arc<Session>, ServiceError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        let cfg = self.config();
        let path = PathBuf::from(cfg.credential_path());
        debug!(path = %path.display(), "loading credentials");
        let mut creds = Credentials::load(&path).map_err(|source| ServiceError::ConfigLoad {
            path: path.clone(),
            source,
        })?;
        if !cfg.site_url.is_empty() {
            creds.site_url = cfg.site_url.clone();
        }

        let request_timeout = creds.effective_timeout();
        let tuning = TransportTuning::resolve(&cfg);
        let transport = Arc::new(Transport::build(tuning, request_timeout)?);

        // Build the client first: the janitor must not outlive a session that
        // never came to exist.
        let client = (self.factory)(&creds, Arc::clone(&transport)).map_err(|source| {
            ServiceError::ConfigLoad {
                path: path.clone(),
                source,
            }
        })?;

        let janitor_stop = CancellationToken::new();
        spawn_janitor(Arc::clone(&transport), janitor_stop.clone());

        let session = Arc::new(Session {
            client,
            transport,
            janitor_stop,
        });
        info!(site = %creds.site_url, timeout = ?request_timeout, "session ready");
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }
}
