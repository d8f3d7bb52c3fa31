//! Shared test utilities and fixtures for spdesk integration tests.

use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use spdesk_core::client::ContentClient;
use spdesk_core::domain::ServiceConfig;
use spdesk_core::service::{ClientFactory, ContentService};

/// Mock remote-content client
pub mod mocks;
pub use mocks::{record, MockContentClient};

/// A [`ContentService`] wired to a mock client, plus its observables.
pub struct ServiceHarness {
    pub service: ContentService,
    pub client: Arc<MockContentClient>,
    /// How many times the session's client was (re)built.
    pub sessions_built: Arc<AtomicUsize>,
    // Keep the credential file alive for the duration of the test.
    _credential_file: tempfile::NamedTempFile,
}

impl ServiceHarness {
    pub fn sessions_built(&self) -> usize {
        self.sessions_built.load(Ordering::SeqCst)
    }
}

/// Write a minimal valid credential file.
pub fn credential_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp credential file");
    f.write_all(br#"{"siteUrl":"https://contoso.example/sites/ops"}"#)
        .expect("write credential file");
    f
}

/// Default configuration pointing at `file`, mirroring the shell's defaults.
pub fn config_for(file: &tempfile::NamedTempFile) -> ServiceConfig {
    ServiceConfig {
        config_path: file.path().to_string_lossy().into_owned(),
        ..Default::default()
    }
}

/// Build a harness around `client` with the given configuration.
pub fn harness_with(client: MockContentClient, config: ServiceConfig) -> ServiceHarness {
    let credential_file = credential_file();
    let mut config = config;
    config.config_path = credential_file.path().to_string_lossy().into_owned();

    let client = Arc::new(client);
    let sessions_built = Arc::new(AtomicUsize::new(0));

    let factory_client = Arc::clone(&client);
    let factory_count = Arc::clone(&sessions_built);
    let factory: ClientFactory = Arc::new(move |_creds, _transport| {
        factory_count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&factory_client) as Arc<dyn ContentClient>)
    });

    ServiceHarness {
        service: ContentService::with_client_factory(config, factory),
        client,
        sessions_built,
        _credential_file: credential_file,
    }
}

/// Build a harness with default configuration.
pub fn harness(client: MockContentClient) -> ServiceHarness {
    harness_with(client, ServiceConfig::default())
}
