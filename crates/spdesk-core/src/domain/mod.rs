//! Domain types: configuration, credentials, records and wire DTOs.

pub mod config;
pub mod credentials;
pub mod query;
pub mod record;

pub use config::ServiceConfig;
pub use credentials::{ClientOptions, Credentials, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use query::{AttachmentInfo, ListQuery, ListResponse, QuerySummary};
pub use record::{maybe_clean, maybe_clean_one, Record};
