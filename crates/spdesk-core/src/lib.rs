//! # spdesk Core Library
//!
//! Session, operation and transfer lifecycle for the spdesk desktop client.
//!
//! ## Modules
//!
//! - `domain` - Configuration, credentials, records and wire DTOs
//! - `client` - Remote-content client seam and its REST implementation
//! - `service` - Session manager, operation contexts, transport, transfers
//! - `error` - Error taxonomy returned to the shell

pub mod client;
pub mod domain;
pub mod error;
pub mod service;

// Re-export commonly used types
pub use client::{ByteStream, ContentClient};
pub use domain::*;
pub use error::{CredentialError, RemoteError, ServiceError, TransferStage};
pub use service::*;
