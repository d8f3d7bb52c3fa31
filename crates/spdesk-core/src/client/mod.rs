//! Remote-content client seam.
//!
//! The query/paging engine is an external collaborator: this trait defines the
//! per-call surface the core consumes, without specifying how queries are
//! paged, throttled or retried. [`rest::RestContentClient`] is the production
//! implementation; tests substitute an in-memory mock.

pub mod rest;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::domain::{AttachmentInfo, ListQuery, QuerySummary, Record};
use crate::error::RemoteError;

/// Streaming body of a remote download.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RemoteError>> + Send>>;

/// Per-call operations offered by the remote-content service.
///
/// Cancellation is cooperative and external: callers race these futures
/// against an operation context, and dropping a future aborts its request.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn list_items(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Record>, QuerySummary), RemoteError>;

    async fn get_item(&self, list: &str, id: i64, select: &str) -> Result<Record, RemoteError>;

    async fn add_item(&self, list: &str, fields: &Record) -> Result<Record, RemoteError>;

    async fn update_item(&self, list: &str, id: i64, fields: &Record) -> Result<(), RemoteError>;

    async fn delete_item(&self, list: &str, id: i64) -> Result<(), RemoteError>;

    async fn list_attachments(
        &self,
        list: &str,
        id: i64,
    ) -> Result<Vec<AttachmentInfo>, RemoteError>;

    async fn add_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo, RemoteError>;

    async fn download_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<Vec<u8>, RemoteError>;

    async fn delete_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<(), RemoteError>;

    /// Streaming variant of [`ContentClient::download_attachment`].
    async fn attachment_stream(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<ByteStream, RemoteError>;

    /// Download by absolute URL or server-relative path.
    async fn download_by_url(&self, url: &str) -> Result<Vec<u8>, RemoteError>;

    /// Streaming variant of [`ContentClient::download_by_url`].
    async fn url_stream(&self, url: &str) -> Result<ByteStream, RemoteError>;
}
