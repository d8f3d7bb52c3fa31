//! Service facade exposed to the desktop shell.
//!
//! Every operation follows the same shape: guarantee a ready session, mint a
//! cancellable operation context, run the remote call inside it, release the
//! registration. The shell's shutdown hook calls [`ContentService::cancel_current`]
//! unconditionally so no network operation outlives the application.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::{
    maybe_clean, maybe_clean_one, AttachmentInfo, ListQuery, ListResponse, Record, ServiceConfig,
};
use crate::error::ServiceError;
use crate::service::operations::{OperationContext, OperationGuard, OperationRegistry};
use crate::service::session::{ClientFactory, Session, SessionManager};
use crate::service::transfer;

/// The remote-content management service, as the UI sees it.
pub struct ContentService {
    sessions: SessionManager,
    operations: Arc<OperationRegistry>,
}

impl ContentService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            sessions: SessionManager::new(config),
            operations: OperationRegistry::new(),
        }
    }

    /// Construct with a custom client factory (tests, embedders).
    pub fn with_client_factory(config: ServiceConfig, factory: ClientFactory) -> Self {
        Self {
            sessions: SessionManager::with_factory(config, factory),
            operations: OperationRegistry::new(),
        }
    }

    /// Liveness probe for the UI.
    pub fn ping(&self) -> &'static str {
        "ok"
    }

    /// Replace the runtime configuration; the session is rebuilt on next use.
    pub async fn set_config(&self, config: ServiceConfig) {
        self.sessions.set_config(config).await;
    }

    pub fn config(&self) -> ServiceConfig {
        self.sessions.config()
    }

    /// Cancel the in-flight operation, if any. Safe to call at any time,
    /// including once more at shutdown.
    pub fn cancel_current(&self) -> bool {
        self.operations.cancel_current()
    }

    /// Diagnostic pretty-print of any serializable result value.
    pub fn to_pretty_json(&self, value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
    }

    fn clean_output(&self) -> bool {
        self.sessions.config().clean_output
    }

    async fn begin(&self) -> Result<(Arc<Session>, OperationContext, OperationGuard), ServiceError> {
        let session = self.sessions.ensure_ready().await?;
        let (ctx, guard) = self.operations.begin(self.sessions.global_timeout());
        Ok((session, ctx, guard))
    }

    // ----- Items -----

    pub async fn list_items(&self, query: ListQuery) -> Result<ListResponse, ServiceError> {
        let (session, ctx, mut guard) = self.begin().await?;
        let (items, mut summary) = ctx.run(session.client().list_items(&query)).await?;
        guard.release();

        let items = maybe_clean(items, self.clean_output());
        summary.items = items.len();
        Ok(ListResponse { items, summary })
    }

    pub async fn get_item(
        &self,
        list: &str,
        id: i64,
        select: &str,
    ) -> Result<Record, ServiceError> {
        require_id(id)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let item = ctx.run(session.client().get_item(list, id, select)).await?;
        guard.release();
        Ok(maybe_clean_one(item, self.clean_output()))
    }

    /// Create an item, then re-fetch it with `select` applied when the
    /// creation response carries a usable identifier.
    pub async fn add_item(
        &self,
        list: &str,
        fields: Record,
        select: &str,
    ) -> Result<Record, ServiceError> {
        let (session, ctx, mut guard) = self.begin().await?;
        let client = session.client();
        let created = ctx
            .run(async {
                let created = client.add_item(list, &fields).await?;
                match created.extract_id() {
                    Some(id) if id > 0 => client.get_item(list, id, select).await,
                    _ => Ok(created),
                }
            })
            .await?;
        guard.release();
        Ok(maybe_clean_one(created, self.clean_output()))
    }

    pub async fn update_item(
        &self,
        list: &str,
        id: i64,
        fields: Record,
        select: &str,
    ) -> Result<Record, ServiceError> {
        require_id(id)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let client = session.client();
        let updated = ctx
            .run(async {
                client.update_item(list, id, &fields).await?;
                client.get_item(list, id, select).await
            })
            .await?;
        guard.release();
        Ok(maybe_clean_one(updated, self.clean_output()))
    }

    pub async fn delete_item(&self, list: &str, id: i64) -> Result<bool, ServiceError> {
        require_id(id)?;
        let (session, ctx, mut guard) = self.begin().await?;
        ctx.run(session.client().delete_item(list, id)).await?;
        guard.release();
        Ok(true)
    }

    // ----- Attachments -----

    pub async fn list_attachments(
        &self,
        list: &str,
        id: i64,
    ) -> Result<Vec<AttachmentInfo>, ServiceError> {
        require_id(id)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let atts = ctx.run(session.client().list_attachments(list, id)).await?;
        guard.release();
        Ok(atts)
    }

    pub async fn add_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo, ServiceError> {
        require_id(id)?;
        require_file_name(file_name)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let info = ctx
            .run(session.client().add_attachment(list, id, file_name, content))
            .await?;
        guard.release();
        Ok(info)
    }

    pub async fn download_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<Vec<u8>, ServiceError> {
        require_id(id)?;
        require_file_name(file_name)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let bytes = ctx
            .run(session.client().download_attachment(list, id, file_name))
            .await?;
        guard.release();
        debug!(file = file_name, bytes = bytes.len(), "attachment downloaded");
        Ok(bytes)
    }

    pub async fn delete_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<bool, ServiceError> {
        require_id(id)?;
        require_file_name(file_name)?;
        let (session, ctx, mut guard) = self.begin().await?;
        ctx.run(session.client().delete_attachment(list, id, file_name))
            .await?;
        guard.release();
        Ok(true)
    }

    pub async fn download_by_url(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let (session, ctx, mut guard) = self.begin().await?;
        let bytes = ctx.run(session.client().download_by_url(url)).await?;
        guard.release();
        debug!(url, bytes = bytes.len(), "download by url");
        Ok(bytes)
    }

    // ----- Streamed saves -----

    /// Stream a named attachment into `dest`. The destination is supplied by
    /// the shell's save dialog; this call only streams.
    pub async fn save_attachment_to(
        &self,
        dest: &Path,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<PathBuf, ServiceError> {
        require_id(id)?;
        require_file_name(file_name)?;
        let (session, ctx, mut guard) = self.begin().await?;
        let client = session.client();
        let saved = ctx
            .run(async {
                let stream = client.attachment_stream(list, id, file_name).await?;
                transfer::save_stream(dest, stream).await
            })
            .await?;
        guard.release();
        Ok(saved)
    }

    /// Stream an absolute-URL or server-relative download into `dest`.
    pub async fn save_url_to(&self, dest: &Path, url: &str) -> Result<PathBuf, ServiceError> {
        let (session, ctx, mut guard) = self.begin().await?;
        let client = session.client();
        let saved = ctx
            .run(async {
                let stream = client.url_stream(url).await?;
                transfer::save_stream(dest, stream).await
            })
            .await?;
        guard.release();
        Ok(saved)
    }

    /// Write UI-supplied bytes to `dest` (export helper; no session needed).
    pub async fn save_bytes_to(&self, dest: &Path, content: &[u8]) -> Result<PathBuf, ServiceError> {
        transfer::save_bytes(dest, content).await
    }
}

fn require_id(id: i64) -> Result<(), ServiceError> {
    if id <= 0 {
        return Err(ServiceError::InvalidArgument(format!("invalid item id {id}")));
    }
    Ok(())
}

fn require_file_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidArgument("empty file name".into()));
    }
    Ok(())
}
