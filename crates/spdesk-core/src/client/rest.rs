//! REST-backed implementation of [`ContentClient`].
//!
//! Thin per-call plumbing against the site's `_api/web` endpoints. Paging,
//! throttling detection and fallback strategies are out of scope here; every
//! call maps to exactly one request, and the summary reflects that single
//! page.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{ByteStream, ContentClient};
use crate::domain::{AttachmentInfo, Credentials, ListQuery, QuerySummary, Record};
use crate::error::{CredentialError, RemoteError};
use crate::service::transport::Transport;

const JSON_NOMETADATA: &str = "application/json;odata=nometadata";

/// Auth header material, attached verbatim to every request.
#[derive(Debug, Clone)]
enum AuthHeader {
    Bearer(String),
    Cookie(String),
    None,
}

/// Production client for the remote list/attachment REST surface.
pub struct RestContentClient {
    transport: Arc<Transport>,
    site: Url,
    auth: AuthHeader,
}

#[derive(Debug, Deserialize)]
struct ValueEnvelope<T> {
    value: T,
}

impl RestContentClient {
    /// Build a client bound to the credential file's site and the session's
    /// transport.
    pub fn new(creds: &Credentials, transport: Arc<Transport>) -> Result<Self, CredentialError> {
        let site = Url::parse(creds.site_url.trim_end_matches('/'))?;
        let auth = if let Some(token) = creds.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            AuthHeader::Bearer(token.to_string())
        } else if let Some(cookie) = creds.cookie.as_deref().filter(|c| !c.is_empty()) {
            AuthHeader::Cookie(cookie.to_string())
        } else {
            AuthHeader::None
        };
        Ok(Self { transport, site, auth })
    }

    fn api_url(&self, suffix: &str) -> String {
        format!("{}/_api/web/{}", self.site.as_str().trim_end_matches('/'), suffix)
    }

    fn items_url(&self, list: &str) -> String {
        self.api_url(&format!(
            "lists/getbytitle('{}')/items",
            urlencoding::encode(list)
        ))
    }

    fn item_url(&self, list: &str, id: i64) -> String {
        self.api_url(&format!(
            "lists/getbytitle('{}')/items({id})",
            urlencoding::encode(list)
        ))
    }

    fn attachments_url(&self, list: &str, id: i64) -> String {
        format!("{}/AttachmentFiles", self.item_url(list, id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut req = self
            .transport
            .client()
            .request(method, url)
            .header(ACCEPT, JSON_NOMETADATA);
        match &self.auth {
            AuthHeader::Bearer(token) => {
                req = req.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            AuthHeader::Cookie(cookie) => {
                req = req.header(COOKIE, cookie.clone());
            }
            AuthHeader::None => {}
        }
        req
    }

    /// Resolve an absolute URL or server-relative path into a `$value` fetch.
    fn file_url(&self, url_or_path: &str) -> Result<String, RemoteError> {
        if url_or_path.starts_with("http://") || url_or_path.starts_with("https://") {
            return Ok(url_or_path.to_string());
        }
        let origin = format!(
            "{}://{}",
            self.site.scheme(),
            self.site
                .host_str()
                .ok_or_else(|| RemoteError::Decode("site URL has no host".into()))?
        );
        Ok(format!(
            "{origin}/_api/web/GetFileByServerRelativeUrl('{}')/$value",
            urlencoding::encode(url_or_path)
        ))
    }

    async fn check(resp: Response) -> Result<Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let resp = Self::check(self.request(Method::GET, url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, RemoteError> {
        let resp = Self::check(self.request(Method::GET, url).send().await?).await?;
        Ok(Box::pin(resp.bytes_stream().map_err(RemoteError::from)))
    }
}

/// OData query parameters for a list call.
///
/// `latest_only` wins over `top`; `all` suppresses `$top` entirely so the
/// remote engine pages with its own size. Aggregating pages beyond the first
/// belongs to that engine, not to this client.
fn query_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();
    if !query.select.is_empty() {
        params.push(("$select", query.select.clone()));
    }
    if !query.filter.is_empty() {
        params.push(("$filter", query.filter.clone()));
    }
    if query.latest_only {
        // Most recent item only, unless the caller pinned its own order.
        if query.orderby.is_empty() {
            params.push(("$orderby", "Modified desc".to_string()));
        } else {
            params.push(("$orderby", query.orderby.clone()));
        }
        params.push(("$top", "1".to_string()));
        return params;
    }
    if !query.orderby.is_empty() {
        params.push(("$orderby", query.orderby.clone()));
    }
    if !query.all && query.top > 0 {
        params.push(("$top", query.top.to_string()));
    }
    params
}

#[async_trait]
impl ContentClient for RestContentClient {
    async fn list_items(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Record>, QuerySummary), RemoteError> {
        let params = query_params(query);
        let url = self.items_url(&query.list_name);
        debug!(list = %query.list_name, "listing items");
        let resp = Self::check(
            self.request(Method::GET, &url)
                .query(&params)
                .send()
                .await?,
        )
        .await?;
        let envelope: ValueEnvelope<Vec<Record>> = resp.json().await?;
        let summary = QuerySummary {
            items: envelope.value.len(),
            pages_fetched: 1,
            ..Default::default()
        };
        Ok((envelope.value, summary))
    }

    async fn get_item(&self, list: &str, id: i64, select: &str) -> Result<Record, RemoteError> {
        let url = self.item_url(list, id);
        let mut req = self.request(Method::GET, &url);
        if !select.is_empty() {
            req = req.query(&[("$select", select)]);
        }
        let resp = Self::check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn add_item(&self, list: &str, fields: &Record) -> Result<Record, RemoteError> {
        let url = self.items_url(list);
        let resp = Self::check(
            self.request(Method::POST, &url)
                .header(CONTENT_TYPE, JSON_NOMETADATA)
                .json(fields)
                .send()
                .await?,
        )
        .await?;
        Ok(resp.json().await?)
    }

    async fn update_item(&self, list: &str, id: i64, fields: &Record) -> Result<(), RemoteError> {
        let url = self.item_url(list, id);
        let resp = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, JSON_NOMETADATA)
            .header("X-HTTP-Method", "MERGE")
            .header("IF-MATCH", "*")
            .json(fields)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_item(&self, list: &str, id: i64) -> Result<(), RemoteError> {
        let url = self.item_url(list, id);
        let resp = self
            .request(Method::POST, &url)
            .header("X-HTTP-Method", "DELETE")
            .header("IF-MATCH", "*")
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn list_attachments(
        &self,
        list: &str,
        id: i64,
    ) -> Result<Vec<AttachmentInfo>, RemoteError> {
        let url = self.attachments_url(list, id);
        let resp = Self::check(self.request(Method::GET, &url).send().await?).await?;
        let envelope: ValueEnvelope<Vec<AttachmentInfo>> = resp.json().await?;
        Ok(envelope.value)
    }

    async fn add_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo, RemoteError> {
        // The endpoint rejects duplicates, so replace means delete-then-add.
        let existing = self.list_attachments(list, id).await?;
        if existing.iter().any(|a| a.file_name == file_name) {
            self.delete_attachment(list, id, file_name).await?;
        }

        let url = format!(
            "{}/add(FileName='{}')",
            self.attachments_url(list, id),
            urlencoding::encode(file_name)
        );
        let resp = Self::check(
            self.request(Method::POST, &url)
                .body(content)
                .send()
                .await?,
        )
        .await?;
        Ok(resp.json().await?)
    }

    async fn download_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        let url = format!(
            "{}('{}')/$value",
            self.attachments_url(list, id),
            urlencoding::encode(file_name)
        );
        self.fetch_bytes(&url).await
    }

    async fn delete_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}('{}')",
            self.attachments_url(list, id),
            urlencoding::encode(file_name)
        );
        let resp = self
            .request(Method::POST, &url)
            .header("X-HTTP-Method", "DELETE")
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: format!("attachment {file_name} not found"),
            });
        }
        Self::check(resp).await?;
        Ok(())
    }

    async fn attachment_stream(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<ByteStream, RemoteError> {
        let url = format!(
            "{}('{}')/$value",
            self.attachments_url(list, id),
            urlencoding::encode(file_name)
        );
        self.fetch_stream(&url).await
    }

    async fn download_by_url(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.file_url(url)?;
        self.fetch_bytes(&url).await
    }

    async fn url_stream(&self, url: &str) -> Result<ByteStream, RemoteError> {
        let url = self.file_url(url)?;
        self.fetch_stream(&url).await
    }
}
