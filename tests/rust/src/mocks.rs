//! Mock remote-content client for testing
//!
//! In-memory implementation of the `ContentClient` trait for fast, isolated
//! tests. Behaviour is configurable per test: artificial latency, missing
//! created ids and broken download streams.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use spdesk_core::client::{ByteStream, ContentClient};
use spdesk_core::domain::{AttachmentInfo, ListQuery, QuerySummary, Record};
use spdesk_core::error::RemoteError;

fn not_found(what: String) -> RemoteError {
    RemoteError::Status {
        status: 404,
        message: what,
    }
}

/// Build a [`Record`] from a JSON object literal.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record(map),
        other => panic!("record fixture must be an object, got {other}"),
    }
}

#[derive(Default)]
pub struct MockContentClient {
    items: RwLock<BTreeMap<i64, Record>>,
    attachments: RwLock<HashMap<(i64, String), Vec<u8>>>,
    urls: RwLock<HashMap<String, Vec<u8>>>,
    next_id: AtomicI64,
    delay: Option<Duration>,
    omit_created_ids: bool,
    broken_streams: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl MockContentClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Delay every call, to leave a window for cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Creation responses carry no usable identifier.
    pub fn with_omitted_ids(mut self) -> Self {
        self.omit_created_ids = true;
        self
    }

    /// Download streams fail after the first chunk.
    pub fn with_broken_streams(mut self) -> Self {
        self.broken_streams = true;
        self
    }

    pub fn with_item(self, id: i64, item: Record) -> Self {
        self.items.write().unwrap().insert(id, item);
        self
    }

    pub fn with_attachment(self, id: i64, name: &str, content: &[u8]) -> Self {
        self.attachments
            .write()
            .unwrap()
            .insert((id, name.to_string()), content.to_vec());
        self
    }

    pub fn with_url(self, url: &str, content: &[u8]) -> Self {
        self.urls
            .write()
            .unwrap()
            .insert(url.to_string(), content.to_vec());
        self
    }

    /// Names of the trait methods invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn touch(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn stream_of(&self, content: Vec<u8>) -> ByteStream {
        if self.broken_streams {
            let cut = content.len() / 2;
            let chunks: Vec<Result<Bytes, RemoteError>> = vec![
                Ok(Bytes::copy_from_slice(&content[..cut])),
                Err(RemoteError::Decode("connection reset".into())),
            ];
            return Box::pin(futures::stream::iter(chunks));
        }
        let chunks: Vec<Result<Bytes, RemoteError>> = content
            .chunks(3)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Box::pin(futures::stream::iter(chunks))
    }
}

#[async_trait]
impl ContentClient for MockContentClient {
    async fn list_items(
        &self,
        _query: &ListQuery,
    ) -> Result<(Vec<Record>, QuerySummary), RemoteError> {
        self.touch("list_items");
        self.pause().await;
        let items: Vec<Record> = self.items.read().unwrap().values().cloned().collect();
        let summary = QuerySummary {
            items: items.len(),
            pages_fetched: 1,
            ..Default::default()
        };
        Ok((items, summary))
    }

    async fn get_item(&self, _list: &str, id: i64, _select: &str) -> Result<Record, RemoteError> {
        self.touch("get_item");
        self.pause().await;
        self.items
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(format!("item {id} not found")))
    }

    async fn add_item(&self, _list: &str, fields: &Record) -> Result<Record, RemoteError> {
        self.touch("add_item");
        self.pause().await;
        if self.omit_created_ids {
            return Ok(fields.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut created = fields.clone();
        created.0.insert("ID".to_string(), Value::from(id));
        self.items.write().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update_item(
        &self,
        _list: &str,
        id: i64,
        fields: &Record,
    ) -> Result<(), RemoteError> {
        self.touch("update_item");
        self.pause().await;
        let mut items = self.items.write().unwrap();
        let existing = items
            .get_mut(&id)
            .ok_or_else(|| not_found(format!("item {id} not found")))?;
        for (k, v) in &fields.0 {
            existing.0.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, _list: &str, id: i64) -> Result<(), RemoteError> {
        self.touch("delete_item");
        self.pause().await;
        self.items
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(format!("item {id} not found")))
    }

    async fn list_attachments(
        &self,
        _list: &str,
        id: i64,
    ) -> Result<Vec<AttachmentInfo>, RemoteError> {
        self.touch("list_attachments");
        self.pause().await;
        let mut out: Vec<AttachmentInfo> = self
            .attachments
            .read()
            .unwrap()
            .keys()
            .filter(|(item, _)| *item == id)
            .map(|(item, name)| AttachmentInfo {
                file_name: name.clone(),
                server_relative_url: format!("/sites/test/Attachments/{item}/{name}"),
            })
            .collect();
        out.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(out)
    }

    async fn add_attachment(
        &self,
        _list: &str,
        id: i64,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo, RemoteError> {
        self.touch("add_attachment");
        self.pause().await;
        self.attachments
            .write()
            .unwrap()
            .insert((id, file_name.to_string()), content);
        Ok(AttachmentInfo {
            file_name: file_name.to_string(),
            server_relative_url: format!("/sites/test/Attachments/{id}/{file_name}"),
        })
    }

    async fn download_attachment(
        &self,
        _list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        self.touch("download_attachment");
        self.pause().await;
        self.attachments
            .read()
            .unwrap()
            .get(&(id, file_name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(format!("attachment {file_name} not found")))
    }

    async fn delete_attachment(
        &self,
        _list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<(), RemoteError> {
        self.touch("delete_attachment");
        self.pause().await;
        self.attachments
            .write()
            .unwrap()
            .remove(&(id, file_name.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found(format!("attachment {file_name} not found")))
    }

    async fn attachment_stream(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> Result<ByteStream, RemoteError> {
        self.touch("attachment_stream");
        let content = self.download_attachment(list, id, file_name).await?;
        Ok(self.stream_of(content))
    }

    async fn download_by_url(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        self.touch("download_by_url");
        self.pause().await;
        self.urls
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| not_found(format!("url {url} not found")))
    }

    async fn url_stream(&self, url: &str) -> Result<ByteStream, RemoteError> {
        self.touch("url_stream");
        let content = self.download_by_url(url).await?;
        Ok(self.stream_of(content))
    }
}
