//! Wire DTOs shared between the UI layer and the remote-content client.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Parameters for a list query, as submitted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    #[serde(rename = "list")]
    pub list_name: String,
    pub select: String,
    pub filter: String,
    pub orderby: String,
    pub top: i64,
    /// Fetch every page (the paging itself is owned by the remote engine).
    pub all: bool,
    #[serde(rename = "latestOnly")]
    pub latest_only: bool,
}

/// Statistics reported by the remote query engine for one list call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub items: usize,
    #[serde(rename = "pages")]
    pub pages_fetched: usize,
    pub throttled: bool,
    pub partial: bool,
    #[serde(rename = "fallback")]
    pub used_fallback: bool,
    #[serde(rename = "stoppedEarly")]
    pub stopped_early: bool,
}

/// Items plus query statistics, returned to the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<Record>,
    pub summary: QuerySummary,
}

/// Attachment descriptor.
///
/// Serialized camelCase for the UI; the PascalCase aliases accept the raw
/// shape the remote REST endpoints answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    #[serde(alias = "FileName")]
    pub file_name: String,
    #[serde(alias = "ServerRelativeUrl", alias = "ServerRelativeURL")]
    pub server_relative_url: String,
}
