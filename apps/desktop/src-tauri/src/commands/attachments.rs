//! Attachment commands.

use tauri::State;
use tracing::debug;

use spdesk_core::domain::AttachmentInfo;

use crate::state::AppState;

#[tauri::command]
pub async fn list_attachments(
    list: String,
    id: i64,
    app_state: State<'_, AppState>,
) -> Result<Vec<AttachmentInfo>, String> {
    app_state
        .service
        .list_attachments(&list, id)
        .await
        .map_err(|e| e.to_string())
}

/// Upload (or replace) an attachment. Content arrives as bytes from the
/// webview.
#[tauri::command]
pub async fn add_attachment(
    list: String,
    id: i64,
    file_name: String,
    content: Vec<u8>,
    app_state: State<'_, AppState>,
) -> Result<AttachmentInfo, String> {
    debug!(file = %file_name, bytes = content.len(), "add_attachment");
    app_state
        .service
        .add_attachment(&list, id, &file_name, content)
        .await
        .map_err(|e| e.to_string())
}

/// Download an attachment into memory, for the frontend to handle.
#[tauri::command]
pub async fn download_attachment(
    list: String,
    id: i64,
    file_name: String,
    app_state: State<'_, AppState>,
) -> Result<Vec<u8>, String> {
    app_state
        .service
        .download_attachment(&list, id, &file_name)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_attachment(
    list: String,
    id: i64,
    file_name: String,
    app_state: State<'_, AppState>,
) -> Result<bool, String> {
    app_state
        .service
        .delete_attachment(&list, id, &file_name)
        .await
        .map_err(|e| e.to_string())
}

/// Download by absolute URL or server-relative path, into memory.
#[tauri::command]
pub async fn download_by_url(
    url: String,
    app_state: State<'_, AppState>,
) -> Result<Vec<u8>, String> {
    app_state
        .service
        .download_by_url(&url)
        .await
        .map_err(|e| e.to_string())
}
