//! Streamed save commands.
//!
//! These pair a native save dialog with the core's streamed transfer helper:
//! the dialog picks the destination, the core streams into it. An empty
//! string result means the user cancelled the dialog.

use std::path::PathBuf;

use tauri::State;
use tauri_plugin_dialog::DialogExt;
use tracing::info;

use crate::state::AppState;

/// Derive a default file name from a URL or server-relative path.
fn default_file_name(url_or_path: &str) -> String {
    let trimmed = url_or_path.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or_default();
    // Strip any query string an absolute URL might carry.
    let base = base.split('?').next().unwrap_or_default();
    if base.is_empty() || base == "." {
        "download.bin".to_string()
    } else {
        base.to_string()
    }
}

/// Show a native save dialog; `None` means the user cancelled.
async fn pick_save_path(
    app: &tauri::AppHandle,
    title: &str,
    default_name: &str,
) -> Result<Option<PathBuf>, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_title(title)
        .set_file_name(default_name)
        .save_file(move |picked| {
            let _ = tx.send(picked);
        });

    let picked = rx.await.map_err(|_| "dialog closed unexpectedly".to_string())?;
    match picked {
        Some(path) => Ok(Some(path.into_path().map_err(|e| e.to_string())?)),
        None => Ok(None),
    }
}

/// Pick a destination and stream a named attachment into it.
#[tauri::command]
pub async fn save_attachment_pick(
    list: String,
    id: i64,
    file_name: String,
    app: tauri::AppHandle,
    app_state: State<'_, AppState>,
) -> Result<String, String> {
    let Some(dest) = pick_save_path(&app, "Save attachment as…", &file_name).await? else {
        return Ok(String::new());
    };

    let saved = app_state
        .service
        .save_attachment_to(&dest, &list, id, &file_name)
        .await
        .map_err(|e| e.to_string())?;
    info!(dest = %saved.display(), "attachment saved");
    Ok(saved.to_string_lossy().into_owned())
}

/// Pick a destination and stream a URL (absolute or server-relative) into it.
#[tauri::command]
pub async fn save_by_url_pick(
    url: String,
    app: tauri::AppHandle,
    app_state: State<'_, AppState>,
) -> Result<String, String> {
    let default_name = default_file_name(&url);
    let Some(dest) = pick_save_path(&app, "Save file…", &default_name).await? else {
        return Ok(String::new());
    };

    let saved = app_state
        .service
        .save_url_to(&dest, &url)
        .await
        .map_err(|e| e.to_string())?;
    info!(dest = %saved.display(), "url download saved");
    Ok(saved.to_string_lossy().into_owned())
}

/// Pick a destination and write frontend-supplied bytes (export helper).
#[tauri::command]
pub async fn save_bytes_pick(
    default_filename: String,
    content: Vec<u8>,
    app: tauri::AppHandle,
    app_state: State<'_, AppState>,
) -> Result<String, String> {
    let Some(dest) = pick_save_path(&app, "Save file…", &default_filename).await? else {
        return Ok(String::new());
    };

    let saved = app_state
        .service
        .save_bytes_to(&dest, &content)
        .await
        .map_err(|e| e.to_string())?;
    Ok(saved.to_string_lossy().into_owned())
}
