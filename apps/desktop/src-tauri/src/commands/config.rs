//! Configuration and lifecycle commands.

use serde_json::Value;
use tauri::State;
use tauri_plugin_dialog::DialogExt;
use tracing::{debug, info};

use spdesk_core::domain::ServiceConfig;

use crate::state::AppState;

/// Liveness probe for the frontend.
#[tauri::command]
pub fn ping(app_state: State<'_, AppState>) -> String {
    app_state.service.ping().to_string()
}

/// Replace the runtime configuration. The live session (if any) is discarded
/// and rebuilt lazily on the next call.
#[tauri::command]
pub async fn set_config(
    config: ServiceConfig,
    app_state: State<'_, AppState>,
) -> Result<(), String> {
    info!(
        credential_path = %config.config_path,
        site_override = %config.site_url,
        "updating configuration"
    );
    app_state.service.set_config(config).await;
    Ok(())
}

/// Current configuration snapshot (UI-visible fields only).
#[tauri::command]
pub fn get_config(app_state: State<'_, AppState>) -> ServiceConfig {
    app_state.service.config()
}

/// Open a native file dialog to pick the credential file.
///
/// Returns the picked path, or an empty string when the user cancelled.
#[tauri::command]
pub async fn open_config_dialog(app: tauri::AppHandle) -> Result<String, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_title("Choose credential file")
        .add_filter("JSON", &["json"])
        .pick_file(move |picked| {
            let _ = tx.send(picked);
        });

    let picked = rx.await.map_err(|_| "dialog closed unexpectedly".to_string())?;
    match picked {
        Some(path) => {
            let path = path.into_path().map_err(|e| e.to_string())?;
            debug!(path = %path.display(), "credential file picked");
            Ok(path.to_string_lossy().into_owned())
        }
        None => Ok(String::new()),
    }
}

/// Cancel the in-flight operation, if any. Returns whether there was one.
#[tauri::command]
pub fn cancel_current(app_state: State<'_, AppState>) -> bool {
    app_state.service.cancel_current()
}

/// Diagnostic pretty-print of any result value.
#[tauri::command]
pub fn pretty_json(value: Value, app_state: State<'_, AppState>) -> String {
    app_state.service.to_pretty_json(&value)
}
