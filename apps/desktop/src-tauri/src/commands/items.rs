//! List item commands.

use tauri::State;
use tracing::debug;

use spdesk_core::domain::{ListQuery, ListResponse, Record};

use crate::state::AppState;

#[tauri::command]
pub async fn list_items(
    query: ListQuery,
    app_state: State<'_, AppState>,
) -> Result<ListResponse, String> {
    debug!(list = %query.list_name, "list_items");
    app_state
        .service
        .list_items(query)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_item(
    list: String,
    id: i64,
    select: String,
    app_state: State<'_, AppState>,
) -> Result<Record, String> {
    app_state
        .service
        .get_item(&list, id, &select)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_item(
    list: String,
    fields: Record,
    select: String,
    app_state: State<'_, AppState>,
) -> Result<Record, String> {
    app_state
        .service
        .add_item(&list, fields, &select)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_item(
    list: String,
    id: i64,
    fields: Record,
    select: String,
    app_state: State<'_, AppState>,
) -> Result<Record, String> {
    app_state
        .service
        .update_item(&list, id, fields, &select)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_item(
    list: String,
    id: i64,
    app_state: State<'_, AppState>,
) -> Result<bool, String> {
    app_state
        .service
        .delete_item(&list, id)
        .await
        .map_err(|e| e.to_string())
}
