//! spdesk Desktop Application
//!
//! Desktop shell exposing the remote list/attachment service to the UI.

use tauri::Manager;
use tracing::info;

mod commands;
mod state;

use state::AppState;

/// Get the app local data directory used for logs.
///
/// Local (not Roaming): log files are machine-specific and should not roam
/// in enterprise environments.
fn get_app_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("spdesk")
}

/// Get the logs directory path (under app data directory)
fn get_logs_dir() -> std::path::PathBuf {
    get_app_data_dir().join("logs")
}

/// Initialize tracing for the application with console and file logging
///
/// - Console: colored, compact format
/// - File: daily rotation under the app data directory
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    let logs_dir = get_logs_dir();
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
    }

    // File appender with daily rotation, e.g. spdesk.2026-08-29.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("spdesk")
        .filename_suffix("log")
        .build(&logs_dir)
        .expect("Failed to create log file appender");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence, with sensible defaults for our crates
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("spdesk_core=debug".parse().unwrap())
            .add_directive("spdesk_lib=debug".parse().unwrap())
            .add_directive("tauri=info".parse().unwrap())
            .add_directive("tao=warn".parse().unwrap())
            .add_directive("wry=warn".parse().unwrap())
    });

    // Console layer: colored, compact
    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    // File layer: no colors, include more detail
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    // Return guard - must be kept alive for the duration of the program
    guard
}

/// Get app version
#[tauri::command]
fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the path to the logs directory
#[tauri::command]
fn get_logs_path() -> String {
    get_logs_dir().to_string_lossy().to_string()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Keep the guard alive for the entire program - dropping it stops file logging
    let _log_guard = init_tracing();

    info!("Starting spdesk Desktop v{}", env!("CARGO_PKG_VERSION"));
    info!("Logs directory: {}", get_logs_dir().display());

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            info!("Initializing application state...");
            app.manage(AppState::new());
            info!("Application started successfully");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_version,
            get_logs_path,
            // Configuration and lifecycle commands
            commands::ping,
            commands::set_config,
            commands::get_config,
            commands::open_config_dialog,
            commands::cancel_current,
            commands::pretty_json,
            // Item commands
            commands::list_items,
            commands::get_item,
            commands::add_item,
            commands::update_item,
            commands::delete_item,
            // Attachment commands
            commands::list_attachments,
            commands::add_attachment,
            commands::download_attachment,
            commands::delete_attachment,
            commands::download_by_url,
            // Streamed save commands
            commands::save_attachment_pick,
            commands::save_by_url_pick,
            commands::save_bytes_pick,
        ])
        .build(tauri::generate_context!())
        .expect("error while building spdesk application")
        .run(|app_handle, event| {
            if let tauri::RunEvent::Exit = event {
                // Cancel any in-flight remote operation; safe and idempotent.
                let state: tauri::State<'_, AppState> = app_handle.state();
                if state.service.cancel_current() {
                    info!("Shutdown: cancelled in-flight operation");
                } else {
                    info!("Shutdown: no operation in flight");
                }
            }
        });
}
