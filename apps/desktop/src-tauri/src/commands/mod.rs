//! Tauri IPC Commands
//!
//! This module contains all commands that can be invoked from the frontend.
//! Commands are organized by feature area.

pub mod attachments;
pub mod config;
pub mod items;
pub mod transfer;

// Re-export commands for convenience
pub use attachments::*;
pub use config::*;
pub use items::*;
pub use transfer::*;
