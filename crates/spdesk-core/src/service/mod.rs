//! Session, operation and transfer lifecycle services.

pub mod content;
pub mod operations;
pub mod session;
pub mod transfer;
pub mod transport;

pub use content::ContentService;
pub use operations::{OperationContext, OperationGuard, OperationRegistry};
pub use session::{ClientFactory, Session, SessionManager};
pub use transport::{spawn_janitor, Transport, TransportTuning};
