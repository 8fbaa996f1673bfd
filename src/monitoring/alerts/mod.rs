//! Alert management system
//!
//! Alerts are kept in a bounded in-process history and delivered to the
//! console plus any configured webhook or email relay.

mod channels;
mod manager;
mod tests;
mod types;

pub use channels::{ConsoleChannel, EmailChannel, NotificationChannel, WebhookChannel};
pub use manager::AlertManager;
pub use types::{Alert, AlertStats, AlertType};
