//! SentiGuard Notify
//!
//! Parent alerting: single toxic-comment alerts and batched summaries,
//! delivered through a pluggable mailer. Delivery is best-effort; failures
//! are logged and surfaced as boolean outcomes, never as errors that could
//! block ingestion.

pub mod alerts;
pub mod dispatcher;
pub mod mailer;

pub use alerts::{summary_alert, toxic_comment_alert, ToxicFinding};
pub use dispatcher::NotificationDispatcher;
pub use mailer::{HttpMailer, LogMailer, Mailer, OutboundEmail};
