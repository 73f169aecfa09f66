//! SentiGuard Core
//!
//! Shared types and error handling for the SentiGuard monitoring pipeline.
//!
//! This crate provides:
//! - Domain types for parents, monitored accounts, linked children, and comments
//! - The classification `Label` vocabulary
//! - Error types and result handling shared by every component
//! - Structured ingestion report types

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Comment, CredentialStatus, IngestError, IngestReport, Label, LinkedChild, MonitoredAccount,
    Parent,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Comment, CredentialStatus, IngestError, IngestReport, Label, LinkedChild,
        MonitoredAccount, Parent,
    };
}
