//! SentiGuard Store
//!
//! Deduplicated persistence for the monitoring pipeline: the shared
//! monitored-account pool, parent accounts, linked children, and per-child
//! comment histories. Backed by an in-memory index with an optional
//! append-only JSON-lines journal replayed at startup.

pub mod journal;
pub mod memory;
pub mod store;

pub use journal::{Journal, JournalEvent};
pub use memory::MemoryStore;
pub use store::Store;
