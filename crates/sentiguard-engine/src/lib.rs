//! SentiGuard Engine
//!
//! Orchestration layer tying the other components together: account
//! linkage against the monitored pool, per-child ingestion runs with
//! dedup and classification, credential health probes, and bulk
//! reclassification after lexicon changes.

pub mod engine;
pub mod linkage;
pub mod locks;

pub use engine::IngestEngine;
pub use linkage::LinkageService;
pub use locks::ChildLocks;
