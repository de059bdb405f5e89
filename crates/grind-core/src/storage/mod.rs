//! Storage Module
//!
//! SQLite-based record store with:
//! - Embedded versioned migrations
//! - Atomic write batches (one transaction per engine operation)
//! - Typed fetch methods over items and review plans

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{PracticeStore, Result, StoreError, WriteBatch, WriteOp, WriterView};
