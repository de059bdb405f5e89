//! Test Database Manager
//!
//! Provides isolated engine instances for testing: each test gets its own
//! temporary SQLite database that disappears when the environment drops.

use std::path::PathBuf;
use std::sync::Arc;

use grind_core::{PracticeStore, Scheduler};
use tempfile::TempDir;

/// An isolated engine over a throwaway database
///
/// # Example
///
/// ```rust,ignore
/// let env = TestEnv::new();
/// let plan = env.scheduler.create_initial_plan(&item)?;
/// // Database is deleted when `env` goes out of scope
/// ```
pub struct TestEnv {
    /// Engine under test
    pub scheduler: Scheduler,
    /// Shared store handle for direct reads
    pub store: Arc<PracticeStore>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: TempDir,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestEnv {
    /// Fresh engine over an empty temporary database
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("grind-e2e.db");
        let store =
            Arc::new(PracticeStore::new(Some(db_path.clone())).expect("open test store"));
        let scheduler = Scheduler::new(store.clone());
        Self {
            scheduler,
            store,
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Reopen the same database file, as a restarted process would
    pub fn reopen(&self) -> (Arc<PracticeStore>, Scheduler) {
        let store =
            Arc::new(PracticeStore::new(Some(self.db_path.clone())).expect("reopen test store"));
        let scheduler = Scheduler::new(store.clone());
        (store, scheduler)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
