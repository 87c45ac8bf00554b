use std::path::PathBuf;
use std::sync::Mutex;

use fund_core::core::LedgerManager;
use fund_core::storage::{JsonStorage, StorageBackend};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the
/// test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Reserves an isolated base directory for one test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage_in(base: &PathBuf) -> Box<dyn StorageBackend> {
    Box::new(JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage backend"))
}

/// Creates a manager backed by a unique directory.
pub fn setup_manager(name: &str) -> (LedgerManager, PathBuf) {
    let base = temp_base();
    let manager = LedgerManager::open(storage_in(&base), name);
    (manager, base)
}
