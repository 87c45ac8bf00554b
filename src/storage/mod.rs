pub mod json_backend;

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::ledger::Ledger;

/// Abstraction over persistence backends capable of storing ledger snapshots.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Ledger>;
    fn ledger_path(&self, name: &str) -> PathBuf;
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<PathBuf>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// go straight to the JSON codec.
    fn save_to_path(&self, ledger: &Ledger, path: &Path) -> Result<()> {
        json_backend::save_ledger_to_path(ledger, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Ledger> {
        json_backend::load_ledger_from_path(path)
    }
}

pub use json_backend::JsonStorage;
