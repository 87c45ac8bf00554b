use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{backups_dir_in, ensure_dir, ledgers_dir_in};
use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, CURRENT_SCHEMA_VERSION};

use super::StorageBackend;

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// JSON-file storage: one pretty-printed snapshot per ledger name under
/// `<root>/ledgers/`, timestamped backups under `<root>/backups/<name>/`
/// pruned to a retention count.
#[derive(Clone)]
pub struct JsonStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = root.unwrap_or_else(crate::core::utils::app_data_dir);
        ensure_dir(&base)?;
        let ledgers_dir = ledgers_dir_in(&base);
        let backups_dir = backups_dir_in(&base);
        ensure_dir(&ledgers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            ledgers_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        save_ledger_to_path(ledger, &path)
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        load_ledger_from_path(&path)
    }

    fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.json", canonical_name(name)))
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        Ok(path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.ledger_path(name);
        fs::copy(&backup_path, &target)?;
        load_ledger_from_path(&target)
    }
}

/// Writes the ledger atomically by staging to a temporary file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger snapshot, rejecting snapshots written by a newer schema.
/// Fields introduced since older schemas are serde-defaulted forward.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::UnsupportedSchema {
            found: ledger.schema_version,
            current: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(ledger)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(".json")?;
    let parts: Vec<&str> = stem.split('_').collect();
    // the timestamp is the first adjacent date/time digit pair; the slug may
    // itself contain underscores
    let idx = parts
        .windows(2)
        .position(|pair| is_digits(pair[0], 8) && is_digits(pair[1], 6))?;
    let raw = format!("{}{}", parts[idx], parts[idx + 1]);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut ledger = Ledger::new();
        let cash = ledger.create_fund("Cash", 100.0, "", "General");
        storage.save(&ledger, "household").expect("save ledger");
        let loaded = storage.load("household").expect("load ledger");
        assert_eq!(loaded.funds[&cash].balance, 100.0);
        assert_eq!(loaded.global_balance, 100.0);
        assert_eq!(loaded.transactions.len(), 1);
    }

    #[test]
    fn names_are_slugged_for_file_paths() {
        let (storage, _guard) = storage_with_temp_dir();
        let path = storage.ledger_path("My Wallet!");
        assert!(path.ends_with("my_wallet_.json"));
    }

    #[test]
    fn load_rejects_newer_schema_versions() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut ledger = Ledger::new();
        ledger.schema_version = CURRENT_SCHEMA_VERSION + 5;
        let path = storage.ledger_path("future");
        save_ledger_to_path(&ledger, &path).expect("write future snapshot");

        let err = storage.load("future").expect_err("future schema must fail");
        match err {
            LedgerError::UnsupportedSchema { found, current } => {
                assert_eq!(found, CURRENT_SCHEMA_VERSION + 5);
                assert_eq!(current, CURRENT_SCHEMA_VERSION);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn missing_schema_version_defaults_forward() {
        let (storage, _guard) = storage_with_temp_dir();
        let path = storage.ledger_path("legacy");
        ensure_dir(path.parent().unwrap()).unwrap();
        let now = Utc::now().to_rfc3339();
        let legacy = format!(
            r#"{{"funds": {{}}, "transactions": [], "created_at": "{now}", "updated_at": "{now}"}}"#
        );
        fs::write(&path, legacy).unwrap();

        let loaded = storage.load("legacy").expect("legacy snapshot loads");
        assert_eq!(loaded.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(loaded.global_balance, 0.0);
        assert!(loaded.active_fund_id.is_none());
    }

    #[test]
    fn backups_are_listed_newest_first_and_pruned() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = Ledger::new();
        storage.save(&ledger, "family").expect("save ledger");
        storage
            .backup(&ledger, "family", Some("monthly close"))
            .expect("create backup");
        let backups = storage.list_backups("family").expect("list backups");
        assert!(!backups.is_empty());
        assert!(backups[0].contains("monthly-close"));
        assert!(backups.len() <= 3);
    }

    #[test]
    fn restore_round_trips_through_a_backup() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut ledger = Ledger::new();
        ledger.create_fund("Cash", 40.0, "", "General");
        storage.save(&ledger, "family").unwrap();
        storage.backup(&ledger, "family", None).unwrap();

        ledger.clear();
        storage.save(&ledger, "family").unwrap();

        let backups = storage.list_backups("family").unwrap();
        let restored = storage
            .restore("family", &backups[0])
            .expect("restore backup");
        assert_eq!(restored.funds.len(), 1);
        assert_eq!(restored.global_balance, 40.0);
    }

    #[test]
    fn restoring_a_missing_backup_fails_cleanly() {
        let (storage, _guard) = storage_with_temp_dir();
        let err = storage
            .restore("family", "nope.json")
            .expect_err("missing backup must fail");
        assert!(matches!(err, LedgerError::Persistence(_)));
    }
}
