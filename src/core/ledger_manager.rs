use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{FundUpdate, Ledger, TransferOutcome};
use crate::storage::StorageBackend;

/// Facade that owns the ledger state and coordinates persistence.
///
/// The manager is the single mutation entry point for callers: every
/// operation is forwarded to the ledger and the result persisted
/// best-effort. A failed save is logged and never rolls back or corrupts the
/// in-memory state; a missing or unreadable snapshot opens as an empty
/// ledger.
pub struct LedgerManager {
    ledger: Ledger,
    name: String,
    storage: Box<dyn StorageBackend>,
}

impl LedgerManager {
    /// Opens the named ledger, falling back to an empty one when nothing
    /// usable is persisted.
    pub fn open(storage: Box<dyn StorageBackend>, name: &str) -> Self {
        let ledger = if storage.ledger_path(name).exists() {
            match storage.load(name) {
                Ok(ledger) => ledger,
                Err(err) => {
                    tracing::warn!(
                        name,
                        error = %err,
                        "discarding unusable persisted ledger; starting empty"
                    );
                    Ledger::new()
                }
            }
        } else {
            tracing::debug!(name, "no persisted ledger; starting empty");
            Ledger::new()
        };
        Self {
            ledger,
            name: name.to_string(),
            storage,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit save with the error surfaced to the caller.
    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.ledger, &self.name)
    }

    pub fn backup(&self, note: Option<&str>) -> Result<std::path::PathBuf> {
        self.storage.backup(&self.ledger, &self.name, note)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        self.storage.list_backups(&self.name)
    }

    /// Replaces the in-memory state with a restored backup and persists it.
    pub fn restore(&mut self, backup_name: &str) -> Result<()> {
        self.ledger = self.storage.restore(&self.name, backup_name)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.ledger, &self.name) {
            tracing::warn!(
                name = %self.name,
                error = %err,
                "failed to persist ledger; continuing in memory"
            );
        }
    }

    // ---- Mutating operations, persisted best-effort ----

    pub fn create_fund(
        &mut self,
        name: impl Into<String>,
        initial_balance: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Uuid {
        let id = self
            .ledger
            .create_fund(name, initial_balance, description, category);
        self.persist();
        id
    }

    pub fn update_fund(&mut self, id: Uuid, update: FundUpdate) {
        self.ledger.update_fund(id, update);
        self.persist();
    }

    pub fn delete_fund(&mut self, id: Uuid) {
        self.ledger.delete_fund(id);
        self.persist();
    }

    pub fn set_active_fund(&mut self, id: Uuid) {
        self.ledger.set_active_fund(id);
        self.persist();
    }

    pub fn deposit(
        &mut self,
        amount: f64,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        let tx = self.ledger.deposit(amount, note, fund_id);
        if tx.is_some() {
            self.persist();
        }
        tx
    }

    pub fn withdraw(
        &mut self,
        amount: f64,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        let tx = self.ledger.withdraw(amount, note, fund_id);
        if tx.is_some() {
            self.persist();
        }
        tx
    }

    pub fn transfer(
        &mut self,
        amount: f64,
        to_fund_id: Uuid,
        note: impl Into<String>,
        from_fund_id: Option<Uuid>,
    ) -> Option<TransferOutcome> {
        let outcome = self.ledger.transfer(amount, to_fund_id, note, from_fund_id);
        if outcome.is_some() {
            self.persist();
        }
        outcome
    }

    pub fn add_cost(
        &mut self,
        amount: f64,
        category: impl Into<String>,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        let tx = self.ledger.add_cost(amount, category, note, fund_id);
        if tx.is_some() {
            self.persist();
        }
        tx
    }

    pub fn delete_transaction(&mut self, id: Uuid) {
        self.ledger.delete_transaction(id);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.ledger.clear();
        self.persist();
    }
}
