use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fund::{Fund, FundUpdate};
use super::transaction::{Transaction, TransactionKind, TransferDirection};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Outcome of a transfer. A transfer either completes in full or, when the
/// source cannot cover the requested amount, moves what it can and records
/// the shortfall as debt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferOutcome {
    Completed {
        from_tx: Uuid,
        to_tx: Uuid,
    },
    Partial {
        from_tx: Uuid,
        to_tx: Uuid,
        debt_tx: Uuid,
        debt: f64,
    },
}

/// The whole ledger state: funds, the transaction log, the active fund, and
/// the incrementally-maintained global counters.
///
/// The ledger is the sole mutator of its contents. Global counters are
/// running totals updated transaction-by-transaction; they are deliberately
/// not recomputed from fund balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub funds: BTreeMap<Uuid, Fund>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub active_fund_id: Option<Uuid>,
    #[serde(default)]
    pub global_balance: f64,
    #[serde(default)]
    pub global_cost: f64,
    #[serde(default)]
    pub debt_balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            funds: BTreeMap::new(),
            transactions: Vec::new(),
            active_fund_id: None,
            global_balance: 0.0,
            global_cost: 0.0,
            debt_balance: 0.0,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Resolves the fund an operation targets: the explicit id when given,
    /// else the active fund. A stale or unknown id resolves to nothing.
    fn resolve_fund(&self, explicit: Option<Uuid>) -> Option<Uuid> {
        explicit
            .or(self.active_fund_id)
            .filter(|id| self.funds.contains_key(id))
    }

    // ---- Fund management ----

    /// Creates a fund. The first fund created becomes the active fund. A
    /// positive initial balance is recorded as a synthetic deposit and counts
    /// toward the global balance.
    pub fn create_fund(
        &mut self,
        name: impl Into<String>,
        initial_balance: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Uuid {
        let now = Utc::now();
        let fund = Fund::new(name, initial_balance, description, category, now);
        let fund_id = fund.id;
        self.funds.insert(fund_id, fund);
        if self.active_fund_id.is_none() {
            self.active_fund_id = Some(fund_id);
        }
        if initial_balance > 0.0 {
            self.transactions.push(Transaction::deposit(
                fund_id,
                initial_balance,
                now,
                "Initial balance",
            ));
            self.global_balance += initial_balance;
        }
        self.touch();
        tracing::debug!(%fund_id, initial_balance, "created fund");
        fund_id
    }

    /// Applies the allowed field updates. Unknown ids are a silent no-op.
    pub fn update_fund(&mut self, id: Uuid, update: FundUpdate) {
        let Some(fund) = self.funds.get_mut(&id) else {
            return;
        };
        if let Some(name) = update.name {
            fund.name = name;
        }
        if let Some(description) = update.description {
            fund.description = description;
        }
        if let Some(category) = update.category {
            fund.category = category;
        }
        if let Some(is_active) = update.is_active {
            fund.is_active = is_active;
        }
        self.touch();
    }

    /// Removes a fund and every transaction that references it, including
    /// transfer legs pointing at it from other funds. Global counters keep
    /// the deleted fund's historical contribution.
    pub fn delete_fund(&mut self, id: Uuid) {
        if self.funds.remove(&id).is_none() {
            return;
        }
        self.transactions.retain(|tx| !tx.touches_fund(id));
        if self.active_fund_id == Some(id) {
            self.active_fund_id = self.funds.keys().next().copied();
        }
        self.touch();
        tracing::debug!(fund_id = %id, "deleted fund and its transactions");
    }

    /// Records intent only; the id is not validated. Operations defaulting to
    /// a stale active fund will no-op.
    pub fn set_active_fund(&mut self, id: Uuid) {
        self.active_fund_id = Some(id);
        self.touch();
    }

    // ---- Deposit / withdraw ----

    /// Adds money to the target fund. Returns the transaction id, or `None`
    /// without touching state when the amount is not positive or no fund
    /// resolves.
    pub fn deposit(
        &mut self,
        amount: f64,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        if amount <= 0.0 {
            return None;
        }
        let target = self.resolve_fund(fund_id)?;
        let tx = Transaction::deposit(target, amount, Utc::now(), note);
        let tx_id = tx.id;
        if let Some(fund) = self.funds.get_mut(&target) {
            fund.balance += amount;
        }
        self.global_balance += amount;
        self.transactions.push(tx);
        self.touch();
        tracing::debug!(fund_id = %target, amount, "recorded deposit");
        Some(tx_id)
    }

    /// Takes money out of the target fund, only if the full amount is
    /// available. No partial withdrawal, no debt.
    pub fn withdraw(
        &mut self,
        amount: f64,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        if amount <= 0.0 {
            return None;
        }
        let target = self.resolve_fund(fund_id)?;
        if amount > self.funds[&target].balance {
            return None;
        }
        let tx = Transaction::withdrawal(target, amount, Utc::now(), note);
        let tx_id = tx.id;
        if let Some(fund) = self.funds.get_mut(&target) {
            fund.balance -= amount;
        }
        self.global_balance = (self.global_balance - amount).max(0.0);
        self.global_cost += amount;
        self.transactions.push(tx);
        self.touch();
        tracing::debug!(fund_id = %target, amount, "recorded withdrawal");
        Some(tx_id)
    }

    // ---- Transfer ----

    /// Moves money between two funds.
    ///
    /// With sufficient balance this records a pair of cross-linked transfer
    /// legs and leaves the global counters alone (money stays in the ledger).
    /// With insufficient balance the transfer partially succeeds: everything
    /// the source holds moves, and the uncovered remainder is tracked in
    /// `debt_balance` with an explicit debt record.
    pub fn transfer(
        &mut self,
        amount: f64,
        to_fund_id: Uuid,
        note: impl Into<String>,
        from_fund_id: Option<Uuid>,
    ) -> Option<TransferOutcome> {
        if amount <= 0.0 {
            return None;
        }
        let source = self.resolve_fund(from_fund_id)?;
        if source == to_fund_id || !self.funds.contains_key(&to_fund_id) {
            return None;
        }

        let note = note.into();
        let source_name = self.funds[&source].name.clone();
        let dest_name = self.funds[&to_fund_id].name.clone();
        let source_balance = self.funds[&source].balance;
        let now = Utc::now();

        if amount <= source_balance {
            let out_note = if note.is_empty() {
                format!("Transfer to {}", dest_name)
            } else {
                note.clone()
            };
            let in_note = if note.is_empty() {
                format!("Transfer from {}", source_name)
            } else {
                note
            };
            let mut out_leg = Transaction::transfer_leg(
                source,
                to_fund_id,
                TransferDirection::Outgoing,
                amount,
                now,
                out_note,
            );
            let mut in_leg = Transaction::transfer_leg(
                to_fund_id,
                source,
                TransferDirection::Incoming,
                amount,
                now,
                in_note,
            );
            out_leg.counterpart = Some(in_leg.id);
            in_leg.counterpart = Some(out_leg.id);
            let outcome = TransferOutcome::Completed {
                from_tx: out_leg.id,
                to_tx: in_leg.id,
            };

            if let Some(fund) = self.funds.get_mut(&source) {
                fund.balance -= amount;
            }
            if let Some(fund) = self.funds.get_mut(&to_fund_id) {
                fund.balance += amount;
            }
            self.transactions.push(out_leg);
            self.transactions.push(in_leg);
            self.touch();
            tracing::debug!(from = %source, to = %to_fund_id, amount, "recorded transfer");
            Some(outcome)
        } else {
            let transferable = source_balance;
            let debt = amount - transferable;

            let out_tx = Transaction::withdrawal(
                source,
                transferable,
                now,
                format!(
                    "Partial transfer to {} (insufficient funds, {:.2} debt created)",
                    dest_name, debt
                ),
            );
            let in_tx = Transaction::deposit(
                to_fund_id,
                transferable,
                now,
                format!("Partial transfer from {}", source_name),
            );
            let debt_tx = Transaction::withdrawal(
                source,
                debt,
                now,
                format!("Debt created for transfer to {}", dest_name),
            )
            .with_transfer_to(to_fund_id);
            let outcome = TransferOutcome::Partial {
                from_tx: out_tx.id,
                to_tx: in_tx.id,
                debt_tx: debt_tx.id,
                debt,
            };

            if let Some(fund) = self.funds.get_mut(&source) {
                fund.balance = 0.0;
            }
            if let Some(fund) = self.funds.get_mut(&to_fund_id) {
                fund.balance += transferable;
            }
            self.debt_balance += debt;
            self.transactions.push(out_tx);
            self.transactions.push(in_tx);
            self.transactions.push(debt_tx);
            self.touch();
            tracing::warn!(
                from = %source,
                to = %to_fund_id,
                amount,
                debt,
                "partial transfer created debt"
            );
            Some(outcome)
        }
    }

    // ---- Cost recording ----

    /// Records an expense. The cost lands on the explicit fund, else the
    /// active fund, else stays unassigned. No sufficiency check: the fund and
    /// global balances each floor at zero independently.
    pub fn add_cost(
        &mut self,
        amount: f64,
        category: impl Into<String>,
        note: impl Into<String>,
        fund_id: Option<Uuid>,
    ) -> Option<Uuid> {
        if amount <= 0.0 {
            return None;
        }
        let target = fund_id
            .or(self.active_fund_id)
            .filter(|id| self.funds.contains_key(id));
        let tx = Transaction::cost(target, amount, category, Utc::now(), note);
        let tx_id = tx.id;
        self.transactions.push(tx);
        self.global_balance = (self.global_balance - amount).max(0.0);
        self.global_cost += amount;
        if let Some(id) = target {
            if let Some(fund) = self.funds.get_mut(&id) {
                fund.balance = (fund.balance - amount).max(0.0);
            }
        }
        self.touch();
        tracing::debug!(fund_id = ?target, amount, "recorded cost");
        Some(tx_id)
    }

    // ---- Transaction deletion ----

    /// Reverses and removes a transaction. Unknown ids are a no-op. Transfer
    /// legs are removed pairwise: the outgoing fund regains the amount and
    /// the incoming fund gives it back. Debt balances are never reduced.
    pub fn delete_transaction(&mut self, id: Uuid) {
        let Some(tx) = self.transactions.iter().find(|t| t.id == id).cloned() else {
            return;
        };

        match tx.kind {
            TransactionKind::Deposit => {
                self.global_balance = (self.global_balance - tx.amount).max(0.0);
                if let Some(fund) = tx.fund_id.and_then(|fid| self.funds.get_mut(&fid)) {
                    fund.balance = (fund.balance - tx.amount).max(0.0);
                }
                self.transactions.retain(|t| t.id != id);
            }
            TransactionKind::Withdrawal | TransactionKind::Cost => {
                self.global_balance += tx.amount;
                self.global_cost = (self.global_cost - tx.amount).max(0.0);
                if let Some(fund) = tx.fund_id.and_then(|fid| self.funds.get_mut(&fid)) {
                    fund.balance += tx.amount;
                }
                self.transactions.retain(|t| t.id != id);
            }
            TransactionKind::Transfer => self.delete_transfer_pair(tx),
        }
        self.touch();
    }

    fn delete_transfer_pair(&mut self, leg: Transaction) {
        let counterpart = leg
            .counterpart
            .and_then(|cid| self.transactions.iter().find(|t| t.id == cid).cloned());

        let Some(other) = counterpart else {
            tracing::warn!(
                tx_id = %leg.id,
                "transfer leg has no counterpart; removing single record"
            );
            self.transactions.retain(|t| t.id != leg.id);
            return;
        };

        let (out_leg, in_leg) = match leg.direction {
            Some(TransferDirection::Incoming) => (&other, &leg),
            _ => (&leg, &other),
        };
        if let Some(fund) = out_leg.fund_id.and_then(|fid| self.funds.get_mut(&fid)) {
            fund.balance += out_leg.amount;
        }
        if let Some(fund) = in_leg.fund_id.and_then(|fid| self.funds.get_mut(&fid)) {
            fund.balance = (fund.balance - in_leg.amount).max(0.0);
        }
        let other_id = other.id;
        self.transactions
            .retain(|t| t.id != leg.id && t.id != other_id);
    }

    /// Resets the ledger to its empty initial state.
    pub fn clear(&mut self) {
        self.funds.clear();
        self.transactions.clear();
        self.active_fund_id = None;
        self.global_balance = 0.0;
        self.global_cost = 0.0;
        self.debt_balance = 0.0;
        self.touch();
    }

    // ---- Queries (copy-out snapshots) ----

    pub fn fund(&self, id: Uuid) -> Option<&Fund> {
        self.funds.get(&id)
    }

    pub fn active_fund(&self) -> Option<&Fund> {
        self.active_fund_id.and_then(|id| self.funds.get(&id))
    }

    /// Balance of the given fund, defaulting to the active fund; zero when
    /// nothing resolves.
    pub fn fund_balance(&self, fund_id: Option<Uuid>) -> f64 {
        self.resolve_fund(fund_id)
            .and_then(|id| self.funds.get(&id))
            .map_or(0.0, |fund| fund.balance)
    }

    /// Sum of all fund balances. Distinct from `global_balance`, which is a
    /// running total over recorded activity.
    pub fn total_balance(&self) -> f64 {
        self.funds.values().map(|fund| fund.balance).sum()
    }

    /// Every transaction touching the fund, as owner or as the far side of a
    /// transfer.
    pub fn transactions_for_fund(&self, fund_id: Uuid) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.touches_fund(fund_id))
            .cloned()
            .collect()
    }

    /// Transactions within the inclusive date range, optionally narrowed to
    /// one fund.
    pub fn transactions_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        fund_id: Option<Uuid>,
    ) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| fund_id.map_or(true, |id| tx.touches_fund(id)))
            .filter(|tx| tx.date >= start && tx.date <= end)
            .cloned()
            .collect()
    }

    /// Spending records (costs and withdrawals) carrying the given category.
    pub fn transactions_by_category(&self, category: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.is_spending() && tx.category.as_deref() == Some(category))
            .cloned()
            .collect()
    }

    pub fn cost_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Cost)
            .cloned()
            .collect()
    }

    pub fn funds_by_category(&self, category: &str) -> Vec<Fund> {
        self.funds
            .values()
            .filter(|fund| fund.category == category)
            .cloned()
            .collect()
    }

    /// Spending totals grouped by category; records without a category land
    /// in "Uncategorized".
    pub fn costs_by_category(&self) -> BTreeMap<String, f64> {
        super::summary::totals_by_category(&self.transactions)
    }
}
