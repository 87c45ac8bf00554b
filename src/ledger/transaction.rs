use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a recorded transaction. The sign of the balance effect is implied
/// by the kind; `amount` is always stored positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Cost,
}

/// Which side of a transfer pair a leg sits on. The outgoing leg debits its
/// fund; the incoming leg credits its fund.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Outgoing,
    Incoming,
}

/// An immutable record of a balance-affecting event. Records are only ever
/// appended and deleted; amount and kind never change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    /// The fund this record's balance effect applies to. `None` only for
    /// unassigned costs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_id: Option<Uuid>,
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The paired fund on transfer legs and on the debt record of a partial
    /// transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TransferDirection>,
    /// Id of the paired transaction on the opposite leg of a transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<Uuid>,
}

impl Transaction {
    fn record(
        fund_id: Option<Uuid>,
        amount: f64,
        kind: TransactionKind,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fund_id,
            amount,
            kind,
            date,
            note: note.into(),
            category: None,
            transfer_to: None,
            direction: None,
            counterpart: None,
        }
    }

    pub fn deposit(
        fund_id: Uuid,
        amount: f64,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self::record(Some(fund_id), amount, TransactionKind::Deposit, date, note)
    }

    pub fn withdrawal(
        fund_id: Uuid,
        amount: f64,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self::record(
            Some(fund_id),
            amount,
            TransactionKind::Withdrawal,
            date,
            note,
        )
    }

    pub fn cost(
        fund_id: Option<Uuid>,
        amount: f64,
        category: impl Into<String>,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        let mut tx = Self::record(fund_id, amount, TransactionKind::Cost, date, note);
        tx.category = Some(category.into());
        tx
    }

    /// One side of a transfer pair. The counterpart id is linked after both
    /// legs exist.
    pub fn transfer_leg(
        fund_id: Uuid,
        other_fund: Uuid,
        direction: TransferDirection,
        amount: f64,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        let mut tx = Self::record(Some(fund_id), amount, TransactionKind::Transfer, date, note);
        tx.transfer_to = Some(other_fund);
        tx.direction = Some(direction);
        tx
    }

    pub fn with_transfer_to(mut self, fund_id: Uuid) -> Self {
        self.transfer_to = Some(fund_id);
        self
    }

    /// Whether this record touches the given fund, either as its owner or as
    /// the far side of a transfer.
    pub fn touches_fund(&self, fund_id: Uuid) -> bool {
        self.fund_id == Some(fund_id) || self.transfer_to == Some(fund_id)
    }

    pub fn is_spending(&self) -> bool {
        matches!(
            self.kind,
            TransactionKind::Withdrawal | TransactionKind::Cost
        )
    }
}
