use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named account holding a non-negative balance.
///
/// `balance` is derived bookkeeping state: it always equals the net effect of
/// the transactions recorded against the fund and is only ever changed by
/// ledger operations, never set directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fund {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub balance: f64,
}

impl Fund {
    /// Creates a new fund; a negative initial balance is clamped to zero.
    pub fn new(
        name: impl Into<String>,
        initial_balance: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            created_at,
            is_active: true,
            balance: initial_balance.max(0.0),
        }
    }
}

/// Field-level update request for a fund. Balance, id, and creation time are
/// never settable through updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl FundUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_active.is_none()
    }
}
