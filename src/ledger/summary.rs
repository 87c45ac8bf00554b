//! Pure reporting functions over transaction lists.
//!
//! Everything here is deterministic and side-effect free: callers pass a
//! snapshot of transactions (already narrowed to a fund or range if they
//! wish) and get summaries back. Transfers move money inside the ledger, so
//! they never count as funds received or spent.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::{Transaction, TransactionKind};

/// Totals over a list of transactions: deposits received, amounts spent, and
/// what that leaves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FundSummary {
    pub total_funds: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub percentage_spent: f64,
}

/// A [`FundSummary`] scoped to one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub summary: FundSummary,
}

/// Cost-only totals for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyCostSummary {
    pub year: i32,
    pub month: u32,
    pub total_cost: f64,
    pub cost_by_category: BTreeMap<String, f64>,
    pub average_cost: f64,
}

const UNCATEGORIZED: &str = "Uncategorized";

/// Sums deposits against spending. `percentage_spent` is zero when nothing
/// was received, never a division by zero.
pub fn fund_summary(transactions: &[Transaction]) -> FundSummary {
    let mut summary = FundSummary::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Deposit => summary.total_funds += tx.amount,
            TransactionKind::Withdrawal | TransactionKind::Cost => {
                summary.total_spent += tx.amount;
            }
            TransactionKind::Transfer => {}
        }
    }
    summary.remaining = summary.total_funds - summary.total_spent;
    summary.percentage_spent = if summary.total_funds > 0.0 {
        summary.total_spent / summary.total_funds * 100.0
    } else {
        0.0
    };
    summary
}

/// Buckets transactions by calendar month and summarizes each bucket, newest
/// first. Every transaction lands in exactly one bucket.
pub fn monthly_summary(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<(i32, u32), Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        buckets
            .entry((tx.date.year(), tx.date.month()))
            .or_default()
            .push(tx);
    }
    buckets
        .into_iter()
        .rev()
        .map(|((year, month), bucket)| {
            let owned: Vec<Transaction> = bucket.into_iter().cloned().collect();
            MonthlySummary {
                year,
                month,
                summary: fund_summary(&owned),
            }
        })
        .collect()
}

/// Transactions whose date falls within the inclusive range.
pub fn filter_by_range(
    transactions: &[Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.date >= start && tx.date <= end)
        .cloned()
        .collect()
}

/// Summary over the inclusive date range.
pub fn summary_in_range(
    transactions: &[Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> FundSummary {
    fund_summary(&filter_by_range(transactions, start, end))
}

/// Spending totals (costs and withdrawals) grouped by category; records
/// without a category land in "Uncategorized".
pub fn totals_by_category(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_spending()) {
        let category = tx
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *totals.entry(category).or_insert(0.0) += tx.amount;
    }
    totals
}

/// Monthly cost breakdown, newest first: total, per-category split, and the
/// average cost record for the month. Only cost records count here.
pub fn monthly_cost_summary(transactions: &[Transaction]) -> Vec<MonthlyCostSummary> {
    let mut buckets: BTreeMap<(i32, u32), Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Cost)
    {
        buckets
            .entry((tx.date.year(), tx.date.month()))
            .or_default()
            .push(tx);
    }
    buckets
        .into_iter()
        .rev()
        .map(|((year, month), bucket)| {
            let total_cost: f64 = bucket.iter().map(|tx| tx.amount).sum();
            let mut cost_by_category = BTreeMap::new();
            for tx in &bucket {
                let category = tx
                    .category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string());
                *cost_by_category.entry(category).or_insert(0.0) += tx.amount;
            }
            MonthlyCostSummary {
                year,
                month,
                total_cost,
                cost_by_category,
                average_cost: total_cost / bucket.len() as f64,
            }
        })
        .collect()
}
