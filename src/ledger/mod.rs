//! Ledger domain models, operations, and reporting helpers.

pub mod fund;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod summary;
pub mod transaction;

pub use fund::{Fund, FundUpdate};
pub use ledger::{Ledger, TransferOutcome, CURRENT_SCHEMA_VERSION};
pub use summary::{
    filter_by_range, fund_summary, monthly_cost_summary, monthly_summary, summary_in_range,
    totals_by_category, FundSummary, MonthlyCostSummary, MonthlySummary,
};
pub use transaction::{Transaction, TransactionKind, TransferDirection};
