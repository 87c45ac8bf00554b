use thiserror::Error;

/// Error type that captures ledger persistence and configuration failures.
///
/// Business-rule violations (bad amounts, unresolved funds, insufficient
/// balance) are never errors; operations signal them with sentinel returns.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("ledger schema v{found} is newer than supported v{current}")]
    UnsupportedSchema { found: u8, current: u8 },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
