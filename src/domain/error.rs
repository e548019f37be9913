use chrono::{DateTime, Utc};

use crate::domain::Amount;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Account {0} not found")]
    NotFound(String),

    #[error("Account {0} already exists")]
    DuplicateAccount(String),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Amount, requested: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Debit locked until {until}")]
    LockActive { until: DateTime<Utc> },

    #[error("{} of {attempted} accounts failed", .failures.len())]
    AggregateFailure {
        attempted: usize,
        failures: Vec<(String, Error)>,
    },

    #[error("Balance source failed with: {0}")]
    BalanceSource(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Account numbers of every failed constituent, empty for non-aggregate errors.
    pub fn failed_accounts(&self) -> Vec<&str> {
        match self {
            Error::AggregateFailure { failures, .. } => {
                failures.iter().map(|(number, _)| number.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}
