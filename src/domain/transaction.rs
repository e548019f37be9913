use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Debit,
    Credit,
    InterestCredit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub resulting_balance: Amount, // balance right after this transaction applied
}

impl core::fmt::Display for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{},{:?},amount={},balance={}",
            self.timestamp.to_rfc3339(),
            self.kind,
            self.amount,
            self.resulting_balance
        )
    }
}
