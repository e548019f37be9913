pub mod balance_source;
pub mod bank;
pub mod config;
pub mod domain;
pub mod operations;
pub mod report;

pub use balance_source::StoredBalances;
pub use bank::Bank;
pub use config::BankConfig;
pub use domain::{
    AccountKind, AccountRecord, Amount, BalanceSource, Error, Operations, Person, Result,
    SavingTerms, Transaction, TransactionHistory, TransactionKind,
};
