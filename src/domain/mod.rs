pub mod account;
pub mod error;
pub mod history;
pub mod money;
pub mod person;
pub mod traits;
pub mod transaction;

pub use account::{AccountKind, AccountRecord, SavingTerms};
pub use error::{Error, Result};
pub use history::TransactionHistory;
pub use money::Amount;
pub use person::Person;
pub use traits::{BalanceSource, Operations};
pub use transaction::{Transaction, TransactionKind};
