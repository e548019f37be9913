use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccountRecord, Amount, Error};

// mutating calls return the balance after the operation
pub trait Operations {
    fn balance(&self) -> Amount;

    fn debit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error>;

    fn credit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error>;

    fn credit_interest(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        self.credit(now, amount)
    }

    fn interest_due(&self, _now: DateTime<Utc>) -> Amount {
        Amount::ZERO
    }

    fn credit_interest_due(&mut self, _now: DateTime<Utc>) -> Result<Amount, Error> {
        Ok(Amount::ZERO) // returns what was credited
    }
}

#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, account: &AccountRecord) -> Result<Amount, Error>;
}
