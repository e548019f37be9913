use std::env;
use std::str::FromStr;

use chrono::Duration;
use rust_decimal::Decimal;

use crate::domain::Error;

pub const DAILY_INTEREST_VAR: &str = "BANK_SAVING_DAILY_INTEREST";
pub const DEBIT_LOCK_SECS_VAR: &str = "BANK_SAVING_DEBIT_LOCK_SECS";

// the daily rate keeps full precision, unlike Amount
#[derive(Debug, Clone, PartialEq)]
pub struct BankConfig {
    pub saving_daily_interest: Decimal,
    pub saving_debit_lock: Duration,
}

impl BankConfig {
    pub fn new(saving_daily_interest: Decimal, saving_debit_lock: Duration) -> Result<Self, Error> {
        if saving_daily_interest.is_sign_negative() && !saving_daily_interest.is_zero() {
            return Err(Error::Config(format!(
                "daily interest must not be negative, got {}",
                saving_daily_interest
            )));
        }
        if saving_debit_lock < Duration::zero() {
            return Err(Error::Config(format!(
                "debit lock must not be negative, got {}",
                saving_debit_lock
            )));
        }
        Ok(Self {
            saving_daily_interest,
            saving_debit_lock,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // missing keys fall back to Default, malformed ones are errors
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut rate = defaults.saving_daily_interest;
        let mut lock = defaults.saving_debit_lock;

        if let Some(raw) = lookup(DAILY_INTEREST_VAR) {
            rate = Decimal::from_str(raw.trim())
                .map_err(|e| Error::Config(format!("{}={}: {}", DAILY_INTEREST_VAR, raw, e)))?;
        }

        if let Some(raw) = lookup(DEBIT_LOCK_SECS_VAR) {
            let secs: i64 = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}={}: {}", DEBIT_LOCK_SECS_VAR, raw, e)))?;
            if secs < 0 {
                return Err(Error::Config(format!(
                    "{} must not be negative, got {}",
                    DEBIT_LOCK_SECS_VAR, secs
                )));
            }
            lock = Duration::try_seconds(secs).ok_or_else(|| {
                Error::Config(format!("{}={} is out of range", DEBIT_LOCK_SECS_VAR, secs))
            })?;
        }

        Self::new(rate, lock)
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            saving_daily_interest: Decimal::ZERO,
            saving_debit_lock: Duration::days(1),
        }
    }
}
