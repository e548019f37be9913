use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{Amount, Error, Person};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub(crate) number: String,
    pub(crate) owner: Person,
    pub(crate) opened_at: DateTime<Utc>,
    pub(crate) balance: Amount,
    pub(crate) kind: AccountKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    Plain,
    Saving(SavingTerms),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingTerms {
    pub(crate) daily_interest_rate: Decimal,
    pub(crate) debit_lock: Duration,
    pub(crate) last_debit_at: Option<DateTime<Utc>>,
    pub(crate) last_interest_credit_at: DateTime<Utc>,
    // interest below the smallest unit, owed but not yet credited
    pub(crate) unpaid_interest: Decimal,
}

impl AccountRecord {
    pub fn plain(number: String, owner: Person, opened_at: DateTime<Utc>, balance: Amount) -> Self {
        Self {
            number,
            owner,
            opened_at,
            balance,
            kind: AccountKind::Plain,
        }
    }

    pub fn saving(
        number: String,
        owner: Person,
        opened_at: DateTime<Utc>,
        balance: Amount,
        daily_interest_rate: Decimal,
        debit_lock: Duration,
    ) -> Self {
        Self {
            number,
            owner,
            opened_at,
            balance,
            kind: AccountKind::Saving(SavingTerms::new(
                daily_interest_rate,
                debit_lock,
                opened_at,
            )),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn owner(&self) -> &Person {
        &self.owner
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.kind, AccountKind::Saving(_))
    }

    pub fn saving_terms(&self) -> Option<&SavingTerms> {
        match &self.kind {
            AccountKind::Saving(terms) => Some(terms),
            AccountKind::Plain => None,
        }
    }
}

impl AccountKind {
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Plain => "plain",
            AccountKind::Saving(_) => "saving",
        }
    }
}

impl SavingTerms {
    pub fn new(daily_interest_rate: Decimal, debit_lock: Duration, opened_at: DateTime<Utc>) -> Self {
        Self {
            daily_interest_rate,
            debit_lock,
            last_debit_at: None,
            last_interest_credit_at: opened_at,
            unpaid_interest: Decimal::ZERO,
        }
    }

    pub fn daily_interest_rate(&self) -> Decimal {
        self.daily_interest_rate
    }

    pub fn debit_lock(&self) -> Duration {
        self.debit_lock
    }

    pub fn last_debit_at(&self) -> Option<DateTime<Utc>> {
        self.last_debit_at
    }

    pub fn last_interest_credit_at(&self) -> DateTime<Utc> {
        self.last_interest_credit_at
    }

    pub fn unpaid_interest(&self) -> Decimal {
        self.unpaid_interest
    }

    /// Unpaid remainder plus interest accrued since the last credit, counted
    /// in fractional days of whole seconds.
    pub fn interest_owed(&self, balance: Amount, now: DateTime<Utc>) -> Decimal {
        let elapsed = (now - self.last_interest_credit_at).num_seconds();
        if elapsed <= 0 {
            return self.unpaid_interest;
        }
        let accrued = balance
            .value()
            .saturating_mul(self.daily_interest_rate)
            .saturating_mul(Decimal::from(elapsed))
            / Decimal::from(SECONDS_PER_DAY);
        self.unpaid_interest.saturating_add(accrued)
    }

    pub fn interest_due(&self, balance: Amount, now: DateTime<Utc>) -> Amount {
        Amount::truncated(self.interest_owed(balance, now))
    }

    // called only once `paid` has been credited
    pub(crate) fn settle_interest(&mut self, now: DateTime<Utc>, owed: Decimal, paid: Amount) {
        self.unpaid_interest = owed - paid.value();
        if now > self.last_interest_credit_at {
            self.last_interest_credit_at = now;
        }
    }

    pub fn check_debit_allowed(&self, now: DateTime<Utc>) -> Result<(), Error> {
        let Some(last) = self.last_debit_at else {
            return Ok(());
        };
        if now - last >= self.debit_lock {
            return Ok(());
        }
        let until = last
            .checked_add_signed(self.debit_lock)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Err(Error::LockActive { until })
    }
}

impl core::fmt::Display for AccountRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} ({}) owner={} opened={} balance={}",
            self.number,
            self.kind.label(),
            self.owner,
            self.opened_at.to_rfc3339(),
            self.balance
        )
    }
}
