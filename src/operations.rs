use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    AccountKind, AccountRecord, Amount, Error, Operations, SavingTerms, Transaction,
    TransactionHistory, TransactionKind,
};

pub fn chain_for<'a>(
    account: &'a mut AccountRecord,
    history: &'a mut TransactionHistory,
) -> Box<dyn Operations + 'a> {
    let AccountRecord { balance, kind, .. } = account;
    let tracked = HistoryOperations::new(BaseOperations::new(balance), history);

    match kind {
        AccountKind::Plain => Box::new(tracked),
        AccountKind::Saving(terms) => Box::new(SavingOperations::new(tracked, terms)),
    }
}

fn require_positive(amount: Amount) -> Result<(), Error> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(Error::InvalidAmount(format!("{} is not positive", amount)))
    }
}

#[derive(Debug)]
pub struct BaseOperations<'a> {
    balance: &'a mut Amount,
}

impl<'a> BaseOperations<'a> {
    pub fn new(balance: &'a mut Amount) -> Self {
        Self { balance }
    }
}

impl Operations for BaseOperations<'_> {
    fn balance(&self) -> Amount {
        *self.balance
    }

    fn debit(&mut self, _now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        require_positive(amount)?;

        let remaining = self.balance.checked_sub(amount).ok_or_else(|| {
            debug!(balance = %self.balance, requested = %amount, "debit rejected");
            Error::InsufficientFunds {
                balance: *self.balance,
                requested: amount,
            }
        })?;

        *self.balance = remaining;
        Ok(remaining)
    }

    fn credit(&mut self, _now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        require_positive(amount)?;

        let total = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidAmount(format!("crediting {} overflows", amount)))?;

        *self.balance = total;
        Ok(total)
    }
}

// records successful mutations only
#[derive(Debug)]
pub struct HistoryOperations<'a, O> {
    inner: O,
    history: &'a mut TransactionHistory,
}

impl<'a, O: Operations> HistoryOperations<'a, O> {
    pub fn new(inner: O, history: &'a mut TransactionHistory) -> Self {
        Self { inner, history }
    }

    fn track(
        &mut self,
        now: DateTime<Utc>,
        kind: TransactionKind,
        amount: Amount,
        result: Result<Amount, Error>,
    ) -> Result<Amount, Error> {
        let resulting_balance = result?;
        self.history.record(Transaction {
            timestamp: now,
            kind,
            amount,
            resulting_balance,
        });
        Ok(resulting_balance)
    }
}

impl<O: Operations> Operations for HistoryOperations<'_, O> {
    fn balance(&self) -> Amount {
        self.inner.balance()
    }

    fn debit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        let result = self.inner.debit(now, amount);
        self.track(now, TransactionKind::Debit, amount, result)
    }

    fn credit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        let result = self.inner.credit(now, amount);
        self.track(now, TransactionKind::Credit, amount, result)
    }

    fn credit_interest(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        let result = self.inner.credit_interest(now, amount);
        self.track(now, TransactionKind::InterestCredit, amount, result)
    }
}

/// Withdrawal lock and interest for saving accounts.
#[derive(Debug)]
pub struct SavingOperations<'a, O> {
    inner: O,
    terms: &'a mut SavingTerms,
}

impl<'a, O: Operations> SavingOperations<'a, O> {
    pub fn new(inner: O, terms: &'a mut SavingTerms) -> Self {
        Self { inner, terms }
    }
}

impl<O: Operations> Operations for SavingOperations<'_, O> {
    fn balance(&self) -> Amount {
        self.inner.balance()
    }

    fn debit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        if let Err(e) = self.terms.check_debit_allowed(now) {
            debug!(%amount, error = %e, "saving debit rejected");
            return Err(e);
        }

        let remaining = self.inner.debit(now, amount)?;
        self.terms.last_debit_at = Some(now);
        Ok(remaining)
    }

    fn credit(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        self.inner.credit(now, amount)
    }

    fn credit_interest(&mut self, now: DateTime<Utc>, amount: Amount) -> Result<Amount, Error> {
        self.inner.credit_interest(now, amount)
    }

    fn interest_due(&self, now: DateTime<Utc>) -> Amount {
        self.terms.interest_due(self.inner.balance(), now)
    }

    fn credit_interest_due(&mut self, now: DateTime<Utc>) -> Result<Amount, Error> {
        let owed = self.terms.interest_owed(self.inner.balance(), now);
        let due = Amount::truncated(owed);
        if due.is_positive() {
            self.inner.credit_interest(now, due)?;
        }
        self.terms.settle_interest(now, owed, due);
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use crate::domain::Person;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap() + Duration::days(n)
    }

    fn amount(v: rust_decimal::Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    fn saving(balance: Amount) -> AccountRecord {
        AccountRecord::saving(
            "S1".to_string(),
            Person::new("Alice"),
            day(0),
            balance,
            dec!(0.01),
            Duration::days(1),
        )
    }

    #[test]
    fn base_rejects_overdraft_and_non_positive_amounts() {
        let mut balance = amount(dec!(10));
        let mut ops = BaseOperations::new(&mut balance);

        assert!(matches!(
            ops.debit(day(0), amount(dec!(10.0001))),
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            ops.credit(day(0), Amount::ZERO),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            ops.debit(day(0), Amount::ZERO),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(ops.debit(day(0), amount(dec!(10))).unwrap(), Amount::ZERO);
        assert_eq!(ops.credit(day(0), amount(dec!(2.5))).unwrap(), amount(dec!(2.5)));
        assert_eq!(balance, amount(dec!(2.5)));
    }

    #[test]
    fn history_records_only_successes() {
        let mut balance = amount(dec!(5));
        let mut history = TransactionHistory::default();
        {
            let mut ops = HistoryOperations::new(BaseOperations::new(&mut balance), &mut history);
            ops.credit(day(0), amount(dec!(5))).unwrap();
            assert!(ops.debit(day(1), amount(dec!(50))).is_err());
            ops.debit(day(2), amount(dec!(3))).unwrap();
        }

        let kinds: Vec<TransactionKind> = history.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Credit, TransactionKind::Debit]);
        let last = history.latest().unwrap();
        assert_eq!(last.timestamp, day(2));
        assert_eq!(last.resulting_balance, amount(dec!(7)));
    }

    #[test]
    fn saving_debit_is_locked_between_withdrawals() {
        let mut account = saving(amount(dec!(100)));
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        ops.debit(day(0), amount(dec!(10))).unwrap();
        assert!(matches!(
            ops.debit(day(0) + Duration::hours(12), amount(dec!(10))),
            Err(Error::LockActive { .. })
        ));
        assert_eq!(ops.balance(), amount(dec!(90)));
        ops.debit(day(1), amount(dec!(10))).unwrap();
        drop(ops);

        assert_eq!(history.len(), 2);
        assert_eq!(account.balance(), amount(dec!(80)));
        assert_eq!(account.saving_terms().unwrap().last_debit_at(), Some(day(1)));
    }

    #[test]
    fn failed_saving_debit_does_not_start_lock() {
        let mut account = saving(amount(dec!(5)));
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        assert!(matches!(
            ops.debit(day(0), amount(dec!(50))),
            Err(Error::InsufficientFunds { .. })
        ));
        ops.debit(day(0), amount(dec!(5))).unwrap();
    }

    #[test]
    fn interest_credit_resets_clock() {
        let mut account = saving(amount(dec!(1000)));
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        assert_eq!(ops.interest_due(day(1)), amount(dec!(10)));
        assert_eq!(ops.credit_interest_due(day(1)).unwrap(), amount(dec!(10)));
        assert_eq!(ops.balance(), amount(dec!(1010)));
        assert_eq!(ops.interest_due(day(1)), Amount::ZERO);
        assert_eq!(ops.credit_interest_due(day(1)).unwrap(), Amount::ZERO);
        drop(ops);

        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().kind, TransactionKind::InterestCredit);
        assert_eq!(
            account.saving_terms().unwrap().last_interest_credit_at(),
            day(1)
        );
    }

    #[test]
    fn zero_interest_still_advances_clock() {
        let mut account = saving(Amount::ZERO);
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        assert_eq!(ops.credit_interest_due(day(3)).unwrap(), Amount::ZERO);
        drop(ops);

        assert!(history.is_empty());
        assert_eq!(
            account.saving_terms().unwrap().last_interest_credit_at(),
            day(3)
        );
    }

    #[test]
    fn frequent_interest_credits_lose_nothing() {
        let mut account = AccountRecord::saving(
            "S1".to_string(),
            Person::new("Alice"),
            day(0),
            amount(dec!(1000)),
            dec!(0.0001),
            Duration::days(1),
        );
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        // 1600 steps of 54s make one day; each step owes 0.0000625
        let mut credited = Amount::ZERO;
        for step in 1..=1600 {
            let paid = ops
                .credit_interest_due(day(0) + Duration::seconds(54 * step))
                .unwrap();
            credited = credited.checked_add(paid).unwrap();
        }
        assert_eq!(credited, amount(dec!(0.1)));
        assert_eq!(ops.balance(), amount(dec!(1000.1)));
    }

    #[test]
    fn failed_interest_credit_keeps_the_clock() {
        let mut account = saving(amount(rust_decimal::Decimal::MAX));
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        assert!(matches!(
            ops.credit_interest_due(day(1)),
            Err(Error::InvalidAmount(_))
        ));
        drop(ops);

        assert!(history.is_empty());
        let terms = account.saving_terms().unwrap();
        assert_eq!(terms.last_interest_credit_at(), day(0));
        assert_eq!(terms.unpaid_interest(), rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn plain_accounts_bear_no_interest() {
        let mut account = AccountRecord::plain(
            "P1".to_string(),
            Person::new("Bob"),
            day(0),
            amount(dec!(1000)),
        );
        let mut history = TransactionHistory::default();
        let mut ops = chain_for(&mut account, &mut history);

        assert_eq!(ops.interest_due(day(30)), Amount::ZERO);
        assert_eq!(ops.credit_interest_due(day(30)).unwrap(), Amount::ZERO);
        ops.debit(day(0), amount(dec!(1))).unwrap();
        ops.debit(day(0), amount(dec!(1))).unwrap();
        assert_eq!(ops.balance(), amount(dec!(998)));
    }
}
