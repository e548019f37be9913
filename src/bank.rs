use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::BankConfig;
use crate::domain::{
    AccountRecord, Amount, BalanceSource, Error, Operations, Person, TransactionHistory,
};
use crate::operations::chain_for;

// accounts stay in opening order; bank-wide queries depend on it
#[derive(Debug)]
pub struct Bank {
    accounts: Vec<AccountRecord>,
    index: HashMap<String, usize>,
    accounts_by_owner: HashMap<Person, Vec<String>>,
    histories: HashMap<String, TransactionHistory>,
    saving_daily_interest: Decimal,
    saving_debit_lock: Duration,
}

impl Bank {
    pub fn new(saving_daily_interest: Decimal, saving_debit_lock: Duration) -> Result<Self, Error> {
        BankConfig::new(saving_daily_interest, saving_debit_lock).map(Self::with_config)
    }

    pub fn with_config(config: BankConfig) -> Self {
        Self {
            accounts: Vec::new(),
            index: HashMap::new(),
            accounts_by_owner: HashMap::new(),
            histories: HashMap::new(),
            saving_daily_interest: config.saving_daily_interest,
            saving_debit_lock: config.saving_debit_lock,
        }
    }

    pub fn open_bank_account(
        &mut self,
        number: impl Into<String>,
        owner: Person,
        now: DateTime<Utc>,
        initial_credit: Amount,
    ) -> Result<&AccountRecord, Error> {
        self.register(AccountRecord::plain(number.into(), owner, now, initial_credit))
    }

    pub fn open_saving_account(
        &mut self,
        number: impl Into<String>,
        owner: Person,
        now: DateTime<Utc>,
        initial_credit: Amount,
    ) -> Result<&AccountRecord, Error> {
        let account = AccountRecord::saving(
            number.into(),
            owner,
            now,
            initial_credit,
            self.saving_daily_interest,
            self.saving_debit_lock,
        );
        self.register(account)
    }

    fn register(&mut self, account: AccountRecord) -> Result<&AccountRecord, Error> {
        let slot = self.accounts.len();
        match self.index.entry(account.number.clone()) {
            Entry::Occupied(_) => {
                debug!(number = %account.number, "duplicate account rejected");
                return Err(Error::DuplicateAccount(account.number));
            }
            Entry::Vacant(e) => {
                e.insert(slot);
            }
        }

        debug!(
            number = %account.number,
            owner = %account.owner,
            kind = account.kind.label(),
            balance = %account.balance,
            "account opened"
        );

        self.histories.insert(
            account.number.clone(),
            TransactionHistory::new(TransactionHistory::DEFAULT_CAPACITY),
        );
        self.accounts_by_owner
            .entry(account.owner.clone())
            .or_default()
            .push(account.number.clone());
        self.accounts.push(account);

        Ok(&self.accounts[slot])
    }

    pub fn account(&self, number: &str) -> Result<&AccountRecord, Error> {
        self.index
            .get(number)
            .map(|&slot| &self.accounts[slot])
            .ok_or_else(|| Error::NotFound(number.to_string()))
    }

    pub fn accounts(&self) -> impl ExactSizeIterator<Item = &AccountRecord> {
        self.accounts.iter()
    }

    pub fn accounts_of(&self, owner: &Person) -> Vec<&AccountRecord> {
        self.accounts_by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|number| self.index.get(number))
            .map(|&slot| &self.accounts[slot])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn operations_for(&mut self, number: &str) -> Result<Box<dyn Operations + '_>, Error> {
        let slot = *self
            .index
            .get(number)
            .ok_or_else(|| Error::NotFound(number.to_string()))?;
        let history = self
            .histories
            .get_mut(number)
            .ok_or_else(|| Error::NotFound(number.to_string()))?;

        Ok(chain_for(&mut self.accounts[slot], history))
    }

    pub fn history_for(&self, number: &str) -> Result<&TransactionHistory, Error> {
        self.histories
            .get(number)
            .ok_or_else(|| Error::NotFound(number.to_string()))
    }

    /// Debits `fee` from every plain account. Successful debits stay applied
    /// when others fail.
    pub fn debit_fee(&mut self, now: DateTime<Utc>, fee: Amount) -> Result<(), Error> {
        self.sweep(
            "debit_fee",
            |account| !account.is_saving(),
            |ops| ops.debit(now, fee),
        )
    }

    // read only: nothing is credited
    pub fn compute_total_interest(&self, now: DateTime<Utc>) -> Result<Amount, Error> {
        Amount::checked_sum(self.accounts.iter().filter_map(|account| {
            account
                .saving_terms()
                .map(|terms| terms.interest_due(account.balance, now))
        }))
    }

    pub fn credit_interest_for_all_saving_accounts(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.sweep(
            "credit_interest",
            AccountRecord::is_saving,
            |ops| ops.credit_interest_due(now),
        )
    }

    fn sweep<Q, F>(&mut self, name: &'static str, qualifies: Q, mut apply: F) -> Result<(), Error>
    where
        Q: Fn(&AccountRecord) -> bool,
        F: FnMut(&mut dyn Operations) -> Result<Amount, Error>,
    {
        let mut attempted = 0;
        let mut failures = Vec::new();

        for account in self.accounts.iter_mut().filter(|a| qualifies(&**a)) {
            attempted += 1;
            let number = account.number.clone();

            let result = match self.histories.get_mut(&number) {
                Some(history) => {
                    let mut ops = chain_for(account, history);
                    apply(&mut *ops)
                }
                None => Err(Error::NotFound(number.clone())),
            };

            if let Err(e) = result {
                warn!(sweep = name, %number, error = %e, "sweep step failed");
                failures.push((number, e));
            }
        }

        info!(
            sweep = name,
            attempted,
            failed = failures.len(),
            "sweep finished"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::AggregateFailure { attempted, failures })
        }
    }

    // ties on owner name keep opening order
    pub fn accounts_with_balance_above(&self, amount: Amount) -> Vec<&AccountRecord> {
        let mut matching: Vec<&AccountRecord> = self
            .accounts
            .iter()
            .filter(|account| account.balance >= amount)
            .collect();
        matching.sort_by(|a, b| a.owner.name().cmp(b.owner.name()));
        matching
    }

    pub fn accounts_with_balance_greater_than(&self, amount: Amount) -> Vec<&AccountRecord> {
        self.accounts
            .iter()
            .filter(|account| account.balance > amount)
            .collect()
    }

    // earliest opened wins ties
    pub fn owner_of_smallest_account(&self) -> Option<&Person> {
        self.accounts
            .iter()
            .min_by_key(|account| account.balance)
            .map(|account| &account.owner)
    }

    pub fn total_balance(&self) -> Result<Amount, Error> {
        Amount::checked_sum(self.accounts.iter().map(|account| account.balance))
    }

    /// Queries every balance from `source` concurrently. Any failed query
    /// fails the whole total.
    pub async fn total_balance_async<S>(&self, source: &S) -> Result<Amount, Error>
    where
        S: BalanceSource + ?Sized,
    {
        let queries = self.accounts.iter().map(|account| async move {
            source
                .balance_of(account)
                .await
                .map_err(|e| (account.number.clone(), e))
        });

        let balances = try_join_all(queries).await.map_err(|(number, e)| {
            warn!(%number, error = %e, "balance query failed");
            Error::AggregateFailure {
                attempted: self.accounts.len(),
                failures: vec![(number, e)],
            }
        })?;

        Amount::checked_sum(balances)
    }
}

impl core::fmt::Display for Bank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, account) in self.accounts.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", account)?;
        }
        Ok(())
    }
}
