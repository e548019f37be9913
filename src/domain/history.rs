use std::collections::VecDeque;

use crate::domain::Transaction;

/// Recent transactions of one account, oldest first. A full history evicts its oldest entry.
#[derive(Debug, Clone)]
pub struct TransactionHistory {
    capacity: usize,
    entries: VecDeque<Transaction>,
}

impl TransactionHistory {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, transaction: Transaction) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(transaction);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Transaction> + ExactSizeIterator {
        self.entries.iter()
    }
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a TransactionHistory {
    type Item = &'a Transaction;
    type IntoIter = std::collections::vec_deque::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::TransactionHistory;
    use crate::domain::{Amount, Transaction, TransactionKind};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn credit(n: i64) -> Transaction {
        let amount = Amount::new(Decimal::from(n)).unwrap();
        Transaction {
            timestamp: Utc.timestamp_opt(n, 0).unwrap(),
            kind: TransactionKind::Credit,
            amount,
            resulting_balance: amount,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = TransactionHistory::default();
        for n in 1..=11 {
            history.record(credit(n));
        }

        assert_eq!(history.len(), 10);
        let amounts: Vec<Decimal> = history.iter().map(|t| t.amount.value()).collect();
        let expected: Vec<Decimal> = (2..=11).map(Decimal::from).collect();
        assert_eq!(amounts, expected);
        assert_eq!(history.latest().unwrap().amount.value(), Decimal::from(11));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = TransactionHistory::new(0);
        history.record(credit(1));
        assert!(history.is_empty());
    }
}
