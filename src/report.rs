use std::io::Write;

use serde::Serialize;

use crate::bank::Bank;
use crate::domain::{
    AccountRecord, Amount, Error, Transaction, TransactionHistory, TransactionKind,
};

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    number: &'a str,
    owner: &'a str,
    kind: &'static str,
    opened_at: String,
    balance: Amount,
}

impl<'a> From<&'a AccountRecord> for SummaryRow<'a> {
    fn from(account: &'a AccountRecord) -> Self {
        Self {
            number: account.number(),
            owner: account.owner().name(),
            kind: account.kind().label(),
            opened_at: account.opened_at().to_rfc3339(),
            balance: account.balance(),
        }
    }
}

/// Writes `number,owner,kind,opened_at,balance`, one row per account in
/// opening order.
pub fn write_summary<W: Write>(bank: &Bank, writer: W) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for account in bank.accounts() {
        wtr.serialize(SummaryRow::from(account))?;
    }
    // header comes from the first row; an empty bank still gets one
    if bank.is_empty() {
        wtr.write_record(["number", "owner", "kind", "opened_at", "balance"])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_history<W: Write>(history: &TransactionHistory, writer: W) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for transaction in history {
        wtr.serialize(HistoryRow::from(transaction))?;
    }
    if history.is_empty() {
        wtr.write_record(["timestamp", "kind", "amount", "resulting_balance"])?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    timestamp: String,
    kind: &'a TransactionKind,
    amount: Amount,
    resulting_balance: Amount,
}

impl<'a> From<&'a Transaction> for HistoryRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            timestamp: t.timestamp.to_rfc3339(),
            kind: &t.kind,
            amount: t.amount,
            resulting_balance: t.resulting_balance,
        }
    }
}
