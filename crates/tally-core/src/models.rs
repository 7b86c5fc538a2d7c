//! Display models built from stored records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_store::{TransactionRecord, TransactionType};
use tally_utils::{capitalize, format_money};

use crate::whitespace::strip_template_indent;

/// Format an amount rounded to cents
pub fn format_cents(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// A user's overall balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Positive when the user owes, negative when in credit
    pub total: Decimal,
}

impl Balance {
    pub fn new(total: Decimal) -> Self {
        Self { total: total.round_dp(2) }
    }

    pub fn in_credit(&self) -> bool {
        self.total.is_sign_negative() && !self.total.is_zero()
    }

    /// "$12.50 owing" or "$3.00 in credit"
    pub fn summary(&self) -> String {
        if self.in_credit() {
            format!("${} in credit", format_cents(self.total.abs()))
        } else {
            format!("${} owing", format_cents(self.total))
        }
    }
}

/// One transaction row as displayed in a history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    /// Position in the user's transaction list
    pub index: usize,
    pub kind: TransactionType,
    /// "Sat 01/06/24"
    pub date: String,
    /// "$12.50" or "–$12.50"
    pub amount: String,
    /// Description with template indentation removed
    pub desc: String,
    /// Lower-cased description for the `data-desc` attribute
    pub data_desc: String,
    /// Total owing after this transaction
    pub total: String,
}

impl TransactionRow {
    pub fn new(index: usize, record: &TransactionRecord, running_total: Decimal) -> Self {
        let running_total = running_total.round_dp(2);
        Self {
            index,
            kind: record.kind,
            date: record.date.format("%a %d/%m/%y").to_string(),
            amount: format_money(
                &format_cents(record.amount),
                record.kind == TransactionType::Repayment,
            ),
            desc: strip_template_indent(&record.desc),
            data_desc: record.desc.to_lowercase(),
            total: format_money(
                &format_cents(running_total.abs()),
                running_total.is_sign_negative() && !running_total.is_zero(),
            ),
        }
    }
}

/// Build display rows for a newest-first transaction list.
///
/// Each row's total is the sum of that transaction and every older one.
pub fn transaction_rows(transactions: &[TransactionRecord]) -> Vec<TransactionRow> {
    let mut totals = vec![Decimal::ZERO; transactions.len()];
    let mut running = Decimal::ZERO;
    for (i, record) in transactions.iter().enumerate().rev() {
        running += record.signed_amount();
        totals[i] = running;
    }
    transactions
        .iter()
        .zip(totals)
        .enumerate()
        .map(|(i, (record, total))| TransactionRow::new(i, record, total))
        .collect()
}

/// Transaction form input
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub desc: String,
}

impl NewTransaction {
    /// Validate and convert to a stored record; a blank description becomes the type name
    pub fn into_record(self) -> Result<TransactionRecord, String> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err("Amount must not be negative".to_string());
        }
        let desc = if self.desc.is_empty() {
            capitalize(&self.kind.to_string())
        } else {
            self.desc
        };
        Ok(TransactionRecord {
            kind: self.kind,
            date: self.date,
            amount: self.amount,
            desc,
        })
    }
}

/// Insert keeping newest-first order: before the first transaction dated on or before the new one
pub fn insert_transaction(transactions: &mut Vec<TransactionRecord>, record: TransactionRecord) {
    let position = transactions
        .iter()
        .position(|existing| record.date >= existing.date)
        .unwrap_or(transactions.len());
    transactions.insert(position, record);
}
