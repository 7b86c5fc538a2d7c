//! Record types persisted in the data file

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole data file: users keyed by full name
pub type TallyData = BTreeMap<String, UserRecord>;

/// Kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money lent; increases the total owing
    Debt,
    /// Money paid back; decreases the total owing
    Repayment,
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Debt
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debt" => Ok(TransactionType::Debt),
            "repayment" => Ok(TransactionType::Repayment),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Debt => write!(f, "debt"),
            TransactionType::Repayment => write!(f, "repayment"),
        }
    }
}

/// One stored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Date in YYYY-MM-DD
    pub date: NaiveDate,
    /// Non-negative amount
    pub amount: Decimal,
    /// Free-text description, possibly multi-line
    pub desc: String,
}

impl TransactionRecord {
    /// Signed effect on the total owing
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Debt => self.amount,
            TransactionType::Repayment => -self.amount,
        }
    }
}

/// One stored user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Salted password hash, or none when the user has no password
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
    /// Newest first
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}
