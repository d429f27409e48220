// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Direction of money for categories and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "income",
            EntryType::Expense => "expense",
        }
    }
}

impl FromStr for EntryType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EntryType::Income),
            "expense" => Ok(EntryType::Expense),
            other => Err(LedgerError::Validation(format!(
                "unknown entry type '{}', expected income|expense",
                other
            ))),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    /// Money the user owes someone
    Payable,
    /// Money someone owes the user
    Receivable,
}

impl DebtKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtKind::Payable => "payable",
            DebtKind::Receivable => "receivable",
        }
    }
}

impl FromStr for DebtKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "payable" => Ok(DebtKind::Payable),
            "receivable" => Ok(DebtKind::Receivable),
            other => Err(LedgerError::Validation(format!(
                "unknown debt type '{}', expected payable|receivable",
                other
            ))),
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Unpaid,
    Partial,
    Paid,
}

impl DebtStatus {
    /// Status implied by cumulative payments against the owed amount.
    pub fn for_totals(paid: Decimal, amount: Decimal) -> Self {
        if paid >= amount {
            DebtStatus::Paid
        } else if paid > Decimal::ZERO {
            DebtStatus::Partial
        } else {
            DebtStatus::Unpaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Unpaid => "unpaid",
            DebtStatus::Partial => "partial",
            DebtStatus::Paid => "paid",
        }
    }
}

impl FromStr for DebtStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(DebtStatus::Unpaid),
            "partial" => Ok(DebtStatus::Partial),
            "paid" => Ok(DebtStatus::Paid),
            other => Err(LedgerError::Validation(format!(
                "unknown debt status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Inactive,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for EventStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EventStatus::Active),
            "inactive" => Ok(EventStatus::Inactive),
            other => Err(LedgerError::Validation(format!(
                "unknown event status '{}', expected active|inactive",
                other
            ))),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub r#type: EntryType,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub r#type: EntryType,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
}

/// In-place edits; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub r#type: Option<EntryType>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub currency: String,
    pub initial_balance: Decimal,
    pub linked_category_ids: Vec<String>,
    pub is_deletable: bool,
}

#[derive(Debug, Clone)]
pub struct NewWallet {
    pub name: String,
    pub icon: Option<String>,
    pub currency: String,
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct WalletUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub initial_balance: Option<Decimal>,
    pub linked_category_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub storage_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub r#type: EntryType,
    pub category_id: String,
    pub wallet_id: String,
    pub description: Option<String>,
    pub currency: String,
    pub attachments: Vec<Attachment>,
    pub event_id: Option<String>,
    pub exclude_from_report: bool,
}

/// Input for recording or editing a transaction. `entry_currency` is the
/// currency the amount was typed in; it is converted to the user's default
/// currency before the row is written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub r#type: EntryType,
    pub category_id: String,
    pub wallet_id: String,
    pub description: Option<String>,
    pub entry_currency: Option<String>,
    pub event_id: Option<String>,
    pub exclude_from_report: bool,
}

/// A transaction with its category, wallet and event names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Option<String>,
    pub wallet: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub user_id: String,
    pub r#type: DebtKind,
    pub person: String,
    pub amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: DebtStatus,
    pub note: Option<String>,
    pub payments: Vec<Payment>,
}

impl Debt {
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn remaining(&self) -> Decimal {
        (self.amount - self.total_paid()).max(Decimal::ZERO)
    }

    pub fn derived_status(&self) -> DebtStatus {
        DebtStatus::for_totals(self.total_paid(), self.amount)
    }
}

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub r#type: DebtKind,
    pub person: String,
    pub amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DebtUpdate {
    pub r#type: Option<DebtKind>,
    pub person: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub user_id: String,
    pub default_currency: String,
    pub default_wallet_id: Option<String>,
    pub exchange_rate_api_key: Option<String>,
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debt_status_thresholds() {
        let hundred = Decimal::from(100);
        assert_eq!(DebtStatus::for_totals(Decimal::ZERO, hundred), DebtStatus::Unpaid);
        assert_eq!(DebtStatus::for_totals(Decimal::from(40), hundred), DebtStatus::Partial);
        assert_eq!(DebtStatus::for_totals(hundred, hundred), DebtStatus::Paid);
        assert_eq!(DebtStatus::for_totals(Decimal::from(120), hundred), DebtStatus::Paid);
    }

    #[test]
    fn entry_type_parses_case_insensitively() {
        assert_eq!(" Income ".parse::<EntryType>().unwrap(), EntryType::Income);
        assert!("transfer".parse::<EntryType>().unwrap_err().is_validation());
    }
}
