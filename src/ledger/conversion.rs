// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency conversion and bulk re-denomination.
//!
//! Single amounts go through [`Ledger::convert`]. The `convert_all_*`
//! operations rewrite every record held in one currency into another inside a
//! single SQLite transaction, so a failure part way through leaves every row in
//! its original currency.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Ledger;
use crate::db::{decimal_column, json_column};
use crate::error::{LedgerError, LedgerResult};
use crate::models::Payment;
use crate::notify::Change;
use crate::utils::normalize_currency;

/// Result of a lenient conversion. `warning` is set when the lookup failed and
/// the amount was kept unconverted.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub amount: Decimal,
    pub currency: String,
    pub warning: Option<String>,
}

/// Rows rewritten by a bulk re-denomination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebalanceSummary {
    pub wallets: usize,
    pub debts: usize,
    pub transactions: usize,
}

/// `amount * rate`; overflow is a validation error.
pub(crate) fn scale(amount: Decimal, rate: Decimal) -> LedgerResult<Decimal> {
    amount
        .checked_mul(rate)
        .ok_or_else(|| LedgerError::Validation("amount out of range".into()))
}

fn rewrite_wallets(conn: &Connection, user_id: &str, from: &str, to: &str, rate: Decimal) -> LedgerResult<usize> {
    let rows: Vec<(String, Decimal)> = {
        let mut stmt =
            conn.prepare("SELECT id, initial_balance FROM wallets WHERE user_id=?1 AND currency=?2")?;
        let mapped = stmt.query_map(params![user_id, from], |r| Ok((r.get(0)?, decimal_column(r, 1)?)))?;
        mapped.collect::<Result<_, _>>()?
    };
    for (id, balance) in &rows {
        conn.execute(
            "UPDATE wallets SET initial_balance=?1, currency=?2 WHERE id=?3",
            params![scale(*balance, rate)?.to_string(), to, id],
        )?;
    }
    Ok(rows.len())
}

fn rewrite_debts(conn: &Connection, user_id: &str, from: &str, to: &str, rate: Decimal) -> LedgerResult<usize> {
    let rows: Vec<(String, Decimal, Vec<Payment>)> = {
        let mut stmt = conn
            .prepare("SELECT id, amount, payments FROM debts WHERE user_id=?1 AND currency=?2")?;
        let mapped = stmt.query_map(params![user_id, from], |r| {
            Ok((r.get(0)?, decimal_column(r, 1)?, json_column(r, 2)?))
        })?;
        mapped.collect::<Result<_, _>>()?
    };
    for (id, amount, payments) in &rows {
        let scaled = payments
            .iter()
            .map(|p| {
                Ok(Payment {
                    amount: scale(p.amount, rate)?,
                    ..p.clone()
                })
            })
            .collect::<LedgerResult<Vec<Payment>>>()?;
        conn.execute(
            "UPDATE debts SET amount=?1, currency=?2, payments=?3 WHERE id=?4",
            params![scale(*amount, rate)?.to_string(), to, serde_json::to_string(&scaled)?, id],
        )?;
    }
    Ok(rows.len())
}

fn rewrite_transactions(conn: &Connection, user_id: &str, from: &str, to: &str, rate: Decimal) -> LedgerResult<usize> {
    let rows: Vec<(String, Decimal)> = {
        let mut stmt =
            conn.prepare("SELECT id, amount FROM transactions WHERE user_id=?1 AND currency=?2")?;
        let mapped = stmt.query_map(params![user_id, from], |r| Ok((r.get(0)?, decimal_column(r, 1)?)))?;
        mapped.collect::<Result<_, _>>()?
    };
    for (id, amount) in &rows {
        conn.execute(
            "UPDATE transactions SET amount=?1, currency=?2 WHERE id=?3",
            params![scale(*amount, rate)?.to_string(), to, id],
        )?;
    }
    Ok(rows.len())
}

type Rewrite = fn(&Connection, &str, &str, &str, Decimal) -> LedgerResult<usize>;

fn rewrite_all(conn: &Connection, user_id: &str, from: &str, to: &str, rate: Decimal) -> LedgerResult<RebalanceSummary> {
    Ok(RebalanceSummary {
        wallets: rewrite_wallets(conn, user_id, from, to, rate)?,
        debts: rewrite_debts(conn, user_id, from, to, rate)?,
        transactions: rewrite_transactions(conn, user_id, from, to, rate)?,
    })
}

impl Ledger {
    /// Units of `to` per one unit of `from`. Equal codes never hit the network.
    pub fn exchange_rate(&self, user_id: &str, from: &str, to: &str) -> LedgerResult<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let api_key = self
            .exchange_rate_api_key(user_id)?
            .ok_or_else(|| LedgerError::Config("missing API key".into()))?;
        let table = self.rates().latest(&api_key, from)?;
        table.rate(to).ok_or_else(|| {
            LedgerError::ExternalService(format!("no {} rate quoted against {}", to, from))
        })
    }

    pub fn convert(&self, user_id: &str, amount: Decimal, from: &str, to: &str) -> LedgerResult<Decimal> {
        let from = normalize_currency(from)?;
        let to = normalize_currency(to)?;
        scale(amount, self.exchange_rate(user_id, &from, &to)?)
    }

    /// Like [`Ledger::convert`] but never fails: on error the amount is kept
    /// as entered, labelled with `to`, and the reason is returned as a warning.
    pub fn convert_or_keep(&self, user_id: &str, amount: Decimal, from: &str, to: &str) -> Converted {
        match self.convert(user_id, amount, from, to) {
            Ok(converted) => Converted {
                amount: converted,
                currency: to.to_string(),
                warning: None,
            },
            Err(e) => {
                tracing::warn!(user_id, from, to, error = %e, "conversion failed, keeping original amount");
                Converted {
                    amount,
                    currency: to.to_string(),
                    warning: Some(format!(
                        "could not convert {} to {} ({}); amount saved unconverted",
                        from, to, e
                    )),
                }
            }
        }
    }

    fn rebalance(&self, user_id: &str, from: &str, to: &str, rewrite: Rewrite) -> LedgerResult<usize> {
        let from = normalize_currency(from)?;
        let to = normalize_currency(to)?;
        if from == to {
            return Ok(0);
        }
        let rate = self.exchange_rate(user_id, &from, &to)?;
        let tx = self.conn().unchecked_transaction()?;
        let changed = rewrite(&tx, user_id, &from, &to, rate)?;
        tx.commit()?;
        Ok(changed)
    }

    pub fn convert_all_wallets(&self, user_id: &str, from: &str, to: &str) -> LedgerResult<usize> {
        let n = self.rebalance(user_id, from, to, rewrite_wallets)?;
        tracing::info!(user_id, from, to, wallets = n, "wallets re-denominated");
        self.notify(Change::Wallets);
        Ok(n)
    }

    /// Also scales every recorded payment by the same rate.
    pub fn convert_all_debts(&self, user_id: &str, from: &str, to: &str) -> LedgerResult<usize> {
        let n = self.rebalance(user_id, from, to, rewrite_debts)?;
        tracing::info!(user_id, from, to, debts = n, "debts re-denominated");
        self.notify(Change::Debts);
        Ok(n)
    }

    pub fn convert_all_transactions(&self, user_id: &str, from: &str, to: &str) -> LedgerResult<usize> {
        let n = self.rebalance(user_id, from, to, rewrite_transactions)?;
        tracing::info!(user_id, from, to, transactions = n, "transactions re-denominated");
        self.notify(Change::Transactions);
        Ok(n)
    }

    /// Re-denominate wallets, debts and transactions held in `from` with one
    /// rate lookup and one storage transaction.
    pub fn convert_all(&self, user_id: &str, from: &str, to: &str) -> LedgerResult<RebalanceSummary> {
        let from = normalize_currency(from)?;
        let to = normalize_currency(to)?;
        if from == to {
            return Ok(RebalanceSummary::default());
        }
        let rate = self.exchange_rate(user_id, &from, &to)?;

        let tx = self.conn().unchecked_transaction()?;
        let summary = rewrite_all(&tx, user_id, &from, &to, rate)?;
        tx.commit()?;

        tracing::info!(user_id, from = %from, to = %to, ?summary, "records re-denominated");
        for change in [Change::Wallets, Change::Debts, Change::Transactions] {
            self.notify(change);
        }
        Ok(summary)
    }

    /// Switch the default currency and re-denominate wallets, debts and
    /// transactions held in the old one. All or nothing.
    pub fn change_default_currency(&self, user_id: &str, to: &str) -> LedgerResult<RebalanceSummary> {
        let to = normalize_currency(to)?;
        let from = self.default_currency(user_id)?;
        if from == to {
            return Ok(RebalanceSummary::default());
        }
        let rate = self.exchange_rate(user_id, &from, &to)?;

        let tx = self.conn().unchecked_transaction()?;
        let summary = rewrite_all(&tx, user_id, &from, &to, rate)?;
        tx.execute(
            "INSERT INTO settings(user_id, default_currency) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET default_currency=excluded.default_currency",
            params![user_id, to],
        )?;
        tx.commit()?;

        tracing::info!(user_id, from = %from, to = %to, ?summary, "default currency changed");
        for change in [Change::Wallets, Change::Debts, Change::Transactions, Change::Settings] {
            self.notify(change);
        }
        Ok(summary)
    }
}
