// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::Ledger;
use crate::db::{decimal_column, json_column};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryType, NewWallet, Transaction, Wallet, WalletUpdate};
use crate::notify::Change;
use crate::utils::{new_id, normalize_currency, require_name};

pub const MAIN_WALLET_NAME: &str = "Main Wallet";
pub const MAIN_WALLET_ICON: &str = "🏦";

const COLUMNS: &str =
    "id, user_id, name, icon, currency, initial_balance, linked_category_ids, is_deletable";

fn wallet_from_row(r: &Row<'_>) -> rusqlite::Result<Wallet> {
    Ok(Wallet {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        icon: r.get(3)?,
        currency: r.get(4)?,
        initial_balance: decimal_column(r, 5)?,
        linked_category_ids: json_column(r, 6)?,
        is_deletable: r.get::<_, i64>(7)? != 0,
    })
}

/// `initial_balance + Σincome − Σexpense` over the transactions booked to
/// this wallet. Exact and independent of the order of `transactions`.
pub fn wallet_balance(wallet: &Wallet, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.wallet_id == wallet.id)
        .fold(wallet.initial_balance, |acc, t| match t.r#type {
            EntryType::Income => acc + t.amount,
            EntryType::Expense => acc - t.amount,
        })
}

pub(crate) fn insert_wallet(conn: &Connection, w: &Wallet) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO wallets(id, user_id, name, icon, currency, initial_balance, linked_category_ids, is_deletable)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            w.id,
            w.user_id,
            w.name,
            w.icon,
            w.currency,
            w.initial_balance.to_string(),
            serde_json::to_string(&w.linked_category_ids)?,
            w.is_deletable as i64
        ],
    )?;
    Ok(())
}

impl Ledger {
    /// Main Wallet first, then by name.
    pub fn list_wallets(&self, user_id: &str) -> LedgerResult<Vec<Wallet>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM wallets WHERE user_id=?1 ORDER BY is_deletable ASC, name ASC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], wallet_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_wallet(&self, user_id: &str, id: &str) -> LedgerResult<Wallet> {
        let sql = format!("SELECT {COLUMNS} FROM wallets WHERE user_id=?1 AND id=?2");
        self.conn()
            .query_row(&sql, params![user_id, id], wallet_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Wallet", id))
    }

    /// Exact id, or wallet name (names are unique per user).
    pub fn resolve_wallet(&self, user_id: &str, ident: &str) -> LedgerResult<Wallet> {
        let ident = ident.trim();
        let sql = format!(
            "SELECT {COLUMNS} FROM wallets WHERE user_id=?1 AND (id=?2 OR name=?2 COLLATE NOCASE)
             ORDER BY id=?2 DESC LIMIT 1"
        );
        self.conn()
            .query_row(&sql, params![user_id, ident], wallet_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Wallet", ident))
    }

    pub fn main_wallet(&self, user_id: &str) -> LedgerResult<Wallet> {
        let sql = format!("SELECT {COLUMNS} FROM wallets WHERE user_id=?1 AND is_deletable=0");
        self.conn()
            .query_row(&sql, params![user_id], wallet_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Wallet", MAIN_WALLET_NAME))
    }

    fn ensure_wallet_name_free(
        &self,
        user_id: &str,
        name: &str,
        except: Option<&str>,
    ) -> LedgerResult<()> {
        let existing: Option<String> = self
            .conn()
            .query_row(
                "SELECT id FROM wallets WHERE user_id=?1 AND name=?2 COLLATE NOCASE",
                params![user_id, name],
                |r| r.get(0),
            )
            .optional()?;
        match existing {
            Some(id) if Some(id.as_str()) != except => Err(LedgerError::Conflict(format!(
                "a wallet named '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    fn ensure_categories_exist(&self, user_id: &str, ids: &[String]) -> LedgerResult<()> {
        for id in ids {
            self.get_category(user_id, id)?;
        }
        Ok(())
    }

    /// User-created wallets are always deletable.
    pub fn create_wallet(&self, user_id: &str, new: NewWallet) -> LedgerResult<Wallet> {
        let name = require_name(&new.name, "Wallet name")?;
        self.ensure_wallet_name_free(user_id, &name, None)?;
        let wallet = Wallet {
            id: new_id(),
            user_id: user_id.to_string(),
            name,
            icon: new.icon,
            currency: normalize_currency(&new.currency)?,
            initial_balance: new.initial_balance,
            linked_category_ids: Vec::new(),
            is_deletable: true,
        };
        insert_wallet(self.conn(), &wallet)?;
        tracing::info!(user_id, wallet = %wallet.name, "wallet created");
        self.notify(Change::Wallets);
        Ok(wallet)
    }

    pub fn update_wallet(
        &self,
        user_id: &str,
        id: &str,
        update: WalletUpdate,
    ) -> LedgerResult<Wallet> {
        let mut wallet = self.get_wallet(user_id, id)?;
        if let Some(name) = update.name {
            let name = require_name(&name, "Wallet name")?;
            self.ensure_wallet_name_free(user_id, &name, Some(id))?;
            wallet.name = name;
        }
        if let Some(icon) = update.icon {
            wallet.icon = Some(icon);
        }
        if let Some(balance) = update.initial_balance {
            wallet.initial_balance = balance;
        }
        if let Some(mut linked) = update.linked_category_ids {
            linked.sort();
            linked.dedup();
            self.ensure_categories_exist(user_id, &linked)?;
            wallet.linked_category_ids = linked;
        }
        self.conn().execute(
            "UPDATE wallets SET name=?1, icon=?2, initial_balance=?3, linked_category_ids=?4
             WHERE id=?5 AND user_id=?6",
            params![
                wallet.name,
                wallet.icon,
                wallet.initial_balance.to_string(),
                serde_json::to_string(&wallet.linked_category_ids)?,
                id,
                user_id
            ],
        )?;
        self.notify(Change::Wallets);
        Ok(wallet)
    }

    pub fn delete_wallet(&self, user_id: &str, id: &str) -> LedgerResult<()> {
        let wallet = self.get_wallet(user_id, id)?;
        if !wallet.is_deletable {
            return Err(LedgerError::Validation(
                "the main wallet cannot be deleted".into(),
            ));
        }
        let txns: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id=?1 AND wallet_id=?2",
            params![user_id, id],
            |r| r.get(0),
        )?;
        if txns > 0 {
            return Err(LedgerError::Conflict(format!(
                "wallet '{}' has {} associated transaction(s); re-assign or delete them first",
                wallet.name, txns
            )));
        }

        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            "DELETE FROM wallets WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        let cleared = tx.execute(
            "UPDATE settings SET default_wallet_id=NULL WHERE user_id=?1 AND default_wallet_id=?2",
            params![user_id, id],
        )?;
        tx.commit()?;

        tracing::info!(user_id, wallet = %wallet.name, "wallet deleted");
        self.notify(Change::Wallets);
        if cleared > 0 {
            self.notify(Change::Settings);
        }
        Ok(())
    }

    pub fn set_default_wallet(&self, user_id: &str, wallet_id: &str) -> LedgerResult<()> {
        self.get_wallet(user_id, wallet_id)?;
        self.conn().execute(
            "INSERT INTO settings(user_id, default_wallet_id) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET default_wallet_id=excluded.default_wallet_id",
            params![user_id, wallet_id],
        )?;
        self.notify(Change::Settings);
        Ok(())
    }

    pub fn default_wallet(&self, user_id: &str) -> LedgerResult<Option<String>> {
        let id: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT default_wallet_id FROM settings WHERE user_id=?1",
                params![user_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.flatten())
    }

    pub fn clear_default_wallet(&self, user_id: &str) -> LedgerResult<()> {
        self.conn().execute(
            "UPDATE settings SET default_wallet_id=NULL WHERE user_id=?1",
            params![user_id],
        )?;
        self.notify(Change::Settings);
        Ok(())
    }

    pub fn balance_of(&self, user_id: &str, wallet_id: &str) -> LedgerResult<Decimal> {
        let wallet = self.get_wallet(user_id, wallet_id)?;
        let txns = self.transactions_for_wallet(user_id, wallet_id)?;
        Ok(wallet_balance(&wallet, &txns))
    }

    pub fn balances(&self, user_id: &str) -> LedgerResult<Vec<(Wallet, Decimal)>> {
        let txns = self.all_transactions(user_id)?;
        Ok(self
            .list_wallets(user_id)?
            .into_iter()
            .map(|w| {
                let bal = wallet_balance(&w, &txns);
                (w, bal)
            })
            .collect())
    }

    /// Strip `category_ids` from every wallet's linked list. Returns how many
    /// wallets changed.
    pub(crate) fn unlink_categories(
        &self,
        conn: &Connection,
        user_id: &str,
        category_ids: &[String],
    ) -> LedgerResult<usize> {
        let mut stmt =
            conn.prepare("SELECT id, linked_category_ids FROM wallets WHERE user_id=?1")?;
        let rows = stmt.query_map(params![user_id], |r| {
            Ok((r.get::<_, String>(0)?, json_column::<Vec<String>>(r, 1)?))
        })?;
        let mut changed = Vec::new();
        for row in rows {
            let (id, linked) = row?;
            let kept: Vec<String> = linked
                .iter()
                .filter(|c| !category_ids.contains(c))
                .cloned()
                .collect();
            if kept.len() != linked.len() {
                changed.push((id, kept));
            }
        }
        for (id, kept) in &changed {
            conn.execute(
                "UPDATE wallets SET linked_category_ids=?1 WHERE id=?2",
                params![serde_json::to_string(kept)?, id],
            )?;
        }
        Ok(changed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wallet(initial: i64) -> Wallet {
        Wallet {
            id: "w".into(),
            user_id: "u".into(),
            name: "Main".into(),
            icon: None,
            currency: "USD".into(),
            initial_balance: Decimal::from(initial),
            linked_category_ids: vec![],
            is_deletable: false,
        }
    }

    fn txn(wallet_id: &str, kind: EntryType, amount: Decimal) -> Transaction {
        Transaction {
            id: new_id(),
            user_id: "u".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            amount,
            r#type: kind,
            category_id: "c".into(),
            wallet_id: wallet_id.into(),
            description: None,
            currency: "USD".into(),
            attachments: vec![],
            event_id: None,
            exclude_from_report: false,
        }
    }

    #[test]
    fn balance_folds_income_and_expense() {
        let w = wallet(100);
        let txns = vec![
            txn("w", EntryType::Income, Decimal::from(50)),
            txn("w", EntryType::Expense, Decimal::from(30)),
            txn("other", EntryType::Income, Decimal::from(999)),
        ];
        assert_eq!(wallet_balance(&w, &txns), Decimal::from(120));
    }

    #[test]
    fn balance_is_order_independent_and_exact() {
        let w = wallet(0);
        let mut txns = vec![
            txn("w", EntryType::Income, Decimal::new(10, 2)),
            txn("w", EntryType::Income, Decimal::new(20, 2)),
            txn("w", EntryType::Expense, Decimal::new(5, 2)),
        ];
        let forward = wallet_balance(&w, &txns);
        txns.reverse();
        assert_eq!(forward, wallet_balance(&w, &txns));
        assert_eq!(forward, Decimal::new(25, 2));
    }
}
