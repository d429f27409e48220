// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, params};
use rust_decimal::Decimal;

use super::Ledger;
use super::wallets::{MAIN_WALLET_ICON, MAIN_WALLET_NAME, insert_wallet};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, Wallet};
use crate::notify::Change;
use crate::utils::new_id;

impl Ledger {
    /// Provision a user on first use: the user row, a settings row, and the
    /// undeletable Main Wallet in the default currency. Safe to call on every
    /// start; existing data is left alone.
    pub fn ensure_user(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> LedgerResult<User> {
        if id.trim().is_empty() {
            return Err(LedgerError::Validation("user id cannot be empty".into()));
        }
        let tx = self.conn().unchecked_transaction()?;
        let created = tx.execute(
            "INSERT OR IGNORE INTO users(id, name, email) VALUES (?1, ?2, ?3)",
            params![id, name, email],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO settings(user_id) VALUES (?1)",
            params![id],
        )?;
        let has_main: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM wallets WHERE user_id=?1 AND is_deletable=0)",
            params![id],
            |r| r.get(0),
        )?;
        if !has_main {
            let currency: String = tx.query_row(
                "SELECT default_currency FROM settings WHERE user_id=?1",
                params![id],
                |r| r.get(0),
            )?;
            insert_wallet(
                &tx,
                &Wallet {
                    id: new_id(),
                    user_id: id.to_string(),
                    name: MAIN_WALLET_NAME.to_string(),
                    icon: Some(MAIN_WALLET_ICON.to_string()),
                    currency,
                    initial_balance: Decimal::ZERO,
                    linked_category_ids: Vec::new(),
                    is_deletable: false,
                },
            )?;
        }
        tx.commit()?;

        if created > 0 {
            tracing::info!(user_id = id, "user provisioned");
            self.notify(Change::Profile);
        }
        if !has_main {
            self.notify(Change::Wallets);
        }
        self.get_user(id)
    }

    pub fn get_user(&self, id: &str) -> LedgerResult<User> {
        self.conn()
            .query_row(
                "SELECT id, name, email FROM users WHERE id=?1",
                params![id],
                |r| {
                    Ok(User {
                        id: r.get(0)?,
                        name: r.get(1)?,
                        email: r.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("User", id))
    }

    /// `None` leaves a field unchanged.
    pub fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> LedgerResult<User> {
        let mut user = self.get_user(id)?;
        if let Some(name) = name {
            user.name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        }
        if let Some(email) = email {
            let email = email.trim();
            if !email.is_empty() && !email.contains('@') {
                return Err(LedgerError::Validation(format!(
                    "'{}' is not an email address",
                    email
                )));
            }
            user.email = Some(email.to_string()).filter(|e| !e.is_empty());
        }
        self.conn().execute(
            "UPDATE users SET name=?1, email=?2 WHERE id=?3",
            params![user.name, user.email, id],
        )?;
        self.notify(Change::Profile);
        Ok(user)
    }
}
