// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, params};

use super::Ledger;
use crate::error::LedgerResult;
use crate::models::Settings;
use crate::notify::Change;
use crate::utils::normalize_currency;

pub const DEFAULT_CURRENCY: &str = "USD";

impl Ledger {
    /// The user's settings row, or defaults if none has been written yet.
    pub fn settings(&self, user_id: &str) -> LedgerResult<Settings> {
        let found = self
            .conn()
            .query_row(
                "SELECT user_id, default_currency, default_wallet_id, exchange_rate_api_key, theme
                 FROM settings WHERE user_id=?1",
                params![user_id],
                |r| {
                    Ok(Settings {
                        user_id: r.get(0)?,
                        default_currency: r.get(1)?,
                        default_wallet_id: r.get(2)?,
                        exchange_rate_api_key: r.get(3)?,
                        theme: r.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(found.unwrap_or_else(|| Settings {
            user_id: user_id.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_wallet_id: None,
            exchange_rate_api_key: None,
            theme: None,
        }))
    }

    pub fn default_currency(&self, user_id: &str) -> LedgerResult<String> {
        Ok(self.settings(user_id)?.default_currency)
    }

    /// Only updates the setting. Use [`Ledger::change_default_currency`] to
    /// re-denominate existing records as well.
    pub fn set_default_currency(&self, user_id: &str, currency: &str) -> LedgerResult<()> {
        let currency = normalize_currency(currency)?;
        self.conn().execute(
            "INSERT INTO settings(user_id, default_currency) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET default_currency=excluded.default_currency",
            params![user_id, currency],
        )?;
        self.notify(Change::Settings);
        Ok(())
    }

    pub fn exchange_rate_api_key(&self, user_id: &str) -> LedgerResult<Option<String>> {
        Ok(self
            .settings(user_id)?
            .exchange_rate_api_key
            .filter(|k| !k.trim().is_empty()))
    }

    /// `None` or a blank key clears it.
    pub fn set_exchange_rate_api_key(&self, user_id: &str, key: Option<&str>) -> LedgerResult<()> {
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        self.conn().execute(
            "INSERT INTO settings(user_id, exchange_rate_api_key) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET exchange_rate_api_key=excluded.exchange_rate_api_key",
            params![user_id, key],
        )?;
        self.notify(Change::Settings);
        Ok(())
    }

    pub fn set_theme(&self, user_id: &str, theme: &str) -> LedgerResult<()> {
        self.conn().execute(
            "INSERT INTO settings(user_id, theme) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET theme=excluded.theme",
            params![user_id, theme.trim()],
        )?;
        self.notify(Change::Settings);
        Ok(())
    }
}
