// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::error::{LedgerError, LedgerResult};

pub const SCHEMA_VERSION: i64 = 1;

pub fn open_at(path: &Path) -> LedgerResult<Connection> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "opened ledger database");
    Ok(conn)
}

pub fn open_in_memory() -> LedgerResult<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id TEXT PRIMARY KEY,
        name TEXT,
        email TEXT
    );

    CREATE TABLE IF NOT EXISTS settings(
        user_id TEXT PRIMARY KEY,
        default_currency TEXT NOT NULL DEFAULT 'USD',
        default_wallet_id TEXT,
        exchange_rate_api_key TEXT,
        theme TEXT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        parent_id TEXT,
        icon TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

    CREATE TABLE IF NOT EXISTS wallets(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        icon TEXT,
        currency TEXT NOT NULL,
        initial_balance TEXT NOT NULL DEFAULT '0',
        linked_category_ids TEXT NOT NULL DEFAULT '[]',
        is_deletable INTEGER NOT NULL DEFAULT 1,
        UNIQUE(user_id, name)
    );
    -- at most one Main Wallet per user
    CREATE UNIQUE INDEX IF NOT EXISTS idx_wallets_main ON wallets(user_id) WHERE is_deletable = 0;

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        category_id TEXT NOT NULL,
        wallet_id TEXT NOT NULL,
        description TEXT,
        currency TEXT NOT NULL,
        attachments TEXT NOT NULL DEFAULT '[]',
        event_id TEXT,
        exclude_from_report INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS debts(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('payable','receivable')),
        person TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        due_date TEXT NOT NULL,
        status TEXT NOT NULL CHECK(status IN ('unpaid','partial','paid')),
        note TEXT,
        payments TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS events(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        icon TEXT NOT NULL,
        status TEXT NOT NULL CHECK(status IN ('active','inactive'))
    );
    "#,
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

fn conversion_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Reads a TEXT column into any `FromStr` type that reports `LedgerError`.
pub(crate) fn text_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = LedgerError>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_failure(idx, e))
}

/// Decimals are stored as TEXT to keep exact precision.
pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>().map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: Option<String> = row.get(idx)?;
    let raw = raw.unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw).map_err(|e| conversion_failure(idx, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn only_one_main_wallet_per_user() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO wallets(id, user_id, name, currency, is_deletable) VALUES ('a','u','Main Wallet','USD',0)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO wallets(id, user_id, name, currency, is_deletable) VALUES ('b','u','Other','USD',0)",
            [],
        );
        assert!(dup.is_err());
    }
}
