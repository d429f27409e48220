// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

const UA: &str = concat!(
    "expensewise/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/expensewise)"
);

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

pub fn http_client() -> LedgerResult<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

pub fn parse_decimal(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::Validation(format!("Invalid decimal '{}'", s)))
}

/// Upper-cases and checks an ISO-4217 style code.
pub fn normalize_currency(s: &str) -> LedgerResult<String> {
    let code = s.trim().to_ascii_uppercase();
    if CURRENCY_CODE.is_match(&code) {
        Ok(code)
    } else {
        Err(LedgerError::Validation(format!(
            "Invalid currency code '{}', expected three letters",
            s
        )))
    }
}

pub fn require_positive(amount: Decimal, what: &str) -> LedgerResult<Decimal> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(LedgerError::Validation(format!(
            "{} must be greater than zero, got {}",
            what, amount
        )))
    }
}

/// Trimmed, non-empty name.
pub fn require_name(raw: &str, what: &str) -> LedgerResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation(format!("{} cannot be empty", what)));
    }
    Ok(name.to_string())
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> anyhow::Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
