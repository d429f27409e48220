// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{optional, required};
use crate::ledger::Ledger;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let mut s = ledger.settings(user)?;
            // never echo the key itself
            s.exchange_rate_api_key = s.exchange_rate_api_key.map(|_| "********".to_string());
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let default_wallet = match s.default_wallet_id.as_deref() {
                    Some(id) => ledger
                        .get_wallet(user, id)
                        .map(|w| w.name)
                        .unwrap_or_else(|_| format!("{} (missing)", id)),
                    None => String::new(),
                };
                let rows = vec![
                    vec!["Default currency".into(), s.default_currency.clone()],
                    vec!["Default wallet".into(), default_wallet],
                    vec![
                        "Exchange-rate API key".into(),
                        s.exchange_rate_api_key.clone().unwrap_or_else(|| "not set".into()),
                    ],
                    vec!["Theme".into(), s.theme.clone().unwrap_or_default()],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("currency", sub)) => {
            let to = required(sub, "currency")?;
            if sub.get_flag("convert") {
                let summary = ledger.change_default_currency(user, to)?;
                println!(
                    "Default currency is now {}; converted {} wallet(s), {} debt(s), {} transaction(s)",
                    ledger.default_currency(user)?,
                    summary.wallets,
                    summary.debts,
                    summary.transactions
                );
            } else {
                ledger.set_default_currency(user, to)?;
                println!("Default currency is now {}", ledger.default_currency(user)?);
            }
        }
        Some(("api-key", sub)) => {
            if sub.get_flag("clear") {
                ledger.set_exchange_rate_api_key(user, None)?;
                println!("API key cleared");
            } else if let Some(key) = optional(sub, "key") {
                ledger.set_exchange_rate_api_key(user, Some(key))?;
                println!("API key saved");
            } else {
                bail!("pass a key or --clear");
            }
        }
        Some(("theme", sub)) => {
            let theme = required(sub, "theme")?;
            ledger.set_theme(user, theme)?;
            println!("Theme set to {}", theme);
        }
        _ => {}
    }
    Ok(())
}
