// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use super::{optional, required};
use crate::ledger::Ledger;
use crate::models::{NewWallet, WalletUpdate};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

#[derive(Serialize)]
pub struct WalletRow {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub initial_balance: String,
    pub balance: String,
    pub is_default: bool,
    pub is_deletable: bool,
}

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let currency = match optional(sub, "currency") {
                Some(c) => c.to_string(),
                None => ledger.default_currency(user)?,
            };
            let wallet = ledger.create_wallet(
                user,
                NewWallet {
                    name: required(sub, "name")?.to_string(),
                    icon: optional(sub, "icon").map(str::to_string),
                    currency,
                    initial_balance: parse_decimal(required(sub, "balance")?)?,
                },
            )?;
            println!("Added wallet '{}' ({})", wallet.name, wallet.currency);
        }
        Some(("list", sub)) => {
            let data = rows(ledger, user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let table = data
                    .iter()
                    .map(|w| {
                        vec![
                            if w.is_default { format!("* {}", w.name) } else { w.name.clone() },
                            w.currency.clone(),
                            w.initial_balance.clone(),
                            w.balance.clone(),
                            w.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Wallet", "CCY", "Initial", "Balance", "Id"], table)
                );
            }
        }
        Some(("edit", sub)) => {
            let wallet = ledger.resolve_wallet(user, required(sub, "wallet")?)?;
            let linked = match sub.get_many::<String>("link") {
                Some(values) => {
                    let mut ids = Vec::new();
                    for v in values {
                        ids.push(ledger.resolve_category(user, v)?.id);
                    }
                    Some(ids)
                }
                None => None,
            };
            let update = WalletUpdate {
                name: optional(sub, "name").map(str::to_string),
                icon: optional(sub, "icon").map(str::to_string),
                initial_balance: optional(sub, "balance").map(parse_decimal).transpose()?,
                linked_category_ids: linked,
            };
            let w = ledger.update_wallet(user, &wallet.id, update)?;
            println!("Updated wallet '{}'", w.name);
        }
        Some(("rm", sub)) => {
            let wallet = ledger.resolve_wallet(user, required(sub, "wallet")?)?;
            ledger.delete_wallet(user, &wallet.id)?;
            println!("Removed wallet '{}'", wallet.name);
        }
        Some(("default", sub)) => {
            if sub.get_flag("clear") {
                ledger.clear_default_wallet(user)?;
                println!("Default wallet cleared");
            } else if let Some(ident) = optional(sub, "wallet") {
                let wallet = ledger.resolve_wallet(user, ident)?;
                ledger.set_default_wallet(user, &wallet.id)?;
                println!("Default wallet set to '{}'", wallet.name);
            } else {
                match ledger.default_wallet(user)? {
                    Some(id) => println!("{}", ledger.get_wallet(user, &id)?.name),
                    None => println!("No default wallet"),
                }
            }
        }
        Some(("balance", sub)) => {
            let wallet = ledger.resolve_wallet(user, required(sub, "wallet")?)?;
            let balance = ledger.balance_of(user, &wallet.id)?;
            println!("{}: {}", wallet.name, fmt_money(&balance, &wallet.currency));
        }
        _ => {}
    }
    Ok(())
}

pub fn rows(ledger: &Ledger, user: &str) -> Result<Vec<WalletRow>> {
    let default = ledger.default_wallet(user)?;
    Ok(ledger
        .balances(user)?
        .into_iter()
        .map(|(w, balance)| WalletRow {
            is_default: default.as_deref() == Some(w.id.as_str()),
            initial_balance: fmt_money(&w.initial_balance, &w.currency),
            balance: fmt_money(&balance, &w.currency),
            id: w.id,
            name: w.name,
            currency: w.currency,
            is_deletable: w.is_deletable,
        })
        .collect())
}
