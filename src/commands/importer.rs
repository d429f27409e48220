// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, hash_map::Entry};

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use super::required;
use super::transactions::fallback_wallet;
use crate::ledger::Ledger;
use crate::models::{EntryType, NewTransaction};
use crate::utils::{parse_date, parse_decimal};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(ledger, user, sub),
        _ => Ok(()),
    }
}

/// Columns: `date,type,amount,category,wallet,description,currency`. An empty
/// wallet falls back to the default wallet; an empty currency means the
/// default currency. The whole file is imported or none of it.
fn import_transactions(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut category_cache: HashMap<String, String> = HashMap::new();
    let mut wallet_cache: HashMap<String, String> = HashMap::new();
    let mut batch = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let rec = result?;
        let line = idx + 2;
        let date_raw = rec.get(0).context("date missing")?;
        let type_raw = rec.get(1).context("type missing")?;
        let amount_raw = rec.get(2).context("amount missing")?;
        let category = rec.get(3).context("category missing")?;
        let wallet = rec.get(4).unwrap_or("");
        let description = rec.get(5).filter(|s| !s.is_empty()).map(str::to_string);
        let currency = rec.get(6).filter(|s| !s.is_empty()).map(str::to_string);

        let date = parse_date(date_raw)
            .with_context(|| format!("Invalid transaction date '{}' on line {}", date_raw, line))?;
        let r#type = type_raw
            .parse::<EntryType>()
            .with_context(|| format!("Invalid type '{}' on line {}", type_raw, line))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Invalid amount '{}' on line {}", amount_raw, line))?;

        let category_id = match category_cache.entry(category.to_lowercase()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let found = ledger
                    .resolve_category(user, category)
                    .with_context(|| format!("Category '{}' on line {}", category, line))?;
                entry.insert(found.id).clone()
            }
        };
        let wallet_id = match wallet_cache.entry(wallet.to_lowercase()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let id = if wallet.is_empty() {
                    fallback_wallet(ledger, user)?
                } else {
                    ledger
                        .resolve_wallet(user, wallet)
                        .with_context(|| format!("Wallet '{}' on line {}", wallet, line))?
                        .id
                };
                entry.insert(id).clone()
            }
        };

        batch.push(NewTransaction {
            date,
            amount,
            r#type,
            category_id,
            wallet_id,
            description,
            entry_currency: currency,
            event_id: None,
            exclude_from_report: false,
        });
    }

    let imported = ledger.add_transactions(user, batch)?;
    println!("Imported {} transactions from {}", imported.len(), path);
    Ok(())
}
