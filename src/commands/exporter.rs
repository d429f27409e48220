// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::required;
use crate::ledger::{Ledger, TransactionFilter};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(ledger, user, sub),
        _ => Ok(()),
    }
}

fn export_transactions(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;

    // oldest first, so a re-import replays in order
    let mut views = ledger.list_transactions(user, &TransactionFilter::default())?;
    views.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "type",
                "amount",
                "category",
                "wallet",
                "description",
                "currency",
                "event",
                "id",
            ])?;
            for v in &views {
                let t = &v.transaction;
                wtr.write_record([
                    t.date.to_string(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    v.category.clone().unwrap_or_default(),
                    v.wallet.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                    t.currency.clone(),
                    v.event.clone().unwrap_or_default(),
                    t.id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&views)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} transactions to {}", views.len(), out);
    Ok(())
}
