// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{optional, required};
use crate::ledger::{Ledger, RebalanceSummary};
use crate::utils::{fmt_money, normalize_currency, parse_decimal, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("convert", sub)) => {
            let amount = parse_decimal(required(sub, "amount")?)?;
            let from = normalize_currency(required(sub, "from")?)?;
            let to = normalize_currency(required(sub, "to")?)?;
            let converted = ledger.convert(user, amount, &from, &to)?;
            println!("{} = {}", fmt_money(&amount, &from), fmt_money(&converted, &to));
        }
        Some(("rebalance", sub)) => rebalance(ledger, user, sub)?,
        Some(("verify-key", sub)) => {
            let key = match optional(sub, "key") {
                Some(k) => k.to_string(),
                None => match ledger.exchange_rate_api_key(user)? {
                    Some(k) => k,
                    None => bail!("no API key stored; pass one or run `settings api-key <KEY>`"),
                },
            };
            let check = ledger.verify_api_key(&key);
            if check.valid {
                println!("API key is valid");
            } else {
                bail!(
                    "API key rejected: {}",
                    check.error.unwrap_or_else(|| "unknown error".into())
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn rebalance(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let from = required(sub, "from")?;
    let to = required(sub, "to")?;
    let summary = match optional(sub, "only") {
        Some("wallets") => RebalanceSummary {
            wallets: ledger.convert_all_wallets(user, from, to)?,
            ..Default::default()
        },
        Some("debts") => RebalanceSummary {
            debts: ledger.convert_all_debts(user, from, to)?,
            ..Default::default()
        },
        Some("transactions") => RebalanceSummary {
            transactions: ledger.convert_all_transactions(user, from, to)?,
            ..Default::default()
        },
        Some(other) => bail!("unknown record kind '{}'", other),
        None => ledger.convert_all(user, from, to)?,
    };
    println!(
        "{}",
        pretty_table(
            &["Records", "Converted"],
            vec![
                vec!["wallets".into(), summary.wallets.to_string()],
                vec!["debts".into(), summary.debts.to_string()],
                vec!["transactions".into(), summary.transactions.to_string()],
            ],
        )
    );
    Ok(())
}
