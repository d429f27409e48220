// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{optional, required};
use crate::ledger::Ledger;
use crate::models::{DebtKind, DebtUpdate, NewDebt};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let currency = match optional(sub, "currency") {
                Some(c) => c.to_string(),
                None => ledger.default_currency(user)?,
            };
            let debt = ledger.create_debt(
                user,
                NewDebt {
                    r#type: required(sub, "type")?.parse::<DebtKind>()?,
                    person: required(sub, "person")?.to_string(),
                    amount: parse_decimal(required(sub, "amount")?)?,
                    currency,
                    due_date: parse_date(required(sub, "due")?)?,
                    note: optional(sub, "note").map(str::to_string),
                },
            )?;
            println!(
                "Added {} debt with {} for {} ({})",
                debt.r#type,
                debt.person,
                fmt_money(&debt.amount, &debt.currency),
                debt.id
            );
        }
        Some(("list", sub)) => {
            let debts = ledger.list_debts(user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &debts)? {
                let rows = debts
                    .iter()
                    .map(|d| {
                        vec![
                            d.person.clone(),
                            d.r#type.to_string(),
                            fmt_money(&d.amount, &d.currency),
                            fmt_money(&d.total_paid(), &d.currency),
                            fmt_money(&d.remaining(), &d.currency),
                            d.due_date.to_string(),
                            d.status.to_string(),
                            d.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Person", "Type", "Amount", "Paid", "Remaining", "Due", "Status", "Id"],
                        rows
                    )
                );
            }
        }
        Some(("pay", sub)) => {
            let date = optional(sub, "date").map(parse_date).transpose()?;
            let debt = ledger.add_payment(
                user,
                required(sub, "id")?,
                parse_decimal(required(sub, "amount")?)?,
                date,
            )?;
            println!(
                "Payment recorded; {} remaining, status {}",
                fmt_money(&debt.remaining(), &debt.currency),
                debt.status
            );
        }
        Some(("edit", sub)) => {
            let update = DebtUpdate {
                r#type: optional(sub, "type").map(str::parse).transpose()?,
                person: optional(sub, "person").map(str::to_string),
                amount: optional(sub, "amount").map(parse_decimal).transpose()?,
                due_date: optional(sub, "due").map(parse_date).transpose()?,
                note: optional(sub, "note").map(str::to_string),
            };
            let debt = ledger.update_debt(user, required(sub, "id")?, update)?;
            println!("Updated debt with {} (status {})", debt.person, debt.status);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            ledger.delete_debt(user, id)?;
            println!("Removed debt {}", id);
        }
        _ => {}
    }
    Ok(())
}
