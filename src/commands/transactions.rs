// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;

use super::{optional, required};
use crate::ledger::{Ledger, PendingAttachment, Recorded, TransactionFilter};
use crate::models::{EntryType, NewTransaction, Transaction};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, user, sub)?,
        Some(("list", sub)) => list(ledger, user, sub)?,
        Some(("edit", sub)) => edit(ledger, user, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            ledger.delete_transaction(user, id)?;
            println!("Removed transaction {}", id);
        }
        Some(("rm-all", sub)) => {
            if !sub.get_flag("yes") {
                bail!("refusing to delete every transaction without --yes");
            }
            let n = ledger.delete_all_transactions(user)?;
            println!("Removed {} transactions", n);
        }
        _ => {}
    }
    Ok(())
}

/// Default wallet if one is set, otherwise the Main Wallet.
pub(crate) fn fallback_wallet(ledger: &Ledger, user: &str) -> Result<String> {
    if let Some(id) = ledger.default_wallet(user)? {
        return Ok(id);
    }
    Ok(ledger.main_wallet(user)?.id)
}

fn attachments(sub: &clap::ArgMatches) -> Result<Vec<PendingAttachment>> {
    let mut files = Vec::new();
    if let Some(paths) = sub.get_many::<String>("attach") {
        for p in paths {
            files.push(PendingAttachment::from_path(Path::new(p.trim()))?);
        }
    }
    Ok(files)
}

fn report(verb: &str, recorded: &Recorded) {
    let t = &recorded.transaction;
    println!(
        "{} {} {} {} on {} ({})",
        verb, t.r#type, t.amount, t.currency, t.date, t.id
    );
    if let Some(w) = &recorded.warning {
        eprintln!("warning: {}", w);
    }
}

fn add(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let wallet_id = match optional(sub, "wallet") {
        Some(w) => ledger.resolve_wallet(user, w)?.id,
        None => fallback_wallet(ledger, user)?,
    };
    let event_id = match optional(sub, "event") {
        Some(e) => Some(resolve_event(ledger, user, e)?),
        None => None,
    };
    let new = NewTransaction {
        date: parse_date(required(sub, "date")?)?,
        amount: parse_decimal(required(sub, "amount")?)?,
        r#type: required(sub, "type")?.parse::<EntryType>()?,
        category_id: ledger.resolve_category(user, required(sub, "category")?)?.id,
        wallet_id,
        description: optional(sub, "description").map(str::to_string),
        entry_currency: optional(sub, "currency").map(str::to_string),
        event_id,
        exclude_from_report: sub.get_flag("exclude"),
    };
    let recorded = ledger.add_transaction(user, new, &attachments(sub)?)?;
    report("Recorded", &recorded);
    Ok(())
}

fn edit(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let existing: Transaction = ledger.get_transaction(user, required(sub, "id")?)?;
    let category_id = match optional(sub, "category") {
        Some(c) => ledger.resolve_category(user, c)?.id,
        None => existing.category_id.clone(),
    };
    let wallet_id = match optional(sub, "wallet") {
        Some(w) => ledger.resolve_wallet(user, w)?.id,
        None => existing.wallet_id.clone(),
    };
    let event_id = match optional(sub, "event") {
        Some(e) => Some(resolve_event(ledger, user, e)?),
        None => existing.event_id.clone(),
    };
    let edit = NewTransaction {
        date: optional(sub, "date").map(parse_date).transpose()?.unwrap_or(existing.date),
        amount: optional(sub, "amount")
            .map(parse_decimal)
            .transpose()?
            .unwrap_or(existing.amount),
        r#type: optional(sub, "type")
            .map(str::parse)
            .transpose()?
            .unwrap_or(existing.r#type),
        category_id,
        wallet_id,
        description: optional(sub, "description")
            .map(str::to_string)
            .or(existing.description),
        entry_currency: optional(sub, "currency").map(str::to_string),
        event_id,
        exclude_from_report: match (sub.get_flag("exclude"), sub.get_flag("include")) {
            (true, _) => true,
            (_, true) => false,
            _ => existing.exclude_from_report,
        },
    };
    let recorded = ledger.update_transaction(user, &existing.id, edit, &attachments(sub)?)?;
    report("Updated", &recorded);
    Ok(())
}

pub(crate) fn resolve_event(ledger: &Ledger, user: &str, ident: &str) -> Result<String> {
    let events = ledger.list_events(user)?;
    if let Some(e) = events.iter().find(|e| e.id == ident) {
        return Ok(e.id.clone());
    }
    match events.iter().find(|e| e.name.eq_ignore_ascii_case(ident)) {
        Some(e) => Ok(e.id.clone()),
        None => Err(crate::error::LedgerError::not_found("Event", ident).into()),
    }
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub wallet: String,
    pub event: String,
    pub description: String,
}

pub fn query_rows(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut filter = TransactionFilter {
        reportable_only: sub.get_flag("reportable"),
        limit: sub.get_one::<usize>("limit").copied(),
        ..Default::default()
    };
    if let Some(w) = optional(sub, "wallet") {
        filter.wallet_id = Some(ledger.resolve_wallet(user, w)?.id);
    }
    if let Some(c) = optional(sub, "category") {
        filter.category_id = Some(ledger.resolve_category(user, c)?.id);
    }
    if let Some(e) = optional(sub, "event") {
        filter.event_id = Some(resolve_event(ledger, user, e)?);
    }

    Ok(ledger
        .list_transactions(user, &filter)?
        .into_iter()
        .map(|v| TransactionRow {
            id: v.transaction.id,
            date: v.transaction.date.to_string(),
            r#type: v.transaction.r#type.to_string(),
            amount: v.transaction.amount.to_string(),
            currency: v.transaction.currency,
            category: v.category.unwrap_or_default(),
            wallet: v.wallet.unwrap_or_default(),
            event: v.event.unwrap_or_default(),
            description: v.transaction.description.unwrap_or_default(),
        })
        .collect())
}

fn list(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, user, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.wallet.clone(),
                    r.event.clone(),
                    r.description.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Amount", "CCY", "Category", "Wallet", "Event", "Description", "Id"],
                rows,
            )
        );
    }
    Ok(())
}
