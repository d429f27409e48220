// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::transactions::resolve_event;
use super::{optional, required};
use crate::ledger::Ledger;
use crate::models::EventStatus;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let event = ledger.create_event(user, required(sub, "name")?, required(sub, "icon")?)?;
            println!("Added event '{}' ({})", event.name, event.id);
        }
        Some(("list", sub)) => {
            let events = ledger.list_events(user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &events)? {
                let rows = events
                    .iter()
                    .map(|e| vec![e.icon.clone(), e.name.clone(), e.status.to_string(), e.id.clone()])
                    .collect();
                println!("{}", pretty_table(&["", "Event", "Status", "Id"], rows));
            }
        }
        Some(("edit", sub)) => {
            let id = resolve_event(ledger, user, required(sub, "event")?)?;
            let e = ledger.update_event(user, &id, optional(sub, "name"), optional(sub, "icon"))?;
            println!("Updated event '{}'", e.name);
        }
        Some(("status", sub)) => {
            let id = resolve_event(ledger, user, required(sub, "event")?)?;
            let status = required(sub, "status")?.parse::<EventStatus>()?;
            let e = ledger.set_event_status(user, &id, status)?;
            println!("Event '{}' is now {}", e.name, e.status);
        }
        Some(("rm", sub)) => {
            let id = resolve_event(ledger, user, required(sub, "event")?)?;
            let untagged = ledger.delete_event(user, &id)?;
            println!("Removed event; {} transaction(s) untagged", untagged);
        }
        _ => {}
    }
    Ok(())
}
