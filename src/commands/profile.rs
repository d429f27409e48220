// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::ledger::Ledger;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let u = ledger.get_user(user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &u)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Name", "Email"],
                        vec![vec![
                            u.id.clone(),
                            u.name.clone().unwrap_or_default(),
                            u.email.clone().unwrap_or_default(),
                        ]],
                    )
                );
            }
        }
        Some(("set", sub)) => {
            let name = sub.get_one::<String>("name").map(String::as_str);
            let email = sub.get_one::<String>("email").map(String::as_str);
            let u = ledger.update_profile(user, name, email)?;
            println!("Profile updated for {}", u.id);
        }
        _ => {}
    }
    Ok(())
}
