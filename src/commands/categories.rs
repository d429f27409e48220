// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{optional, required};
use crate::ledger::{CategoryNode, Ledger};
use crate::models::{CategoryUpdate, EntryType, NewCategory};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ledger: &Ledger, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let parent_id = match optional(sub, "parent") {
                Some(p) => Some(ledger.resolve_category(user, p)?.id),
                None => None,
            };
            let category = ledger.create_category(
                user,
                NewCategory {
                    name: required(sub, "name")?.to_string(),
                    r#type: required(sub, "type")?.parse::<EntryType>()?,
                    parent_id,
                    icon: optional(sub, "icon").map(str::to_string),
                },
            )?;
            println!("Added category '{}' ({})", category.name, category.id);
        }
        Some(("list", sub)) => list(ledger, user, sub)?,
        Some(("edit", sub)) => {
            let target = ledger.resolve_category(user, required(sub, "category")?)?;
            let update = CategoryUpdate {
                name: optional(sub, "name").map(str::to_string),
                r#type: optional(sub, "type").map(str::parse).transpose()?,
                icon: optional(sub, "icon").map(str::to_string),
            };
            let c = ledger.update_category(user, &target.id, update)?;
            println!("Updated category '{}'", c.name);
        }
        Some(("move", sub)) => {
            let target = ledger.resolve_category(user, required(sub, "category")?)?;
            let parent = match (optional(sub, "parent"), sub.get_flag("root")) {
                (Some(p), _) => Some(ledger.resolve_category(user, p)?.id),
                (None, true) => None,
                (None, false) => bail!("pass --parent <category> or --root"),
            };
            ledger.move_category(user, &target.id, parent.as_deref())?;
            println!("Moved category '{}'", target.name);
        }
        Some(("rm", sub)) => {
            let target = ledger.resolve_category(user, required(sub, "category")?)?;
            let removed = ledger.delete_category(user, &target.id)?;
            println!(
                "Removed category '{}' and {} sub-categories",
                target.name,
                removed.len() - 1
            );
        }
        Some(("rm-all", sub)) => {
            if !sub.get_flag("yes") {
                bail!("refusing to delete every category without --yes");
            }
            let n = ledger.delete_all_categories(user)?;
            println!("Removed {} categories", n);
        }
        _ => {}
    }
    Ok(())
}

fn list(ledger: &Ledger, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if sub.get_flag("tree") {
        let tree = ledger.category_tree(user)?;
        if !maybe_print_json(json_flag, jsonl_flag, &tree)? {
            let mut lines = Vec::new();
            render_tree(&tree, &mut lines);
            for line in lines {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    let categories = ledger.list_categories(user)?;
    if !maybe_print_json(json_flag, jsonl_flag, &categories)? {
        let names: std::collections::HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        let rows = categories
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.r#type.to_string(),
                    c.parent_id
                        .as_deref()
                        .map(|p| names.get(p).copied().unwrap_or(p).to_string())
                        .unwrap_or_default(),
                    c.icon.clone().unwrap_or_default(),
                    c.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Type", "Parent", "Icon", "Id"], rows)
        );
    }
    Ok(())
}

fn render_tree(nodes: &[CategoryNode], out: &mut Vec<String>) {
    for node in nodes {
        let label = match node.category.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{} {}", icon, node.category.name),
            _ => node.category.name.clone(),
        };
        out.push(format!(
            "{}{} ({})",
            "  ".repeat(node.depth),
            label,
            node.category.r#type
        ));
        render_tree(&node.children, out);
    }
}
