// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only consistency checks over one user's data.

use std::collections::HashSet;

use serde::Serialize;

use super::Ledger;
use super::categories::{MAX_DEPTH, category_depth};
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl Ledger {
    /// Everything that looks wrong, in a stable order. An empty list means the
    /// data is consistent.
    pub fn integrity_report(&self, user_id: &str) -> LedgerResult<Vec<Issue>> {
        let mut issues = Vec::new();

        let categories = self.list_categories(user_id)?;
        for c in &categories {
            match category_depth(Some(&c.id), &categories) {
                Ok(depth) if depth > MAX_DEPTH => issues.push(Issue::new(
                    "category_depth",
                    format!("'{}' sits at depth {}", c.name, depth),
                )),
                Ok(_) => {}
                Err(LedgerError::Integrity(msg)) => issues.push(Issue::new("category_chain", msg)),
                Err(e) => return Err(e),
            }
        }

        let category_ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        let wallets = self.list_wallets(user_id)?;
        let wallet_ids: HashSet<&str> = wallets.iter().map(|w| w.id.as_str()).collect();
        let events = self.list_events(user_id)?;
        let event_ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();

        match wallets.iter().filter(|w| !w.is_deletable).count() {
            1 => {}
            0 => issues.push(Issue::new("main_wallet", "no Main Wallet")),
            n => issues.push(Issue::new("main_wallet", format!("{} undeletable wallets", n))),
        }
        for w in &wallets {
            for linked in &w.linked_category_ids {
                if !category_ids.contains(linked.as_str()) {
                    issues.push(Issue::new(
                        "wallet_link",
                        format!("wallet '{}' links missing category {}", w.name, linked),
                    ));
                }
            }
        }

        for t in self.all_transactions(user_id)? {
            if !category_ids.contains(t.category_id.as_str()) {
                issues.push(Issue::new(
                    "transaction_category",
                    format!("transaction {} references missing category {}", t.id, t.category_id),
                ));
            }
            if !wallet_ids.contains(t.wallet_id.as_str()) {
                issues.push(Issue::new(
                    "transaction_wallet",
                    format!("transaction {} references missing wallet {}", t.id, t.wallet_id),
                ));
            }
            if let Some(event) = t.event_id.as_deref() {
                if !event_ids.contains(event) {
                    issues.push(Issue::new(
                        "transaction_event",
                        format!("transaction {} references missing event {}", t.id, event),
                    ));
                }
            }
        }

        if let Some(default) = self.default_wallet(user_id)? {
            if !wallet_ids.contains(default.as_str()) {
                issues.push(Issue::new(
                    "default_wallet",
                    format!("default wallet {} does not exist", default),
                ));
            }
        }

        for d in self.list_debts(user_id)? {
            let expected = d.derived_status();
            if d.status != expected {
                issues.push(Issue::new(
                    "debt_status",
                    format!(
                        "debt {} ({}) is '{}' but payments imply '{}'",
                        d.id, d.person, d.status, expected
                    ),
                ));
            }
        }

        Ok(issues)
    }
}
