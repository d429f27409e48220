// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod debts;
pub mod doctor;
pub mod events;
pub mod exporter;
pub mod fx;
pub mod importer;
pub mod profile;
pub mod settings;
pub mod transactions;
pub mod wallets;

use anyhow::{Result, anyhow};
use clap::ArgMatches;

/// Value of an argument clap has already marked as required.
pub(crate) fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("missing required argument '{}'", id))
}

pub(crate) fn optional<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
