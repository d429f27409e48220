// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use expensewise::config::AppConfig;
use expensewise::ledger::Ledger;
use expensewise::{cli, commands};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(user) = matches.get_one::<String>("user") {
        config.user = user.trim().to_string();
    }

    // RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("expensewise={}", config.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ledger = Ledger::open(&config)?;
    let user = ledger.ensure_user(&config.user, None, None)?;
    let user = user.id.as_str();
    tracing::debug!(user, db = %config.db_path()?.display(), "ledger opened");

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path()?.display());
        }
        Some(("profile", sub)) => commands::profile::handle(&ledger, user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&ledger, user, sub)?,
        Some(("wallet", sub)) => commands::wallets::handle(&ledger, user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ledger, user, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&ledger, user, sub)?,
        Some(("event", sub)) => commands::events::handle(&ledger, user, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&ledger, user, sub)?,
        Some(("fx", sub)) => commands::fx::handle(&ledger, user, sub)?,
        Some(("import", sub)) => commands::importer::handle(&ledger, user, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ledger, user, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&ledger, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
