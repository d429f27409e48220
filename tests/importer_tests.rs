// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use expensewise::db;
use expensewise::error::{LedgerError, LedgerResult};
use expensewise::fx::{RateSource, RateTable};
use expensewise::ledger::Ledger;
use expensewise::models::{EntryType, NewCategory, NewWallet};
use expensewise::{cli, commands::importer};
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

const USER: &str = "dev-user";
const HEADER: &str = "date,type,amount,category,wallet,description,currency";

struct NoRates;

impl RateSource for NoRates {
    fn latest(&self, _api_key: &str, _base: &str) -> LedgerResult<RateTable> {
        Err(LedgerError::ExternalService("offline".into()))
    }
}

fn setup() -> Ledger {
    let ledger = Ledger::new(db::open_in_memory().unwrap(), Box::new(NoRates));
    ledger.ensure_user(USER, None, None).unwrap();
    for (name, kind) in [("Groceries", EntryType::Expense), ("Salary", EntryType::Income)] {
        ledger
            .create_category(
                USER,
                NewCategory {
                    name: name.into(),
                    r#type: kind,
                    parent_id: None,
                    icon: None,
                },
            )
            .unwrap();
    }
    ledger
        .create_wallet(
            USER,
            NewWallet {
                name: "Checking".into(),
                icon: None,
                currency: "USD".into(),
                initial_balance: Decimal::ZERO,
            },
        )
        .unwrap();
    ledger
}

fn import(ledger: &Ledger, body: &str, padded: bool) -> anyhow::Result<()> {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}\n{}", HEADER, body).unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let path = if padded { format!("  {}  ", path) } else { path };
    let matches = cli::build_cli().get_matches_from([
        "expensewise",
        "import",
        "transactions",
        "--path",
        &path,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(ledger, USER, import_m)
    } else {
        panic!("no import subcommand");
    }
}

fn count(ledger: &Ledger) -> usize {
    ledger.list_transactions(USER, &Default::default()).unwrap().len()
}

#[test]
fn importer_trims_cli_path_argument() {
    let ledger = setup();
    import(&ledger, "2025-02-03,expense,5.00,Groceries,Checking,,", true).unwrap();
    assert_eq!(count(&ledger), 1);
}

#[test]
fn importer_trims_fields_and_resolves_names() {
    let ledger = setup();
    import(
        &ledger,
        "2025-02-03, Income ,2500, salary , checking ,  March pay  ,usd",
        false,
    )
    .unwrap();

    let views = ledger.list_transactions(USER, &Default::default()).unwrap();
    let v = &views[0];
    assert_eq!(v.category.as_deref(), Some("Salary"));
    assert_eq!(v.wallet.as_deref(), Some("Checking"));
    assert_eq!(v.transaction.r#type, EntryType::Income);
    assert_eq!(v.transaction.description.as_deref(), Some("March pay"));
    assert_eq!(v.transaction.amount, Decimal::from(2500));
}

#[test]
fn empty_wallet_falls_back_to_main_wallet() {
    let ledger = setup();
    import(&ledger, "2025-02-03,expense,7,Groceries,,,", false).unwrap();
    let views = ledger.list_transactions(USER, &Default::default()).unwrap();
    assert_eq!(views[0].wallet.as_deref(), Some("Main Wallet"));
}

#[test]
fn importer_rejects_invalid_date() {
    let ledger = setup();
    let err = import(&ledger, "2025-13-03,expense,5,Groceries,Checking,,", false).unwrap_err();
    assert!(
        err.to_string()
            .contains("Invalid transaction date '2025-13-03' on line 2")
    );
    assert_eq!(count(&ledger), 0);
}

#[test]
fn importer_rejects_unknown_category() {
    let ledger = setup();
    let err = import(&ledger, "2025-02-03,expense,5,Travel,Checking,,", false).unwrap_err();
    assert!(err.to_string().contains("Category 'Travel' on line 2"));
    assert_eq!(count(&ledger), 0);
}

#[test]
fn importer_rolls_back_when_row_fails() {
    let ledger = setup();
    let err = import(
        &ledger,
        "2025-02-03,expense,5,Groceries,Checking,,\n2025-02-04,expense,-7,Groceries,Checking,,",
        false,
    )
    .unwrap_err();
    let err = err.downcast::<LedgerError>().unwrap();
    assert!(err.is_validation());
    assert_eq!(count(&ledger), 0);
}

#[test]
fn foreign_rows_need_a_working_rate_source() {
    let ledger = setup();
    let err = import(
        &ledger,
        "2025-02-03,expense,5,Groceries,Checking,,\n2025-02-04,expense,7,Groceries,Checking,,EUR",
        false,
    )
    .unwrap_err();
    let err = err.downcast::<LedgerError>().unwrap();
    assert!(matches!(err, LedgerError::Config(_)));
    assert_eq!(count(&ledger), 0);
}
