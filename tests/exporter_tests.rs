// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use expensewise::db;
use expensewise::error::{LedgerError, LedgerResult};
use expensewise::fx::{RateSource, RateTable};
use expensewise::ledger::Ledger;
use expensewise::models::{EntryType, NewCategory, NewTransaction};
use expensewise::{cli, commands::exporter};
use rust_decimal::Decimal;
use tempfile::tempdir;

const USER: &str = "dev-user";

struct NoRates;

impl RateSource for NoRates {
    fn latest(&self, _api_key: &str, _base: &str) -> LedgerResult<RateTable> {
        Err(LedgerError::ExternalService("offline".into()))
    }
}

fn setup() -> Ledger {
    let ledger = Ledger::new(db::open_in_memory().unwrap(), Box::new(NoRates));
    ledger.ensure_user(USER, None, None).unwrap();
    let cat = ledger
        .create_category(
            USER,
            NewCategory {
                name: "Groceries".into(),
                r#type: EntryType::Expense,
                parent_id: None,
                icon: None,
            },
        )
        .unwrap();
    let wallet = ledger.main_wallet(USER).unwrap();
    for (day, amount, desc) in [(2, "12.34", "Weekly run"), (1, "3.50", "Milk")] {
        ledger
            .add_transaction(
                USER,
                NewTransaction {
                    date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
                    amount: amount.parse().unwrap(),
                    r#type: EntryType::Expense,
                    category_id: cat.id.clone(),
                    wallet_id: wallet.id.clone(),
                    description: Some(desc.into()),
                    entry_currency: None,
                    event_id: None,
                    exclude_from_report: false,
                },
                &[],
            )
            .unwrap();
    }
    ledger
}

fn export(ledger: &Ledger, format: &str, out: &str) {
    let matches = cli::build_cli().get_matches_from([
        "expensewise",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(ledger, USER, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_writes_csv_oldest_first() {
    let ledger = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&ledger, "csv", &out_path.to_string_lossy());

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    assert_eq!(&headers[3], "category");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "2025-01-01");
    assert_eq!(&rows[0][2], "3.50");
    assert_eq!(&rows[1][3], "Groceries");
    assert_eq!(&rows[1][4], "Main Wallet");
    assert_eq!(&rows[1][5], "Weekly run");
}

#[test]
fn export_transactions_streams_pretty_json() {
    let ledger = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&ledger, "json", &out_path.to_string_lossy());

    let body = std::fs::read_to_string(&out_path).unwrap();
    let items: serde_json::Value = serde_json::from_str(&body).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["category"], "Groceries");
    assert_eq!(items[1]["wallet"], "Main Wallet");
    assert_eq!(items[1]["type"], "expense");
    assert_eq!(items[1]["amount"], "12.34");
    assert_eq!(items[1]["currency"], "USD");
}

#[test]
fn exported_csv_can_be_imported_again() {
    let source = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("roundtrip.csv");
    export(&source, "csv", &out_path.to_string_lossy());

    let target = setup();
    let path = out_path.to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "expensewise", "import", "transactions", "--path", &path,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        expensewise::commands::importer::handle(&target, USER, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    let views = target.list_transactions(USER, &Default::default()).unwrap();
    assert_eq!(views.len(), 4);
    let total: Decimal = views.iter().map(|v| v.transaction.amount).sum();
    assert_eq!(total, Decimal::new(3168, 2));
}
