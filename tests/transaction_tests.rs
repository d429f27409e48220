// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;

use expensewise::db;
use expensewise::error::{LedgerError, LedgerResult};
use expensewise::fx::{RateSource, RateTable};
use expensewise::ledger::{AttachmentStore, Ledger, PendingAttachment, TransactionFilter};
use expensewise::models::{EntryType, NewCategory};
use expensewise::{cli, commands::transactions};
use rust_decimal::Decimal;
use tempfile::{NamedTempFile, tempdir};

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
    ledger
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
    ledger
}

fn run(ledger: &Ledger, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["expensewise", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(ledger, USER, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn add(ledger: &Ledger, date: &str, amount: &str) {
    run(
        ledger,
        &[
            "add", "--date", date, "--amount", amount, "--type", "expense", "--category",
            "groceries",
        ],
    )
    .unwrap();
}

#[test]
fn list_is_newest_first_and_limited() {
    let ledger = setup();
    for day in ["2025-01-01", "2025-01-03", "2025-01-02"] {
        add(&ledger, day, "10");
    }
    let matches = cli::build_cli().get_matches_from(["expensewise", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&ledger, USER, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
            assert_eq!(rows[1].date, "2025-01-02");
            assert_eq!(rows[0].wallet, "Main Wallet");
            assert_eq!(rows[0].category, "Groceries");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn non_positive_amount_is_rejected() {
    let ledger = setup();
    let err = run(
        &ledger,
        &[
            "add", "--date", "2025-01-01", "--amount", "0", "--type", "expense", "--category",
            "Groceries",
        ],
    )
    .unwrap_err();
    let err = err.downcast::<LedgerError>().unwrap();
    assert!(err.is_validation());
    assert!(ledger.list_transactions(USER, &Default::default()).unwrap().is_empty());
}

#[test]
fn excluded_rows_are_hidden_from_reportable_listing() {
    let ledger = setup();
    add(&ledger, "2025-01-01", "10");
    run(
        &ledger,
        &[
            "add", "--date", "2025-01-02", "--amount", "99", "--type", "expense", "--category",
            "Groceries", "--exclude-from-report",
        ],
    )
    .unwrap();

    let filter = TransactionFilter {
        reportable_only: true,
        ..Default::default()
    };
    let views = ledger.list_transactions(USER, &filter).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].transaction.amount, Decimal::from(10));
}

#[test]
fn attachments_live_next_to_the_database() {
    let dir = tempdir().unwrap();
    let ledger = setup().with_attachments(AttachmentStore::new(dir.path().join("files")));

    let mut receipt = NamedTempFile::new().unwrap();
    write!(receipt, "total 10.00").unwrap();
    receipt.flush().unwrap();
    let path = receipt.path().to_string_lossy().to_string();
    run(
        &ledger,
        &[
            "add", "--date", "2025-01-01", "--amount", "10", "--type", "expense", "--category",
            "Groceries", "--attach", path.as_str(),
        ],
    )
    .unwrap();

    let views = ledger.list_transactions(USER, &Default::default()).unwrap();
    let t = &views[0].transaction;
    assert_eq!(t.attachments.len(), 1);
    let stored = dir.path().join("files").join(&t.attachments[0].storage_ref);
    assert!(t.attachments[0].storage_ref.starts_with(&t.id));
    assert_eq!(std::fs::read_to_string(&stored).unwrap(), "total 10.00");

    ledger.delete_transaction(USER, &t.id).unwrap();
    assert!(!stored.exists());
}

#[test]
fn attachments_need_a_store() {
    let ledger = setup();
    let cat = ledger.resolve_category(USER, "Groceries").unwrap();
    let wallet = ledger.main_wallet(USER).unwrap();
    let err = ledger
        .add_transaction(
            USER,
            expensewise::models::NewTransaction {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                amount: Decimal::ONE,
                r#type: EntryType::Expense,
                category_id: cat.id,
                wallet_id: wallet.id,
                description: None,
                entry_currency: None,
                event_id: None,
                exclude_from_report: false,
            },
            &[PendingAttachment {
                name: "a.txt".into(),
                bytes: b"x".to_vec(),
            }],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::Config(_)));
    assert!(ledger.list_transactions(USER, &Default::default()).unwrap().is_empty());
}

#[test]
fn edit_keeps_unspecified_fields() {
    let ledger = setup();
    run(
        &ledger,
        &[
            "add", "--date", "2025-01-01", "--amount", "10", "--type", "expense", "--category",
            "Groceries", "--desc", "weekly shop",
        ],
    )
    .unwrap();
    let id = ledger.list_transactions(USER, &Default::default()).unwrap()[0]
        .transaction
        .id
        .clone();

    run(&ledger, &["edit", id.as_str(), "--amount", "12.5"]).unwrap();
    let t = ledger.get_transaction(USER, &id).unwrap();
    assert_eq!(t.amount, Decimal::new(125, 1));
    assert_eq!(t.description.as_deref(), Some("weekly shop"));
    assert_eq!(t.date.to_string(), "2025-01-01");
}

#[test]
fn edit_can_toggle_report_exclusion() {
    let ledger = setup();
    run(
        &ledger,
        &[
            "add", "--date", "2025-01-01", "--amount", "10", "--type", "expense", "--category",
            "Groceries", "--exclude-from-report",
        ],
    )
    .unwrap();
    let id = ledger.list_transactions(USER, &Default::default()).unwrap()[0]
        .transaction
        .id
        .clone();
    assert!(ledger.get_transaction(USER, &id).unwrap().exclude_from_report);

    run(&ledger, &["edit", id.as_str(), "--desc", "still hidden"]).unwrap();
    assert!(ledger.get_transaction(USER, &id).unwrap().exclude_from_report);

    run(&ledger, &["edit", id.as_str(), "--include-in-report"]).unwrap();
    assert!(!ledger.get_transaction(USER, &id).unwrap().exclude_from_report);

    run(&ledger, &["edit", id.as_str(), "--exclude-from-report"]).unwrap();
    assert!(ledger.get_transaction(USER, &id).unwrap().exclude_from_report);
}
