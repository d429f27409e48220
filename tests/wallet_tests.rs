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
use expensewise::models::{EntryType, NewCategory, NewTransaction, NewWallet};
use expensewise::notify::Change;
use expensewise::{cli, commands::wallets};
use rust_decimal::Decimal;

const USER: &str = "dev-user";

struct NoRates;

impl RateSource for NoRates {
    fn latest(&self, _api_key: &str, _base: &str) -> LedgerResult<RateTable> {
        Err(LedgerError::ExternalService("offline".into()))
    }
}

fn setup() -> (Ledger, String) {
    let ledger = Ledger::new(db::open_in_memory().unwrap(), Box::new(NoRates));
    ledger.ensure_user(USER, None, None).unwrap();
    let category = ledger
        .create_category(
            USER,
            NewCategory {
                name: "General".into(),
                r#type: EntryType::Expense,
                parent_id: None,
                icon: None,
            },
        )
        .unwrap();
    (ledger, category.id)
}

fn wallet(ledger: &Ledger, name: &str, initial: i64) -> String {
    ledger
        .create_wallet(
            USER,
            NewWallet {
                name: name.into(),
                icon: None,
                currency: "USD".into(),
                initial_balance: Decimal::from(initial),
            },
        )
        .unwrap()
        .id
}

fn book(ledger: &Ledger, wallet_id: &str, category_id: &str, kind: EntryType, amount: i64) {
    ledger
        .add_transaction(
            USER,
            NewTransaction {
                date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                amount: Decimal::from(amount),
                r#type: kind,
                category_id: category_id.into(),
                wallet_id: wallet_id.into(),
                description: None,
                entry_currency: None,
                event_id: None,
                exclude_from_report: false,
            },
            &[],
        )
        .unwrap();
}

#[test]
fn balance_folds_initial_income_and_expense() {
    let (ledger, cat) = setup();
    let w = wallet(&ledger, "Cash", 100);
    book(&ledger, &w, &cat, EntryType::Income, 50);
    book(&ledger, &w, &cat, EntryType::Expense, 30);

    assert_eq!(ledger.balance_of(USER, &w).unwrap(), Decimal::from(120));
    let main = ledger.main_wallet(USER).unwrap();
    assert_eq!(ledger.balance_of(USER, &main.id).unwrap(), Decimal::ZERO);
}

#[test]
fn main_wallet_cannot_be_deleted() {
    let (ledger, _) = setup();
    let main = ledger.main_wallet(USER).unwrap();
    let err = ledger.delete_wallet(USER, &main.id).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(ledger.list_wallets(USER).unwrap().len(), 1);
}

#[test]
fn main_wallet_with_transactions_is_still_a_validation_error() {
    let (ledger, cat) = setup();
    let main = ledger.main_wallet(USER).unwrap();
    book(&ledger, &main.id, &cat, EntryType::Expense, 15);
    let err = ledger.delete_wallet(USER, &main.id).unwrap_err();
    assert!(err.is_validation());
    assert!(!err.is_conflict());
    assert_eq!(ledger.main_wallet(USER).unwrap().id, main.id);
}

#[test]
fn wallet_with_transactions_cannot_be_deleted() {
    let (ledger, cat) = setup();
    let w = wallet(&ledger, "Cash", 0);
    book(&ledger, &w, &cat, EntryType::Expense, 5);
    assert!(ledger.delete_wallet(USER, &w).unwrap_err().is_conflict());
    assert!(ledger.get_wallet(USER, &w).is_ok());
}

#[test]
fn deleting_default_wallet_clears_setting() {
    let (ledger, _) = setup();
    let w = wallet(&ledger, "Savings", 0);
    ledger.set_default_wallet(USER, &w).unwrap();
    assert_eq!(ledger.default_wallet(USER).unwrap().as_deref(), Some(w.as_str()));

    ledger.delete_wallet(USER, &w).unwrap();
    assert_eq!(ledger.default_wallet(USER).unwrap(), None);
    assert!(ledger.get_wallet(USER, &w).unwrap_err().is_not_found());
}

#[test]
fn duplicate_names_conflict() {
    let (ledger, _) = setup();
    wallet(&ledger, "Cash", 0);
    let err = ledger
        .create_wallet(
            USER,
            NewWallet {
                name: " cash ".into(),
                icon: None,
                currency: "USD".into(),
                initial_balance: Decimal::ZERO,
            },
        )
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn main_wallet_lists_first() {
    let (ledger, _) = setup();
    wallet(&ledger, "Alpha", 0);
    let names: Vec<String> = ledger
        .list_wallets(USER)
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["Main Wallet", "Alpha"]);
}

#[test]
fn mutations_notify_subscribers() {
    let (ledger, _) = setup();
    let rx = ledger.subscribe();
    let w = wallet(&ledger, "Cash", 0);
    ledger.set_default_wallet(USER, &w).unwrap();

    let seen: Vec<Change> = rx.try_iter().collect();
    assert_eq!(seen, vec![Change::Wallets, Change::Settings]);
}

#[test]
fn cli_lists_balances_as_json() {
    let (ledger, cat) = setup();
    let w = wallet(&ledger, "Cash", 10);
    book(&ledger, &w, &cat, EntryType::Expense, 4);

    let matches = cli::build_cli().get_matches_from(["expensewise", "wallet", "list", "--json"]);
    if let Some(("wallet", wallet_m)) = matches.subcommand() {
        wallets::handle(&ledger, USER, wallet_m).unwrap();
    } else {
        panic!("no wallet subcommand");
    }

    let rows = wallets::rows(&ledger, USER).unwrap();
    let cash = rows.iter().find(|r| r.name == "Cash").unwrap();
    assert_eq!(cash.balance, "USD 6.00");
}
