// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use expensewise::db;
use expensewise::error::{LedgerError, LedgerResult};
use expensewise::fx::{RateSource, RateTable};
use expensewise::ledger::{Ledger, TransactionFilter};
use expensewise::models::{EntryType, EventStatus, NewCategory, NewTransaction};
use expensewise::notify::Change;
use rust_decimal::Decimal;

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
}

fn tagged(ledger: &Ledger, event_id: Option<String>) -> String {
    let cat = ledger
        .resolve_category(USER, "Fun")
        .or_else(|_| {
            ledger.create_category(
                USER,
                NewCategory {
                    name: "Fun".into(),
                    r#type: EntryType::Expense,
                    parent_id: None,
                    icon: None,
                },
            )
        })
        .unwrap();
    ledger
        .add_transaction(
            USER,
            NewTransaction {
                date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
                amount: Decimal::from(80),
                r#type: EntryType::Expense,
                category_id: cat.id,
                wallet_id: ledger.main_wallet(USER).unwrap().id,
                description: None,
                entry_currency: None,
                event_id,
                exclude_from_report: false,
            },
            &[],
        )
        .unwrap()
        .transaction
        .id
}

#[test]
fn deleting_event_clears_references_only() {
    let ledger = setup();
    let trip = ledger.create_event(USER, "Lisbon trip", "✈️").unwrap();
    let a = tagged(&ledger, Some(trip.id.clone()));
    let b = tagged(&ledger, Some(trip.id.clone()));
    let c = tagged(&ledger, None);

    let filter = TransactionFilter {
        event_id: Some(trip.id.clone()),
        ..Default::default()
    };
    assert_eq!(ledger.list_transactions(USER, &filter).unwrap().len(), 2);

    let rx = ledger.subscribe();
    assert_eq!(ledger.delete_event(USER, &trip.id).unwrap(), 2);
    let seen: Vec<Change> = rx.try_iter().collect();
    assert_eq!(seen, vec![Change::Events, Change::Transactions]);

    for id in [a, b, c] {
        assert_eq!(ledger.get_transaction(USER, &id).unwrap().event_id, None);
    }
    assert!(ledger.get_event(USER, &trip.id).unwrap_err().is_not_found());
}

#[test]
fn unknown_event_reference_is_rejected() {
    let ledger = setup();
    let cat = ledger
        .create_category(
            USER,
            NewCategory {
                name: "Fun".into(),
                r#type: EntryType::Expense,
                parent_id: None,
                icon: None,
            },
        )
        .unwrap();
    let err = ledger
        .add_transaction(
            USER,
            NewTransaction {
                date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
                amount: Decimal::from(1),
                r#type: EntryType::Expense,
                category_id: cat.id,
                wallet_id: ledger.main_wallet(USER).unwrap().id,
                description: None,
                entry_currency: None,
                event_id: Some("ghost".into()),
                exclude_from_report: false,
            },
            &[],
        )
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn status_toggles() {
    let ledger = setup();
    let e = ledger.create_event(USER, "Wedding", "💍").unwrap();
    assert_eq!(e.status, EventStatus::Active);
    let e = ledger.set_event_status(USER, &e.id, EventStatus::Inactive).unwrap();
    assert_eq!(ledger.get_event(USER, &e.id).unwrap().status, EventStatus::Inactive);
    let e = ledger.update_event(USER, &e.id, Some("Our wedding"), None).unwrap();
    assert_eq!(e.icon, "💍");
    assert_eq!(e.name, "Our wedding");
}
