// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Debts and their payments.
//!
//! Status is never set directly: it follows from the sum of payments against
//! the owed amount (`unpaid` → `partial` → `paid`) and is recomputed after
//! every payment or edit.

use chrono::{NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::Ledger;
use crate::db::{decimal_column, json_column, text_column};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Debt, DebtStatus, DebtUpdate, NewDebt, Payment};
use crate::notify::Change;
use crate::utils::{new_id, normalize_currency, require_name, require_positive};

const COLUMNS: &str = "id, user_id, type, person, amount, currency, due_date, status, note, payments";

fn debt_from_row(r: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: r.get(0)?,
        user_id: r.get(1)?,
        r#type: text_column(r, 2)?,
        person: r.get(3)?,
        amount: decimal_column(r, 4)?,
        currency: r.get(5)?,
        due_date: r.get(6)?,
        status: text_column(r, 7)?,
        note: r.get(8)?,
        payments: json_column(r, 9)?,
    })
}

impl Ledger {
    /// Soonest due first.
    pub fn list_debts(&self, user_id: &str) -> LedgerResult<Vec<Debt>> {
        let sql = format!("SELECT {COLUMNS} FROM debts WHERE user_id=?1 ORDER BY due_date ASC, person ASC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], debt_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_debt(&self, user_id: &str, id: &str) -> LedgerResult<Debt> {
        let sql = format!("SELECT {COLUMNS} FROM debts WHERE user_id=?1 AND id=?2");
        self.conn()
            .query_row(&sql, params![user_id, id], debt_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Debt", id))
    }

    fn save_debt(&self, debt: &Debt) -> LedgerResult<()> {
        self.conn().execute(
            "UPDATE debts SET type=?1, person=?2, amount=?3, due_date=?4, status=?5, note=?6, payments=?7
             WHERE id=?8 AND user_id=?9",
            params![
                debt.r#type.as_str(),
                debt.person,
                debt.amount.to_string(),
                debt.due_date,
                debt.status.as_str(),
                debt.note,
                serde_json::to_string(&debt.payments)?,
                debt.id,
                debt.user_id
            ],
        )?;
        Ok(())
    }

    pub fn create_debt(&self, user_id: &str, new: NewDebt) -> LedgerResult<Debt> {
        let debt = Debt {
            id: new_id(),
            user_id: user_id.to_string(),
            r#type: new.r#type,
            person: require_name(&new.person, "Person")?,
            amount: require_positive(new.amount, "Debt amount")?,
            currency: normalize_currency(&new.currency)?,
            due_date: new.due_date,
            status: DebtStatus::Unpaid,
            note: new.note,
            payments: Vec::new(),
        };
        self.conn().execute(
            "INSERT INTO debts(id, user_id, type, person, amount, currency, due_date, status, note, payments)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,'[]')",
            params![
                debt.id,
                debt.user_id,
                debt.r#type.as_str(),
                debt.person,
                debt.amount.to_string(),
                debt.currency,
                debt.due_date,
                debt.status.as_str(),
                debt.note
            ],
        )?;
        tracing::info!(user_id, person = %debt.person, amount = %debt.amount, "debt created");
        self.notify(Change::Debts);
        Ok(debt)
    }

    /// Manual edit. Changing the amount can move the status either way.
    pub fn update_debt(&self, user_id: &str, id: &str, update: DebtUpdate) -> LedgerResult<Debt> {
        let mut debt = self.get_debt(user_id, id)?;
        if let Some(kind) = update.r#type {
            debt.r#type = kind;
        }
        if let Some(person) = update.person {
            debt.person = require_name(&person, "Person")?;
        }
        if let Some(amount) = update.amount {
            debt.amount = require_positive(amount, "Debt amount")?;
        }
        if let Some(due) = update.due_date {
            debt.due_date = due;
        }
        if let Some(note) = update.note {
            debt.note = Some(note);
        }
        debt.status = debt.derived_status();
        self.save_debt(&debt)?;
        self.notify(Change::Debts);
        Ok(debt)
    }

    pub fn delete_debt(&self, user_id: &str, id: &str) -> LedgerResult<()> {
        let n = self.conn().execute(
            "DELETE FROM debts WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(LedgerError::not_found("Debt", id));
        }
        self.notify(Change::Debts);
        Ok(())
    }

    /// Append a payment (dated today unless given) and recompute the status.
    pub fn add_payment(
        &self,
        user_id: &str,
        debt_id: &str,
        amount: Decimal,
        date: Option<NaiveDate>,
    ) -> LedgerResult<Debt> {
        let amount = require_positive(amount, "Payment amount")?;
        let mut debt = self.get_debt(user_id, debt_id)?;
        debt.payments.push(Payment {
            id: new_id(),
            date: date.unwrap_or_else(|| Utc::now().date_naive()),
            amount,
        });
        let before = debt.status;
        debt.status = debt.derived_status();
        self.save_debt(&debt)?;
        tracing::info!(
            user_id,
            debt = %debt.id,
            paid = %debt.total_paid(),
            from = %before,
            to = %debt.status,
            "payment recorded"
        );
        self.notify(Change::Debts);
        Ok(debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::fx::{RateSource, RateTable};
    use crate::models::DebtKind;

    struct NoRates;

    impl RateSource for NoRates {
        fn latest(&self, _api_key: &str, _base: &str) -> LedgerResult<RateTable> {
            Err(LedgerError::ExternalService("offline".into()))
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(db::open_in_memory().unwrap(), Box::new(NoRates))
    }

    fn new_debt(amount: i64) -> NewDebt {
        NewDebt {
            r#type: DebtKind::Payable,
            person: "Alice".into(),
            amount: Decimal::from(amount),
            currency: "usd".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            note: None,
        }
    }

    #[test]
    fn lowering_amount_below_payments_marks_paid() {
        let l = ledger();
        let d = l.create_debt("u", new_debt(100)).unwrap();
        assert_eq!(d.currency, "USD");
        l.add_payment("u", &d.id, Decimal::from(50), None).unwrap();
        let edited = l
            .update_debt(
                "u",
                &d.id,
                DebtUpdate {
                    amount: Some(Decimal::from(50)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.status, DebtStatus::Paid);
    }

    #[test]
    fn rejects_non_positive_payment() {
        let l = ledger();
        let d = l.create_debt("u", new_debt(100)).unwrap();
        let err = l.add_payment("u", &d.id, Decimal::ZERO, None).unwrap_err();
        assert!(err.is_validation());
        assert!(l.get_debt("u", &d.id).unwrap().payments.is_empty());
    }
}
