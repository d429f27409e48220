// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::Ledger;
use super::attachments::PendingAttachment;
use super::conversion::scale;
use crate::db::{decimal_column, json_column, text_column};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Attachment, NewTransaction, Transaction, TransactionView};
use crate::notify::Change;
use crate::utils::{new_id, normalize_currency, require_positive};

const COLUMNS: &str = "t.id, t.user_id, t.date, t.amount, t.type, t.category_id, t.wallet_id, \
     t.description, t.currency, t.attachments, t.event_id, t.exclude_from_report";

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        date: r.get(2)?,
        amount: decimal_column(r, 3)?,
        r#type: text_column(r, 4)?,
        category_id: r.get(5)?,
        wallet_id: r.get(6)?,
        description: r.get(7)?,
        currency: r.get(8)?,
        attachments: json_column(r, 9)?,
        event_id: r.get(10)?,
        exclude_from_report: r.get::<_, i64>(11)? != 0,
    })
}

fn insert_transaction(conn: &Connection, t: &Transaction) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO transactions(id, user_id, date, amount, type, category_id, wallet_id,
            description, currency, attachments, event_id, exclude_from_report)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        params![
            t.id,
            t.user_id,
            t.date,
            t.amount.to_string(),
            t.r#type.as_str(),
            t.category_id,
            t.wallet_id,
            t.description,
            t.currency,
            serde_json::to_string(&t.attachments)?,
            t.event_id,
            t.exclude_from_report as i64
        ],
    )?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub wallet_id: Option<String>,
    pub category_id: Option<String>,
    pub event_id: Option<String>,
    /// Skip rows flagged `exclude_from_report`
    pub reportable_only: bool,
    pub limit: Option<usize>,
}

/// A saved transaction plus the conversion warning, if the entry currency
/// could not be converted and the original amount was kept.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub transaction: Transaction,
    pub warning: Option<String>,
}

impl Ledger {
    pub(crate) fn all_transactions(&self, user_id: &str) -> LedgerResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM transactions t WHERE t.user_id=?1 ORDER BY t.date DESC, t.rowid DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], transaction_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn transactions_for_wallet(
        &self,
        user_id: &str,
        wallet_id: &str,
    ) -> LedgerResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM transactions t WHERE t.user_id=?1 AND t.wallet_id=?2
             ORDER BY t.date DESC, t.rowid DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, wallet_id], transaction_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_transaction(&self, user_id: &str, id: &str) -> LedgerResult<Transaction> {
        let sql = format!("SELECT {COLUMNS} FROM transactions t WHERE t.user_id=?1 AND t.id=?2");
        self.conn()
            .query_row(&sql, params![user_id, id], transaction_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Transaction", id))
    }

    /// Newest first, with category/wallet/event names resolved at read time.
    pub fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<TransactionView>> {
        let mut sql = format!(
            "SELECT {COLUMNS}, c.name, w.name, e.name FROM transactions t
             LEFT JOIN categories c ON c.id=t.category_id
             LEFT JOIN wallets w ON w.id=t.wallet_id
             LEFT JOIN events e ON e.id=t.event_id
             WHERE t.user_id=?"
        );
        let mut params_vec: Vec<String> = vec![user_id.to_string()];

        if let Some(wallet) = &filter.wallet_id {
            sql.push_str(" AND t.wallet_id=?");
            params_vec.push(wallet.clone());
        }
        if let Some(category) = &filter.category_id {
            sql.push_str(" AND t.category_id=?");
            params_vec.push(category.clone());
        }
        if let Some(event) = &filter.event_id {
            sql.push_str(" AND t.event_id=?");
            params_vec.push(event.clone());
        }
        if filter.reportable_only {
            sql.push_str(" AND t.exclude_from_report=0");
        }
        sql.push_str(" ORDER BY t.date DESC, t.rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
            Ok(TransactionView {
                transaction: transaction_from_row(r)?,
                category: r.get(12)?,
                wallet: r.get(13)?,
                event: r.get(14)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn check_references(&self, user_id: &str, new: &NewTransaction) -> LedgerResult<()> {
        require_positive(new.amount, "Transaction amount")?;
        self.get_category(user_id, &new.category_id)?;
        self.get_wallet(user_id, &new.wallet_id)?;
        if let Some(event) = new.event_id.as_deref() {
            self.get_event(user_id, event)?;
        }
        Ok(())
    }

    fn store_attachments(
        &self,
        transaction_id: &str,
        files: &[PendingAttachment],
    ) -> LedgerResult<Vec<Attachment>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.attachment_store()?;
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            match store.save(transaction_id, file) {
                Ok(a) => saved.push(a),
                Err(e) => {
                    store.discard(&saved);
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    fn discard_attachments(&self, attachments: &[Attachment]) {
        if let Ok(store) = self.attachment_store() {
            store.discard(attachments);
        }
    }

    /// Record a transaction. The amount is converted from the entry currency
    /// to the user's default currency; when the rate lookup fails the amount is
    /// stored unconverted and `Recorded::warning` says so.
    pub fn add_transaction(
        &self,
        user_id: &str,
        new: NewTransaction,
        files: &[PendingAttachment],
    ) -> LedgerResult<Recorded> {
        self.check_references(user_id, &new)?;
        let default_ccy = self.default_currency(user_id)?;
        let entry_ccy = match new.entry_currency.as_deref() {
            Some(c) => normalize_currency(c)?,
            None => default_ccy.clone(),
        };
        let converted = self.convert_or_keep(user_id, new.amount, &entry_ccy, &default_ccy);

        let id = new_id();
        let attachments = self.store_attachments(&id, files)?;
        let transaction = Transaction {
            id,
            user_id: user_id.to_string(),
            date: new.date,
            amount: converted.amount,
            r#type: new.r#type,
            category_id: new.category_id,
            wallet_id: new.wallet_id,
            description: new.description,
            currency: converted.currency,
            attachments,
            event_id: new.event_id,
            exclude_from_report: new.exclude_from_report,
        };
        if let Err(e) = insert_transaction(self.conn(), &transaction) {
            self.discard_attachments(&transaction.attachments);
            return Err(e);
        }

        tracing::info!(user_id, id = %transaction.id, amount = %transaction.amount, "transaction recorded");
        self.notify(Change::Transactions);
        Ok(Recorded {
            transaction,
            warning: converted.warning,
        })
    }

    /// Insert many transactions at once. Conversion is strict here: a failed
    /// rate lookup aborts the whole batch and nothing is written.
    pub fn add_transactions(
        &self,
        user_id: &str,
        batch: Vec<NewTransaction>,
    ) -> LedgerResult<Vec<Transaction>> {
        let default_ccy = self.default_currency(user_id)?;
        let mut rates: HashMap<String, Decimal> = HashMap::new();
        let mut prepared = Vec::with_capacity(batch.len());

        for new in batch {
            self.check_references(user_id, &new)?;
            let entry_ccy = match new.entry_currency.as_deref() {
                Some(c) => normalize_currency(c)?,
                None => default_ccy.clone(),
            };
            let rate = match rates.get(&entry_ccy) {
                Some(r) => *r,
                None => {
                    let r = self.exchange_rate(user_id, &entry_ccy, &default_ccy)?;
                    rates.insert(entry_ccy.clone(), r);
                    r
                }
            };
            prepared.push(Transaction {
                id: new_id(),
                user_id: user_id.to_string(),
                date: new.date,
                amount: scale(new.amount, rate)?,
                r#type: new.r#type,
                category_id: new.category_id,
                wallet_id: new.wallet_id,
                description: new.description,
                currency: default_ccy.clone(),
                attachments: Vec::new(),
                event_id: new.event_id,
                exclude_from_report: new.exclude_from_report,
            });
        }

        let tx = self.conn().unchecked_transaction()?;
        for t in &prepared {
            insert_transaction(&tx, t)?;
        }
        tx.commit()?;

        tracing::info!(user_id, count = prepared.len(), "transactions imported");
        self.notify(Change::Transactions);
        Ok(prepared)
    }

    /// Replace the editable fields of a transaction. Existing attachments are
    /// kept and `files` are appended.
    pub fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        edit: NewTransaction,
        files: &[PendingAttachment],
    ) -> LedgerResult<Recorded> {
        let existing = self.get_transaction(user_id, id)?;
        self.check_references(user_id, &edit)?;
        let default_ccy = self.default_currency(user_id)?;
        let entry_ccy = match edit.entry_currency.as_deref() {
            Some(c) => normalize_currency(c)?,
            None => existing.currency.clone(),
        };
        let converted = self.convert_or_keep(user_id, edit.amount, &entry_ccy, &default_ccy);

        let added = self.store_attachments(id, files)?;
        let mut attachments = existing.attachments;
        attachments.extend(added.iter().cloned());

        let transaction = Transaction {
            id: id.to_string(),
            user_id: user_id.to_string(),
            date: edit.date,
            amount: converted.amount,
            r#type: edit.r#type,
            category_id: edit.category_id,
            wallet_id: edit.wallet_id,
            description: edit.description,
            currency: converted.currency,
            attachments,
            event_id: edit.event_id,
            exclude_from_report: edit.exclude_from_report,
        };
        let result = self.conn().execute(
            "UPDATE transactions SET date=?1, amount=?2, type=?3, category_id=?4, wallet_id=?5,
                description=?6, currency=?7, attachments=?8, event_id=?9, exclude_from_report=?10
             WHERE id=?11 AND user_id=?12",
            params![
                transaction.date,
                transaction.amount.to_string(),
                transaction.r#type.as_str(),
                transaction.category_id,
                transaction.wallet_id,
                transaction.description,
                transaction.currency,
                serde_json::to_string(&transaction.attachments)?,
                transaction.event_id,
                transaction.exclude_from_report as i64,
                id,
                user_id
            ],
        );
        if let Err(e) = result {
            self.discard_attachments(&added);
            return Err(e.into());
        }

        self.notify(Change::Transactions);
        Ok(Recorded {
            transaction,
            warning: converted.warning,
        })
    }

    pub fn delete_transaction(&self, user_id: &str, id: &str) -> LedgerResult<()> {
        let existing = self.get_transaction(user_id, id)?;
        self.conn().execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        self.discard_attachments(&existing.attachments);
        self.notify(Change::Transactions);
        Ok(())
    }

    pub fn delete_all_transactions(&self, user_id: &str) -> LedgerResult<usize> {
        let existing = self.all_transactions(user_id)?;
        let removed = self.conn().execute(
            "DELETE FROM transactions WHERE user_id=?1",
            params![user_id],
        )?;
        if self.has_attachment_store() {
            for t in &existing {
                self.discard_attachments(&t.attachments);
            }
        }
        tracing::info!(user_id, removed, "all transactions deleted");
        self.notify(Change::Transactions);
        Ok(removed)
    }
}
