// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Domain services.
//!
//! Every operation takes the owning user id explicitly; there is no ambient
//! session. Each submodule adds an `impl Ledger` block for one entity.

use std::sync::mpsc::Receiver;

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::error::{LedgerError, LedgerResult};
use crate::fx::{ApiKeyCheck, ExchangeRateApi, RateSource, verify_api_key};
use crate::notify::{Change, ChangeBus};

pub mod attachments;
pub mod categories;
pub mod conversion;
pub mod debts;
pub mod events;
pub mod integrity;
pub mod settings;
pub mod transactions;
pub mod users;
pub mod wallets;

pub use attachments::{AttachmentStore, PendingAttachment};
pub use categories::{CategoryNode, MAX_DEPTH, category_depth, descendant_ids};
pub use conversion::{Converted, RebalanceSummary};
pub use integrity::Issue;
pub use transactions::{Recorded, TransactionFilter};
pub use wallets::wallet_balance;

pub struct Ledger {
    conn: Connection,
    rates: Box<dyn RateSource>,
    bus: ChangeBus,
    attachments: Option<AttachmentStore>,
}

impl Ledger {
    pub fn new(conn: Connection, rates: Box<dyn RateSource>) -> Self {
        Self {
            conn,
            rates,
            bus: ChangeBus::new(),
            attachments: None,
        }
    }

    /// Opens the on-disk ledger described by `config`, wired to the live
    /// exchange-rate API and the attachment directory.
    pub fn open(config: &AppConfig) -> LedgerResult<Self> {
        let conn = db::open_at(&config.db_path()?)?;
        let rates = ExchangeRateApi::new(config.exchange_rate_url.clone())?;
        let store = AttachmentStore::new(config.attachments_dir()?);
        Ok(Self::new(conn, Box::new(rates)).with_attachments(store))
    }

    pub fn with_attachments(mut self, store: AttachmentStore) -> Self {
        self.attachments = Some(store);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn subscribe(&self) -> Receiver<Change> {
        self.bus.subscribe()
    }

    pub fn verify_api_key(&self, api_key: &str) -> ApiKeyCheck {
        verify_api_key(self.rates.as_ref(), api_key)
    }

    pub(crate) fn notify(&self, change: Change) {
        self.bus.publish(change);
    }

    pub(crate) fn rates(&self) -> &dyn RateSource {
        self.rates.as_ref()
    }

    pub(crate) fn attachment_store(&self) -> LedgerResult<&AttachmentStore> {
        self.attachments
            .as_ref()
            .ok_or_else(|| LedgerError::Config("attachment storage is not configured".into()))
    }

    pub(crate) fn has_attachment_store(&self) -> bool {
        self.attachments.is_some()
    }
}
