// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, Row, params};

use super::Ledger;
use crate::db::text_column;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Event, EventStatus};
use crate::notify::Change;
use crate::utils::{new_id, require_name};

const COLUMNS: &str = "id, user_id, name, icon, status";

fn event_from_row(r: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        icon: r.get(3)?,
        status: text_column(r, 4)?,
    })
}

impl Ledger {
    pub fn list_events(&self, user_id: &str) -> LedgerResult<Vec<Event>> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE user_id=?1 ORDER BY status ASC, name ASC");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], event_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_event(&self, user_id: &str, id: &str) -> LedgerResult<Event> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE user_id=?1 AND id=?2");
        self.conn()
            .query_row(&sql, params![user_id, id], event_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Event", id))
    }

    pub fn create_event(&self, user_id: &str, name: &str, icon: &str) -> LedgerResult<Event> {
        let event = Event {
            id: new_id(),
            user_id: user_id.to_string(),
            name: require_name(name, "Event name")?,
            icon: icon.trim().to_string(),
            status: EventStatus::Active,
        };
        self.conn().execute(
            "INSERT INTO events(id, user_id, name, icon, status) VALUES (?1,?2,?3,?4,?5)",
            params![event.id, event.user_id, event.name, event.icon, event.status.as_str()],
        )?;
        self.notify(Change::Events);
        Ok(event)
    }

    pub fn update_event(
        &self,
        user_id: &str,
        id: &str,
        name: Option<&str>,
        icon: Option<&str>,
    ) -> LedgerResult<Event> {
        let mut event = self.get_event(user_id, id)?;
        if let Some(name) = name {
            event.name = require_name(name, "Event name")?;
        }
        if let Some(icon) = icon {
            event.icon = icon.trim().to_string();
        }
        self.conn().execute(
            "UPDATE events SET name=?1, icon=?2 WHERE id=?3 AND user_id=?4",
            params![event.name, event.icon, id, user_id],
        )?;
        self.notify(Change::Events);
        Ok(event)
    }

    pub fn set_event_status(&self, user_id: &str, id: &str, status: EventStatus) -> LedgerResult<Event> {
        let mut event = self.get_event(user_id, id)?;
        event.status = status;
        self.conn().execute(
            "UPDATE events SET status=?1 WHERE id=?2 AND user_id=?3",
            params![status.as_str(), id, user_id],
        )?;
        self.notify(Change::Events);
        Ok(event)
    }

    /// Transactions tagged with the event keep existing; their reference is
    /// cleared. Returns how many were untagged.
    pub fn delete_event(&self, user_id: &str, id: &str) -> LedgerResult<usize> {
        let event = self.get_event(user_id, id)?;
        let tx = self.conn().unchecked_transaction()?;
        let untagged = tx.execute(
            "UPDATE transactions SET event_id=NULL WHERE user_id=?1 AND event_id=?2",
            params![user_id, id],
        )?;
        tx.execute(
            "DELETE FROM events WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        tx.commit()?;

        tracing::info!(user_id, event = %event.name, untagged, "event deleted");
        self.notify(Change::Events);
        if untagged > 0 {
            self.notify(Change::Transactions);
        }
        Ok(untagged)
    }
}
