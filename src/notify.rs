// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Change notifications for views that cache ledger data.
//!
//! A `Change` only names the collection that was mutated. Subscribers are
//! expected to re-read current state instead of trusting a payload.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Categories,
    Wallets,
    Transactions,
    Debts,
    Events,
    Settings,
    Profile,
}

#[derive(Debug, Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<Sender<Change>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Change> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    /// Fire-and-forget; subscribers whose receiver was dropped are pruned.
    pub fn publish(&self, change: Change) {
        self.lock().retain(|tx| tx.send(change).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Change>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_each_change() {
        let bus = ChangeBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(Change::Wallets);
        bus.publish(Change::Transactions);
        assert_eq!(a.try_iter().collect::<Vec<_>>(), vec![Change::Wallets, Change::Transactions]);
        assert_eq!(b.try_recv().unwrap(), Change::Wallets);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let bus = ChangeBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        bus.publish(Change::Events);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), Change::Events);
    }
}
