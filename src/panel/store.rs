//! Location Store
//!
//! Authoritative set of part-location records for one mounted panel, keyed by
//! `order_code`. One current location per order: newer records supersede older
//! ones instead of accumulating.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LocationRecord;

/// What to do with a pushed record whose `updated_at` is strictly older than
/// the stored record for the same order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Skip the update; the displayed location never regresses.
    #[default]
    Reject,
    /// Apply the update regardless of timestamps.
    LastWriteWins,
}

/// Result of an applied upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// The order was not tracked before.
    Inserted,
    /// An existing record was superseded.
    Replaced { previous_location: String },
    /// The incoming record was identical to the stored one.
    Unchanged,
}

/// An upsert that lost the timestamp comparison under [`StalePolicy::Reject`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stale update for '{order_code}': incoming {incoming} is older than stored {stored}")]
pub struct StaleUpdate {
    pub order_code: String,
    pub incoming: DateTime<Utc>,
    pub stored: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    records: HashMap<String, LocationRecord>,
    policy: StalePolicy,
}

impl LocationStore {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            records: HashMap::new(),
            policy,
        }
    }

    pub const fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Snapshot refresh: clear, then insert in sequence order. Later entries
    /// with the same `order_code` win regardless of their timestamps.
    pub fn replace_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = LocationRecord>,
    {
        self.records.clear();
        for record in records {
            self.records.insert(record.order_code.clone(), record);
        }
    }

    /// Incremental insert-or-update keyed by `order_code`.
    ///
    /// Equal timestamps let the incoming record win. A strictly older record
    /// is refused under [`StalePolicy::Reject`] and the store is left untouched.
    pub fn upsert(&mut self, record: LocationRecord) -> Result<UpsertOutcome, StaleUpdate> {
        if self.policy == StalePolicy::Reject {
            if let Some(stored) = self.records.get(&record.order_code) {
                if record.updated_at < stored.updated_at {
                    return Err(StaleUpdate {
                        order_code: record.order_code,
                        incoming: record.updated_at,
                        stored: stored.updated_at,
                    });
                }
            }
        }
        Ok(self.force_upsert(record))
    }

    /// Insert-or-update without the timestamp comparison. For records whose
    /// source is authoritative regardless of what is stored (server-stamped scans).
    pub fn force_upsert(&mut self, record: LocationRecord) -> UpsertOutcome {
        match self.records.entry(record.order_code.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                UpsertOutcome::Inserted
            }
            Entry::Occupied(slot) if *slot.get() == record => UpsertOutcome::Unchanged,
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(record);
                UpsertOutcome::Replaced {
                    previous_location: previous.location_code,
                }
            }
        }
    }

    /// Records ordered most recently updated first, ties by `order_code` ascending.
    pub fn current_view(&self) -> Vec<&LocationRecord> {
        let mut view: Vec<&LocationRecord> = self.records.values().collect();
        view.sort_by(|a, b| {
            Reverse(a.updated_at)
                .cmp(&Reverse(b.updated_at))
                .then_with(|| a.order_code.cmp(&b.order_code))
        });
        view
    }

    /// Number of distinct orders held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, order_code: &str) -> Option<&LocationRecord> {
        self.records.get(order_code)
    }

    pub fn contains(&self, order_code: &str) -> bool {
        self.records.contains_key(order_code)
    }
}
