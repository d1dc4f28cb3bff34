//! Keyed store of delivered fulfillment results.
//!
//! Events are buffered here whether or not a session is waiting yet, so a
//! fulfillment landing between submission and the first poll is not lost.
//!
//! Each id moves through `vacant → recorded → closed` or `vacant → closed`.
//! The first recorded result wins; later events for the same id, and any
//! event for a closed id, are dropped.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::fulfillment::types::{FulfillmentResult, RequestId};

#[derive(Debug, Clone)]
enum Slot {
    Recorded(FulfillmentResult),
    Closed,
}

/// Result of offering an event to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First result for this id; stored.
    Recorded,
    /// A result is already stored for this id; dropped.
    Duplicate,
    /// The session for this id has ended; dropped.
    Late,
}

/// Pending results keyed by request id, shared between the event listener and
/// rendezvous sessions.
#[derive(Debug, Clone, Default)]
pub struct PendingStore {
    slots: Arc<DashMap<RequestId, Slot>>,
}

impl PendingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivered result.
    pub fn record(&self, result: FulfillmentResult) -> RecordOutcome {
        let request_id = result.request_id;
        let outcome = match self.slots.entry(request_id) {
            Entry::Vacant(entry) => {
                entry.insert(Slot::Recorded(result));
                RecordOutcome::Recorded
            }
            Entry::Occupied(entry) => match entry.get() {
                Slot::Recorded(_) => RecordOutcome::Duplicate,
                Slot::Closed => RecordOutcome::Late,
            },
        };

        match outcome {
            RecordOutcome::Recorded => {
                tracing::debug!(request_id = %request_id, "Fulfillment recorded");
            }
            RecordOutcome::Duplicate => {
                tracing::warn!(request_id = %request_id, "Duplicate fulfillment event ignored");
            }
            RecordOutcome::Late => {
                tracing::warn!(request_id = %request_id, "Fulfillment arrived after session ended");
            }
        }
        outcome
    }

    /// Remove and return the result for `id`, closing the id.
    ///
    /// Returns `None` and leaves the slot untouched when nothing is recorded.
    pub fn take(&self, id: &RequestId) -> Option<FulfillmentResult> {
        match self.slots.entry(*id) {
            Entry::Occupied(mut entry) => {
                if !matches!(entry.get(), Slot::Recorded(_)) {
                    return None;
                }
                match entry.insert(Slot::Closed) {
                    Slot::Recorded(result) => Some(result),
                    Slot::Closed => None,
                }
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Like [`take`](Self::take), but closes the id even when nothing is recorded.
    pub fn take_or_close(&self, id: &RequestId) -> Option<FulfillmentResult> {
        match self.slots.insert(*id, Slot::Closed) {
            Some(Slot::Recorded(result)) => Some(result),
            _ => None,
        }
    }

    /// Whether the session for `id` has ended.
    pub fn is_closed(&self, id: &RequestId) -> bool {
        matches!(self.slots.get(id).as_deref(), Some(Slot::Closed))
    }

    /// Number of results recorded but not yet taken.
    pub fn pending_len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Recorded(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::types::FulfillmentOutcome;
    use alloy::primitives::{Bytes, B256};

    fn result(byte: u8, outcome: FulfillmentOutcome) -> FulfillmentResult {
        FulfillmentResult::new(RequestId(B256::repeat_byte(byte)), outcome)
    }

    #[test]
    fn test_first_write_wins() {
        let store = PendingStore::new();
        let first = result(1, FulfillmentOutcome::Response(Bytes::from(vec![1])));
        let second = result(1, FulfillmentOutcome::UserCallbackError("out of gas".into()));

        assert_eq!(store.record(first.clone()), RecordOutcome::Recorded);
        assert_eq!(store.record(second), RecordOutcome::Duplicate);
        assert_eq!(store.take(&first.request_id), Some(first));
    }

    #[test]
    fn test_take_closes_id() {
        let store = PendingStore::new();
        let r = result(2, FulfillmentOutcome::Error("boom".into()));
        let id = r.request_id;

        store.record(r);
        assert_eq!(store.pending_len(), 1);
        assert!(store.take(&id).is_some());
        assert!(store.is_closed(&id));
        assert_eq!(store.pending_len(), 0);

        // second take yields nothing, late event is dropped
        assert!(store.take(&id).is_none());
        let late = result(2, FulfillmentOutcome::Response(Bytes::new()));
        assert_eq!(store.record(late), RecordOutcome::Late);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn test_take_on_vacant_leaves_open() {
        let store = PendingStore::new();
        let id = RequestId(B256::repeat_byte(3));
        assert!(store.take(&id).is_none());
        assert!(!store.is_closed(&id));
    }

    #[test]
    fn test_take_or_close() {
        let store = PendingStore::new();
        let id = RequestId(B256::repeat_byte(4));
        assert!(store.take_or_close(&id).is_none());
        assert!(store.is_closed(&id));

        let other = result(5, FulfillmentOutcome::Response(Bytes::new()));
        let other_id = other.request_id;
        store.record(other.clone());
        assert_eq!(store.take_or_close(&other_id), Some(other));
    }

    #[test]
    fn test_keyed_isolation() {
        let store = PendingStore::new();
        let a = result(6, FulfillmentOutcome::Response(Bytes::from(vec![6])));
        let b = result(7, FulfillmentOutcome::Response(Bytes::from(vec![7])));
        store.record(a.clone());
        store.record(b.clone());

        assert_eq!(store.take(&b.request_id), Some(b));
        assert_eq!(store.pending_len(), 1);
        assert_eq!(store.take(&a.request_id), Some(a));
    }
}
