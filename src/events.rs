//! Categorized synchronous event bus
//!
//! Subscribers register per category or for everything; `publish` invokes the
//! matching callbacks on the caller's thread. The subscriber list is
//! snapshotted under the lock and callbacks run after it is released, so a
//! callback may publish, subscribe, or unsubscribe without deadlocking. A
//! subscription added during a publish only sees later publishes.

use crate::protocol::{EventCategory, EventId, Severity};
use parking_lot::Mutex;
use std::sync::Arc;

/// One published event
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub id: EventId,
    pub category: EventCategory,
    pub severity: Severity,
    pub timestamp_ns: u64,
    pub detail: String,
}

type Callback = Arc<dyn Fn(&EventRecord) + Send + Sync>;

struct Subscription {
    id: u32,
    /// `None` subscribes to every category
    category: Option<EventCategory>,
    callback: Callback,
}

/// Synchronous pub/sub hub
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

#[derive(Default)]
struct BusInner {
    subs: Vec<Subscription>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one category. Returns the subscription ID.
    pub fn subscribe<F>(&self, category: EventCategory, callback: F) -> u32
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.add(Some(category), Arc::new(callback))
    }

    /// Subscribe to all categories. Returns the subscription ID.
    pub fn subscribe_all<F>(&self, callback: F) -> u32
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.add(None, Arc::new(callback))
    }

    fn add(&self, category: Option<EventCategory>, callback: Callback) -> u32 {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subs.push(Subscription {
            id,
            category,
            callback,
        });
        id
    }

    /// Remove a subscription. Unknown IDs are ignored.
    pub fn unsubscribe(&self, sub_id: u32) {
        self.inner.lock().subs.retain(|s| s.id != sub_id);
    }

    /// Deliver an event to every matching subscriber.
    pub fn publish(&self, event: &EventRecord) {
        let to_call: Vec<Callback> = {
            let inner = self.inner.lock();
            inner
                .subs
                .iter()
                .filter(|s| s.category.is_none() || s.category == Some(event.category))
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };
        for cb in to_call {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn record(category: EventCategory) -> EventRecord {
        EventRecord {
            id: EventId::EvtSeqGap,
            category,
            severity: Severity::Warn,
            timestamp_ns: 0,
            detail: String::new(),
        }
    }

    #[test]
    fn test_category_filtering() {
        let bus = EventBus::new();
        let network_hits = Arc::new(AtomicU32::new(0));
        let hits = Arc::clone(&network_hits);
        bus.subscribe(EventCategory::Network, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&record(EventCategory::Network));
        bus.publish(&record(EventCategory::Health));
        bus.publish(&record(EventCategory::Network));

        assert_eq!(network_hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_all_sees_everything() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe_all(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&record(EventCategory::Network));
        bus.publish(&record(EventCategory::Tracking));
        bus.publish(&record(EventCategory::Control));

        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        let id = bus.subscribe(EventCategory::Network, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&record(EventCategory::Network));
        bus.unsubscribe(id);
        bus.publish(&record(EventCategory::Network));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_publish_does_not_deadlock() {
        let bus = Arc::new(EventBus::new());
        let hits = Arc::new(AtomicU32::new(0));

        let inner_bus = Arc::clone(&bus);
        let inner_hits = Arc::clone(&hits);
        bus.subscribe(EventCategory::Network, move |ev| {
            if inner_hits.fetch_add(1, Ordering::SeqCst) == 0 {
                // First delivery republishes to a different category.
                let mut re = ev.clone();
                re.category = EventCategory::Health;
                inner_bus.publish(&re);
            }
        });

        let h = Arc::clone(&hits);
        bus.subscribe(EventCategory::Health, move |_| {
            h.fetch_add(10, Ordering::SeqCst);
        });

        bus.publish(&record(EventCategory::Network));
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_subscribe_during_publish_applies_to_later_publishes() {
        let bus = Arc::new(EventBus::new());
        let late_hits = Arc::new(AtomicU32::new(0));

        let reg_bus = Arc::clone(&bus);
        let late = Arc::clone(&late_hits);
        bus.subscribe(EventCategory::Network, move |_| {
            let late = Arc::clone(&late);
            reg_bus.subscribe(EventCategory::Network, move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The subscription registered mid-publish must not see this event.
        bus.publish(&record(EventCategory::Network));
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
    }
}
