use indexmap::IndexMap;

use crate::collection::{CollectionEventInfo, CollectionEventListener, EventKind, WatcherHandle};
use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor};
use crate::errors::{DepotError, DepotResult, ErrorKind};

/// Per-collection registry of watchers and their synchronous dispatch.
///
/// Registrations live in one insertion-ordered map, so iterating it yields
/// watchers in registration order. Handles come from a single counter shared
/// by all kinds.
///
/// Dispatch copies the matching listeners out of the lock before calling
/// them, which lets a watcher call back into its collection (or register
/// more watchers) without deadlocking. Watchers added during a dispatch see
/// the next event, not the current one.
#[derive(Clone)]
pub(crate) struct EventHub {
    registry: Atomic<WatcherRegistry>,
}

struct WatcherRegistry {
    next_handle: u64,
    entries: IndexMap<WatcherHandle, Registration>,
}

struct Registration {
    kind: EventKind,
    listener: CollectionEventListener,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        EventHub {
            registry: atomic(WatcherRegistry {
                next_handle: 0,
                entries: IndexMap::new(),
            }),
        }
    }

    pub(crate) fn watch(&self, kind: EventKind, listener: CollectionEventListener) -> WatcherHandle {
        self.registry.write_with(|registry| {
            let handle = WatcherHandle(registry.next_handle);
            registry.next_handle += 1;
            registry.entries.insert(handle, Registration { kind, listener });
            handle
        })
    }

    pub(crate) fn unwatch(&self, handle: WatcherHandle) -> bool {
        self.registry
            .write_with(|registry| registry.entries.shift_remove(&handle).is_some())
    }

    pub(crate) fn watcher_count(&self, kind: EventKind) -> usize {
        self.registry.read_with(|registry| {
            registry
                .entries
                .values()
                .filter(|registration| registration.kind == kind)
                .count()
        })
    }

    /// Wildcard watchers first, then watchers of `kind`; registration order
    /// within each group.
    fn listeners_for(&self, kind: EventKind) -> Vec<(WatcherHandle, CollectionEventListener)> {
        self.registry.read_with(|registry| {
            let mut listeners = Vec::new();
            for wanted in [EventKind::All, kind] {
                listeners.extend(
                    registry
                        .entries
                        .iter()
                        .filter(|(_, registration)| registration.kind == wanted)
                        .map(|(handle, registration)| (*handle, registration.listener.clone())),
                );
            }
            listeners
        })
    }

    /// Delivers one event to every matching watcher on the calling thread.
    ///
    /// The first watcher error stops the dispatch and is returned wrapped in
    /// an [ErrorKind::EventError].
    pub(crate) fn publish(&self, kind: EventKind, item: Value, originator: &str) -> DepotResult<()> {
        let listeners = self.listeners_for(kind);
        if listeners.is_empty() {
            return Ok(());
        }

        let event = CollectionEventInfo::new(item, kind, originator.to_string());
        for (handle, listener) in listeners {
            if let Err(e) = listener.notify(event.clone()) {
                let message = format!(
                    "Watcher {} of collection '{}' failed handling '{}' event: {}",
                    handle, originator, kind, e
                );
                log::error!("{}", message);
                return Err(DepotError::new_with_cause(&message, ErrorKind::EventError, e));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_listener(log: &Arc<Mutex<Vec<String>>>, label: &str) -> CollectionEventListener {
        let log = log.clone();
        let label = label.to_string();
        CollectionEventListener::new(move |event: CollectionEventInfo| {
            log.lock().push(format!("{}:{}", label, event.event_kind()));
            Ok(())
        })
    }

    #[test]
    fn test_handles_are_shared_across_kinds() {
        let hub = EventHub::new();
        let noop = CollectionEventListener::new(|_| Ok(()));

        assert_eq!(hub.watch(EventKind::Add, noop.clone()).value(), 0);
        assert_eq!(hub.watch(EventKind::Remove, noop.clone()).value(), 1);
        assert_eq!(hub.watch(EventKind::Update, noop).value(), 2);

        assert_eq!(hub.watcher_count(EventKind::Add), 1);
        assert_eq!(hub.watcher_count(EventKind::Remove), 1);
        assert_eq!(hub.watcher_count(EventKind::Update), 1);
        assert_eq!(hub.watcher_count(EventKind::All), 0);
    }

    #[test]
    fn test_wildcard_runs_before_specific_kind() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        // specific watcher registered first still runs after the wildcard ones
        hub.watch(EventKind::Add, recording_listener(&log, "add-1"));
        hub.watch(EventKind::All, recording_listener(&log, "all-1"));
        hub.watch(EventKind::Add, recording_listener(&log, "add-2"));
        hub.watch(EventKind::All, recording_listener(&log, "all-2"));
        hub.watch(EventKind::Remove, recording_listener(&log, "remove"));

        hub.publish(EventKind::Add, Value::Null, "test").unwrap();
        assert_eq!(
            *log.lock(),
            vec!["all-1:add", "all-2:add", "add-1:add", "add-2:add"]
        );
    }

    #[test]
    fn test_publish_without_watchers_is_ok() {
        let hub = EventHub::new();
        assert!(hub.publish(EventKind::Update, Value::Null, "test").is_ok());
    }

    #[test]
    fn test_unwatch() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = hub.watch(EventKind::All, recording_listener(&log, "all"));

        assert!(hub.unwatch(handle));
        assert!(!hub.unwatch(handle));
        hub.publish(EventKind::Add, Value::Null, "test").unwrap();
        assert!(log.lock().is_empty());

        // handles are not reused after unwatch
        let next = hub.watch(EventKind::All, recording_listener(&log, "all"));
        assert_eq!(next.value(), 1);
    }

    #[test]
    fn test_failing_watcher_stops_dispatch() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        hub.watch(EventKind::All, recording_listener(&log, "first"));
        hub.watch(
            EventKind::All,
            CollectionEventListener::new(|_| {
                Err(DepotError::new("watcher rejected", ErrorKind::InvalidOperation))
            }),
        );
        hub.watch(EventKind::Remove, recording_listener(&log, "last"));

        let err = hub.publish(EventKind::Remove, Value::U64(0), "items").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EventError);
        assert_eq!(err.cause().map(|c| c.message()), Some("watcher rejected"));
        assert!(err.message().contains("'items'"));
        assert_eq!(*log.lock(), vec!["first:remove"]);
    }

    #[test]
    fn test_watcher_may_register_during_dispatch() {
        let hub = EventHub::new();
        let hub_clone = hub.clone();
        hub.watch(
            EventKind::Add,
            CollectionEventListener::new(move |_| {
                hub_clone.watch(EventKind::Add, CollectionEventListener::new(|_| Ok(())));
                Ok(())
            }),
        );

        hub.publish(EventKind::Add, Value::Null, "test").unwrap();
        assert_eq!(hub.watcher_count(EventKind::Add), 2);
    }
}
