use crate::common::{
    get_current_time_or_zero, Value, ADD_EVENT, ALL_EVENTS, EVENT_KINDS, REMOVE_EVENT,
    UPDATE_EVENT,
};
use crate::errors::{DepotError, DepotResult, ErrorKind};
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// The kinds a watcher can register for.
///
/// `All` is the wildcard `*`: its watchers run on every mutation, before the
/// watchers of the specific kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    All,
    Add,
    Remove,
    Update,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::All => ALL_EVENTS,
            EventKind::Add => ADD_EVENT,
            EventKind::Remove => REMOVE_EVENT,
            EventKind::Update => UPDATE_EVENT,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DepotError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            ALL_EVENTS => Ok(EventKind::All),
            ADD_EVENT => Ok(EventKind::Add),
            REMOVE_EVENT => Ok(EventKind::Remove),
            UPDATE_EVENT => Ok(EventKind::Update),
            _ => {
                let message = format!(
                    "Unknown event kind '{}', expected one of {}",
                    kind,
                    EVENT_KINDS.iter().map(|k| format!("'{}'", k)).join(", ")
                );
                log::error!("{}", message);
                Err(DepotError::new(&message, ErrorKind::InvalidArgument))
            }
        }
    }
}

/// Handle returned by `watch`, unique within one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherHandle(pub(crate) u64);

impl WatcherHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for WatcherHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information handed to a watcher when a collection mutates.
///
/// For `add` and `update` the item is the stored record as a
/// [Value::Document]; for `remove` it is only the removed record's id.
#[derive(Clone)]
pub struct CollectionEventInfo {
    inner: Arc<CollectionEventInner>,
}

impl CollectionEventInfo {
    pub fn new(item: Value, event_kind: EventKind, originator: String) -> Self {
        CollectionEventInfo {
            inner: Arc::new(CollectionEventInner {
                item,
                event_kind,
                timestamp: get_current_time_or_zero(),
                originator,
            }),
        }
    }

    /// The mutation that fired: `Add`, `Update` or `Remove`, never `All`.
    pub fn event_kind(&self) -> EventKind {
        self.inner.event_kind
    }

    pub fn item(&self) -> &Value {
        &self.inner.item
    }

    /// Name of the collection the event came from.
    pub fn originator(&self) -> &str {
        &self.inner.originator
    }

    /// Milliseconds since epoch at which the event was created.
    pub fn timestamp(&self) -> u128 {
        self.inner.timestamp
    }
}

impl Debug for CollectionEventInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEventInfo")
            .field("item", self.item())
            .field("event_kind", &self.event_kind())
            .field("timestamp", &self.timestamp())
            .field("originator", &self.originator())
            .finish()
    }
}

struct CollectionEventInner {
    item: Value,
    event_kind: EventKind,
    timestamp: u128,
    originator: String,
}

/// Signature of watcher closures. Any `Fn(CollectionEventInfo) -> DepotResult<()>`
/// that is `Send + Sync` implements it.
pub trait CollectionEventCallback: Send + Sync + Fn(CollectionEventInfo) -> DepotResult<()> {}

impl<F> CollectionEventCallback for F where
    F: Send + Sync + Fn(CollectionEventInfo) -> DepotResult<()>
{
}

/// A watcher callback that can be registered on a collection.
///
/// ```rust
/// use depot::collection::{CollectionEventListener, EventKind};
/// use depot::doc;
/// use depot::Depot;
///
/// let depot = Depot::new();
/// let items = depot.create_collection("items").unwrap();
/// items.watch("add", CollectionEventListener::new(|event| {
///     assert_eq!(event.event_kind(), EventKind::Add);
///     Ok(())
/// })).unwrap();
/// items.insert(doc! { name: "a" }).unwrap();
/// ```
#[derive(Clone)]
pub struct CollectionEventListener {
    on_event: Arc<dyn CollectionEventCallback>,
}

impl CollectionEventListener {
    pub fn new(on_event: impl CollectionEventCallback + 'static) -> Self {
        CollectionEventListener {
            on_event: Arc::new(on_event),
        }
    }

    pub(crate) fn notify(&self, event: CollectionEventInfo) -> DepotResult<()> {
        (self.on_event)(event)
    }
}

impl Debug for CollectionEventListener {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEventListener").finish()
    }
}
