use std::sync::Arc;

use super::{
    CollectionConfig, CollectionEventListener, Document, EventHub, EventKind, IdAllocator,
    RecordStore, WatcherHandle,
};
use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor, DOC_ID};
use crate::errors::{DepotError, DepotResult, ErrorKind};

/// A named store of records with its own id allocator and watchers.
///
/// `Collection` is a handle: clones share the same records and watchers.
/// Records go in and come out by value, so editing a returned [Document]
/// never touches the stored copy; changes are written back with
/// [Collection::update] or [Collection::update_by_id], which also notify
/// watchers.
///
/// Every mutation notifies watchers synchronously before it returns:
/// wildcard (`*`) watchers first, then watchers of the specific kind, each
/// group in registration order. A watcher error aborts the remaining
/// watchers and is returned by the mutating call; the mutation itself stays
/// applied.
///
/// # Examples
///
/// ```rust
/// use depot::collection::Collection;
/// use depot::common::Value;
/// use depot::doc;
///
/// let items = Collection::new("items").unwrap();
/// let a = items.insert(doc! { name: "a" }).unwrap();
/// assert_eq!(a.id(), Some(Value::U64(0)));
///
/// let b = items.insert(doc! { name: "b" }).unwrap();
/// assert_eq!(b.id(), Some(Value::U64(1)));
///
/// assert_eq!(items.remove(&doc! { "id": 0 }).unwrap(), Some(true));
/// assert_eq!(items.size(), 1);
///
/// // ids are never reused
/// let c = items.insert(doc! { name: "c" }).unwrap();
/// assert_eq!(c.id(), Some(Value::U64(2)));
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: String,
    state: Atomic<CollectionState>,
    event_hub: EventHub,
}

struct CollectionState {
    allocator: IdAllocator,
    store: RecordStore,
}

impl Collection {
    /// Creates a detached collection from a name or a [CollectionConfig].
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if the name is missing, empty or contains
    /// whitespace.
    pub fn new(config: impl Into<CollectionConfig>) -> DepotResult<Self> {
        let name = config.into().validated_name()?;
        Ok(Collection {
            inner: Arc::new(CollectionInner {
                name,
                state: atomic(CollectionState {
                    allocator: IdAllocator::new(),
                    store: RecordStore::new(),
                }),
                event_hub: EventHub::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts a record and returns it as stored, with `id` and `_seq` set.
    ///
    /// A record without an `id` (or with a null one) gets the current insert
    /// counter as id. A record whose id is already stored replaces that record.
    pub fn insert(&self, record: Document) -> DepotResult<Document> {
        let stored = self.inner.state.write_with(|state| {
            let allocation = state.allocator.allocate(&record);
            let mut record = record;
            record.set_seq(allocation.seq);
            record.set_id(allocation.id.clone());

            if state.store.put(allocation.id.clone(), record.clone()).is_some() {
                log::debug!(
                    "Record {} in collection '{}' replaced by a new insert",
                    allocation.id,
                    self.inner.name
                );
            }
            record
        });

        log::debug!(
            "Inserted record {} into collection '{}'",
            stored.get(DOC_ID),
            self.inner.name
        );
        self.notify(EventKind::Add, Value::Document(stored.clone()))?;
        Ok(stored)
    }

    /// Merges `record` into the stored record with the same insertion ordinal.
    ///
    /// `record` is expected to come from [Collection::insert] or
    /// [Collection::find], as the ordinal is how the stored record is located.
    /// Fields of `record` overwrite fields of the same name; the stored `id`
    /// and `_seq` are kept.
    ///
    /// If no stored record carries that ordinal, the merge has nothing to merge
    /// into: `record` alone is stored at its own `id`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidId] when no stored record matches and `record` has no
    /// `id` either.
    pub fn update(&self, record: Document) -> DepotResult<Document> {
        let merged = self.inner.state.write_with(|state| -> DepotResult<Document> {
            let base = record
                .seq()
                .and_then(|seq| state.store.get_by_seq(seq))
                .cloned();

            match base {
                Some(mut base) => {
                    let id = base.id().ok_or_else(|| {
                        DepotError::new("Stored record has no id", ErrorKind::InternalError)
                    })?;
                    base.merge_fields(&record);
                    state.store.put(id, base.clone());
                    Ok(base)
                }
                None => match record.id() {
                    Some(id) => {
                        log::warn!(
                            "No record with sequence {:?} in collection '{}', storing update as-is at id {}",
                            record.seq(),
                            self.inner.name,
                            id
                        );
                        state.store.put(id, record.clone());
                        Ok(record)
                    }
                    None => {
                        log::error!(
                            "Cannot update record in collection '{}': no stored record matches and it has no id",
                            self.inner.name
                        );
                        Err(DepotError::new(
                            "Cannot update a record that was never stored and has no id",
                            ErrorKind::InvalidId,
                        ))
                    }
                },
            }
        })?;

        log::debug!(
            "Updated record {} in collection '{}'",
            merged.get(DOC_ID),
            self.inner.name
        );
        self.notify(EventKind::Update, Value::Document(merged.clone()))?;
        Ok(merged)
    }

    /// Merges `patch` into the record stored at `id`.
    ///
    /// Returns `None` without notifying anyone if nothing is stored at `id`.
    /// Reserved fields in `patch` are ignored.
    pub fn update_by_id(
        &self,
        id: impl Into<Value>,
        patch: &Document,
    ) -> DepotResult<Option<Document>> {
        let id = id.into();
        let merged = self.inner.state.write_with(|state| -> Option<Document> {
            let mut base = state.store.get(&id).cloned()?;
            base.merge_fields(patch);
            state.store.put(id.clone(), base.clone());
            Some(base)
        });

        match merged {
            Some(merged) => {
                log::debug!("Updated record {} in collection '{}'", id, self.inner.name);
                self.notify(EventKind::Update, Value::Document(merged.clone()))?;
                Ok(Some(merged))
            }
            None => Ok(None),
        }
    }

    /// Removes the record addressed by the `id` of `query`; other fields of
    /// `query` are ignored.
    ///
    /// Returns `None` if `query` has no `id`, otherwise whether a record was
    /// removed. Watchers only hear about removals that happened, and receive
    /// the removed id rather than the record.
    pub fn remove(&self, query: &Document) -> DepotResult<Option<bool>> {
        match query.id() {
            Some(id) => self.remove_by_id(id).map(Some),
            None => {
                log::debug!(
                    "Remove on collection '{}' without an id is a no-op",
                    self.inner.name
                );
                Ok(None)
            }
        }
    }

    pub fn remove_by_id(&self, id: impl Into<Value>) -> DepotResult<bool> {
        let id = id.into();
        let removed = self
            .inner
            .state
            .write_with(|state| state.store.remove(&id));

        match removed {
            Some(record) => {
                let removed_id = record.id().unwrap_or(id);
                log::debug!(
                    "Removed record {} from collection '{}'",
                    removed_id,
                    self.inner.name
                );
                self.notify(EventKind::Remove, removed_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the record stored at the `id` of `query`; other fields of
    /// `query` are ignored. `None` if `query` has no `id` or nothing is stored.
    pub fn find(&self, query: &Document) -> Option<Document> {
        query.id().and_then(|id| self.find_by_id(id))
    }

    pub fn find_by_id(&self, id: impl Into<Value>) -> Option<Document> {
        let id = id.into();
        self.inner
            .state
            .read_with(|state| state.store.get(&id).cloned())
    }

    /// Registers a watcher for one of `*`, `add`, `remove` or `update`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] for any other kind; nothing is registered.
    pub fn watch(&self, kind: &str, listener: CollectionEventListener) -> DepotResult<WatcherHandle> {
        let kind = kind.parse::<EventKind>()?;
        Ok(self.watch_kind(kind, listener))
    }

    pub fn watch_kind(&self, kind: EventKind, listener: CollectionEventListener) -> WatcherHandle {
        let handle = self.inner.event_hub.watch(kind, listener);
        log::debug!(
            "Registered '{}' watcher {} on collection '{}'",
            kind,
            handle,
            self.inner.name
        );
        handle
    }

    /// Deregisters a watcher. Returns `false` if the handle is unknown.
    pub fn unwatch(&self, handle: WatcherHandle) -> bool {
        self.inner.event_hub.unwatch(handle)
    }

    pub fn watcher_count(&self, kind: EventKind) -> usize {
        self.inner.event_hub.watcher_count(kind)
    }

    /// Number of records currently stored.
    pub fn size(&self) -> usize {
        self.inner.state.read_with(|state| state.store.len())
    }

    /// Number of inserts ever performed, which is also the next ordinal.
    pub fn insert_count(&self) -> u64 {
        self.inner
            .state
            .read_with(|state| state.allocator.insert_count())
    }

    // must be called with no lock held, watchers may call back into this collection
    fn notify(&self, kind: EventKind, item: Value) -> DepotResult<()> {
        self.inner.event_hub.publish(kind, item, &self.inner.name)
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("size", &self.size())
            .finish()
    }
}
