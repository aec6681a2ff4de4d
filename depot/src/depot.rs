use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;

use crate::collection::{Collection, CollectionConfig};
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::depot_builder::DepotBuilder;
use crate::depot_config::DepotConfig;
use crate::errors::{DepotError, DepotResult, ErrorKind};

/// An in-process registry of named collections.
///
/// `Depot` is a cheap handle: clones share the same collections. Each name
/// binds at most one [Collection], and a bound collection is reachable by
/// name for the lifetime of the depot.
///
/// # Examples
///
/// ```rust
/// use depot::Depot;
/// use depot::doc;
///
/// let depot = Depot::new();
/// let users = depot.create_collection("users").unwrap();
/// users.insert(doc! { name: "Alice" }).unwrap();
///
/// let same = depot.collection("users").unwrap();
/// assert_eq!(same.size(), 1);
/// assert!(depot.collection("orders").is_err());
/// ```
#[derive(Clone)]
pub struct Depot {
    inner: Arc<DepotInner>,
}

struct DepotInner {
    config: DepotConfig,
    collections: Atomic<HashMap<String, Collection>>,
}

impl Default for Depot {
    fn default() -> Self {
        Self::new()
    }
}

impl Depot {
    /// Creates an empty depot.
    pub fn new() -> Self {
        Depot::with_config(DepotConfig::new())
    }

    pub fn builder() -> DepotBuilder {
        DepotBuilder::new()
    }

    fn with_config(config: DepotConfig) -> Self {
        Depot {
            inner: Arc::new(DepotInner {
                config,
                collections: atomic(HashMap::new()),
            }),
        }
    }

    pub(crate) fn open(config: DepotConfig) -> DepotResult<Self> {
        let depot = Depot::with_config(config.clone());
        for collection_config in config.collections() {
            depot.bind(Collection::new(collection_config)?)?;
        }
        log::debug!(
            "Opened depot with collections [{}]",
            depot.list_collection_names().join(", ")
        );
        Ok(depot)
    }

    /// Creates a collection and binds it under its name.
    ///
    /// Accepts a bare name or a [CollectionConfig].
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if the name is missing, empty, contains
    /// whitespace, or is already bound.
    pub fn create_collection(&self, config: impl Into<CollectionConfig>) -> DepotResult<Collection> {
        let collection = Collection::new(config)?;
        self.bind(collection.clone())?;
        log::debug!("Created collection '{}'", collection.name());
        Ok(collection)
    }

    /// Binds a collection built elsewhere under its own name.
    pub fn register(&self, collection: Collection) -> DepotResult<()> {
        let name = collection.name().to_string();
        self.bind(collection)?;
        log::debug!("Registered collection '{}'", name);
        Ok(())
    }

    fn bind(&self, collection: Collection) -> DepotResult<()> {
        self.inner.collections.write_with(|collections| {
            if collections.contains_key(collection.name()) {
                log::error!("Collection '{}' already exists", collection.name());
                return Err(DepotError::new(
                    &format!("Collection '{}' already exists", collection.name()),
                    ErrorKind::InvalidArgument,
                ));
            }
            collections.insert(collection.name().to_string(), collection);
            Ok(())
        })
    }

    /// Returns the collection bound under `name`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::CollectionNotFound] if nothing is bound under `name`.
    pub fn collection(&self, name: &str) -> DepotResult<Collection> {
        self.inner
            .collections
            .read_with(|collections| collections.get(name).cloned())
            .ok_or_else(|| {
                log::error!("Collection '{}' does not exist", name);
                DepotError::new(
                    &format!("Collection '{}' does not exist", name),
                    ErrorKind::CollectionNotFound,
                )
            })
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner
            .collections
            .read_with(|collections| collections.contains_key(name))
    }

    /// Names of all bound collections, sorted.
    pub fn list_collection_names(&self) -> Vec<String> {
        self.inner
            .collections
            .read_with(|collections| collections.keys().cloned().sorted().collect())
    }

    /// The configuration the depot was opened with.
    pub fn config(&self) -> DepotConfig {
        self.inner.config.clone()
    }
}

impl std::fmt::Debug for Depot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Depot")
            .field("collections", &self.list_collection_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionEventListener;
    use crate::common::Value;
    use crate::doc;
    use parking_lot::Mutex;

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    #[test]
    fn test_create_collection() {
        let depot = Depot::new();
        let items = depot.create_collection("items").unwrap();
        assert_eq!(items.name(), "items");
        assert!(depot.has_collection("items"));
        assert!(!depot.has_collection("users"));
    }

    #[test]
    fn test_create_collection_from_config() {
        let depot = Depot::new();
        let items = depot
            .create_collection(CollectionConfig::new().with_name("items"))
            .unwrap();
        assert_eq!(depot.collection("items").unwrap().name(), items.name());
    }

    #[test]
    fn test_create_collection_rejects_invalid_name() {
        let depot = Depot::new();
        let err = depot.create_collection(CollectionConfig::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert!(depot.create_collection("").is_err());
        assert!(depot.list_collection_names().is_empty());
    }

    #[test]
    fn test_create_collection_twice_fails() {
        let depot = Depot::new();
        let items = depot.create_collection("items").unwrap();
        items.insert(doc! { name: "a" }).unwrap();

        let err = depot.create_collection("items").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        // the original binding is untouched
        assert_eq!(depot.collection("items").unwrap().size(), 1);
    }

    #[test]
    fn test_collection_returns_shared_handle() {
        let depot = Depot::new();
        let items = depot.create_collection("items").unwrap();
        depot.collection("items").unwrap().insert(doc! { name: "a" }).unwrap();

        assert_eq!(items.size(), 1);
        assert_eq!(items.find_by_id(0).unwrap().get("name"), Value::from("a"));
    }

    #[test]
    fn test_collection_not_found() {
        let depot = Depot::new();
        let err = depot.collection("missing").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
    }

    #[test]
    fn test_register() {
        let depot = Depot::new();
        let events = Arc::new(Mutex::new(0));
        let events_clone = events.clone();

        let detached = Collection::new("detached").unwrap();
        detached
            .watch(
                "*",
                CollectionEventListener::new(move |_| {
                    *events_clone.lock() += 1;
                    Ok(())
                }),
            )
            .unwrap();
        depot.register(detached.clone()).unwrap();

        // watchers registered before binding stay attached
        depot
            .collection("detached")
            .unwrap()
            .insert(doc! { name: "a" })
            .unwrap();
        assert_eq!(*events.lock(), 1);

        assert!(depot.register(Collection::new("detached").unwrap()).is_err());
    }

    #[test]
    fn test_list_collection_names_is_sorted() {
        let depot = Depot::new();
        for name in ["users", "items", "orders"] {
            depot.create_collection(name).unwrap();
        }
        assert_eq!(depot.list_collection_names(), vec!["items", "orders", "users"]);
    }

    #[test]
    fn test_clones_share_collections() {
        let depot = Depot::default();
        let clone = depot.clone();
        clone.create_collection("items").unwrap();
        assert!(depot.has_collection("items"));
        assert!(format!("{:?}", depot).contains("items"));
    }

    #[test]
    fn test_config_of_new_depot_is_empty() {
        let depot = Depot::new();
        assert!(depot.config().collections().is_empty());
    }
}
