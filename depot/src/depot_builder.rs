use crate::collection::CollectionConfig;
use crate::depot::Depot;
use crate::depot_config::DepotConfig;
use crate::errors::{DepotError, DepotResult};

/// Fluent builder for a [Depot].
///
/// Configuration errors are captured as they happen; the first one is
/// returned by [DepotBuilder::open] and later calls are ignored.
///
/// ```rust
/// use depot::Depot;
///
/// let depot = Depot::builder()
///     .collection("users")
///     .collection("orders")
///     .open()
///     .unwrap();
/// assert_eq!(depot.list_collection_names(), vec!["orders", "users"]);
///
/// assert!(Depot::builder().collection("bad name").open().is_err());
/// ```
#[derive(Default)]
pub struct DepotBuilder {
    error: Option<DepotError>,
    depot_config: DepotConfig,
}

impl DepotBuilder {
    pub fn new() -> Self {
        DepotBuilder {
            error: None,
            depot_config: DepotConfig::new(),
        }
    }

    /// Adds a collection, by name or config, to create when the depot opens.
    pub fn collection(mut self, config: impl Into<CollectionConfig>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.depot_config.add_collection(config) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the depot with every configured collection in place.
    pub fn open(self) -> DepotResult<Depot> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Depot::open(self.depot_config)
    }
}
