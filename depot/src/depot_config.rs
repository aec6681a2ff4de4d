//! Configuration of a depot.

use std::sync::Arc;

use crate::collection::CollectionConfig;
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{DepotError, DepotResult, ErrorKind};

/// Collections a depot creates when it opens.
///
/// Entries are validated as they are added, so an invalid or duplicate name
/// is reported by [DepotConfig::add_collection] rather than at open time.
/// Clones share the same entries.
///
/// ```rust
/// use depot::DepotConfig;
///
/// let config = DepotConfig::new();
/// config.add_collection("users").unwrap();
/// assert!(config.add_collection("users").is_err());
/// assert_eq!(config.collection_names(), vec!["users".to_string()]);
/// ```
#[derive(Clone)]
pub struct DepotConfig {
    inner: Arc<DepotConfigInner>,
}

struct DepotConfigInner {
    collections: Atomic<Vec<CollectionConfig>>,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DepotConfig {
    pub fn new() -> Self {
        DepotConfig {
            inner: Arc::new(DepotConfigInner {
                collections: atomic(Vec::new()),
            }),
        }
    }

    /// Adds a collection to create at open.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if the name is invalid or already added.
    pub fn add_collection(&self, config: impl Into<CollectionConfig>) -> DepotResult<()> {
        let config = config.into();
        let name = config.validated_name()?;

        self.inner.collections.write_with(|collections| {
            if collections.iter().any(|c| c.name() == Some(name.as_str())) {
                log::error!("Collection '{}' is already configured", name);
                return Err(DepotError::new(
                    &format!("Collection '{}' is already configured", name),
                    ErrorKind::InvalidArgument,
                ));
            }
            collections.push(config);
            Ok(())
        })
    }

    /// Configured collections in the order they were added.
    pub fn collections(&self) -> Vec<CollectionConfig> {
        self.inner.collections.read_with(|collections| collections.clone())
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.inner.collections.read_with(|collections| {
            collections
                .iter()
                .filter_map(|c| c.name().map(str::to_string))
                .collect()
        })
    }
}

impl std::fmt::Debug for DepotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepotConfig")
            .field("collections", &self.collection_names())
            .finish()
    }
}
