use crate::errors::{DepotError, DepotResult, ErrorKind};

/// Configuration of a new collection.
///
/// Every entry point that creates a collection accepts either a bare name or
/// a full config; both normalize into this type.
///
/// ```rust
/// use depot::collection::CollectionConfig;
///
/// let from_name: CollectionConfig = "items".into();
/// let explicit = CollectionConfig::new().with_name("items");
/// assert_eq!(from_name, explicit);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionConfig {
    name: Option<String>,
}

impl CollectionConfig {
    pub fn new() -> Self {
        CollectionConfig { name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the validated collection name.
    pub(crate) fn validated_name(&self) -> DepotResult<String> {
        let name = match &self.name {
            Some(name) => name,
            None => {
                log::error!("Collection requires `name` property");
                return Err(DepotError::new(
                    "Collection requires `name` property",
                    ErrorKind::InvalidArgument,
                ));
            }
        };

        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(DepotError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        if name.chars().any(char::is_whitespace) {
            log::error!("Collection name '{}' cannot contain whitespace", name);
            return Err(DepotError::new(
                &format!("Collection name '{}' cannot contain whitespace", name),
                ErrorKind::InvalidArgument,
            ));
        }

        Ok(name.clone())
    }
}

impl From<&str> for CollectionConfig {
    fn from(name: &str) -> Self {
        CollectionConfig::new().with_name(name)
    }
}

impl From<String> for CollectionConfig {
    fn from(name: String) -> Self {
        CollectionConfig::new().with_name(name)
    }
}

impl From<&String> for CollectionConfig {
    fn from(name: &String) -> Self {
        CollectionConfig::new().with_name(name.as_str())
    }
}
