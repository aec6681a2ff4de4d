use im::OrdMap;
use smallvec::SmallVec;

use crate::common::{Value, DOC_ID, DOC_SEQ, RESERVED_FIELDS};
use crate::errors::{DepotError, DepotResult, ErrorKind};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// A record stored in a depot collection.
///
/// A document is an ordered set of key-value pairs; keys are [String]s and
/// values are [Value]s. Nested documents and arrays are plain values.
///
/// Two fields are reserved and owned by the collection that stores the record:
///
/// * `id` - the collection-unique identifier. Callers may supply it before
///   insertion (any non-null value, including `0` and `""`); otherwise the
///   collection allocates one.
/// * `_seq` - the insertion ordinal. It can't be written through [Document::put]
///   and is assigned by the collection on insert.
///
/// The backing map is an `im::OrdMap`, so cloning a document is O(1) and a
/// clone never observes later edits of the original.
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if the key is empty or if it is the
    /// reserved `_seq` field.
    ///
    /// ```rust
    /// use depot::collection::Document;
    /// use depot::common::Value;
    ///
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice").unwrap();
    /// doc.put("id", 0).unwrap();
    /// assert_eq!(doc.get("name"), Value::from("Alice"));
    /// assert!(doc.put("_seq", 3).is_err());
    /// ```
    pub fn put<'a, T: Into<Value>>(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: T,
    ) -> DepotResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DepotError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if key == DOC_SEQ {
            log::error!("Document sequence is assigned by the collection and cannot be set manually");
            return Err(DepotError::new(
                "Document sequence is assigned by the collection and cannot be set manually",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data = self.data.update(key.into_owned(), value.into());
        Ok(())
    }

    /// Returns the value stored at `key`, or [Value::Null] if there is none.
    pub fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or_default()
    }

    /// Returns the caller-visible identifier of this document, if present.
    ///
    /// A field holding [Value::Null] counts as absent; every other value,
    /// including `0`, `false` and `""`, is a present id.
    pub fn id(&self) -> Option<Value> {
        match self.data.get(DOC_ID) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value.clone()),
        }
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    /// Returns the insertion ordinal assigned by the owning collection.
    pub fn seq(&self) -> Option<u64> {
        self.data.get(DOC_SEQ).and_then(|v| v.as_u64())
    }

    pub(crate) fn set_id(&mut self, id: Value) {
        self.data = self.data.update(DOC_ID.to_string(), id);
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.data = self.data.update(DOC_SEQ.to_string(), Value::U64(seq));
    }

    /// Removes `key` from the document. Removing a missing key is a no-op.
    pub fn remove(&mut self, key: &str) {
        self.data = self.data.without(key);
    }

    /// Returns the number of top-level entries, reserved fields included.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Shallow merge: every top-level field of `other` overwrites the field
    /// of the same name here. Fields present only here survive.
    ///
    /// ```rust
    /// use depot::doc;
    /// use depot::common::Value;
    ///
    /// let mut doc = doc! { name: "foo", tags: ["a"] };
    /// doc.merge(&doc! { name: "bar" });
    /// assert_eq!(doc.get("name"), Value::from("bar"));
    /// assert_eq!(doc.size(), 2);
    /// ```
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            self.data = self.data.update(key.clone(), value.clone());
        }
    }

    /// Like [Document::merge] but leaves the reserved fields of `self` alone.
    pub(crate) fn merge_fields(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                self.data = self.data.update(key.clone(), value.clone());
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the caller-owned field names, without `id` and `_seq`.
    pub fn fields(&self) -> FieldVec {
        self.data
            .keys()
            .filter(|key| !RESERVED_FIELDS.contains(&key.as_str()))
            .cloned()
            .collect()
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Iterates the top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.data.iter()
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let entries = self
            .data
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}\"{}\": {}",
                    indent_str,
                    key,
                    value.to_pretty_json(indent + 2)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{}\n{}}}", entries, " ".repeat(indent))
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let entries = self
            .data
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}\"{}\": {}",
                    indent_str,
                    key,
                    value.to_debug_string(indent + 2)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{}\n{}}}", entries, " ".repeat(indent))
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use depot::doc;
///
/// let empty = doc!{};
/// assert!(empty.is_empty());
///
/// let base = 100;
/// let record = doc!{
///     "id": "suppliedid",
///     name: "Bob",
///     score: (base * 2),
///     address: {
///         city: "Oslo",
///         tags: ["home", "billing"]
///     }
/// };
/// assert_eq!(record.size(), 4);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\"ABC\""), "ABC");
        assert_eq!(normalize("ABC"), "ABC");
    }

    #[test]
    fn test_new_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.size(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "foo").unwrap();
        assert_eq!(doc.get("name"), Value::from("foo"));
        assert_eq!(doc.get("missing"), Value::Null);
    }

    #[test]
    fn test_put_rejects_empty_key() {
        let mut doc = Document::new();
        let err = doc.put("", 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_put_rejects_sequence_field() {
        let mut doc = Document::new();
        let err = doc.put(DOC_SEQ, 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
        assert!(doc.seq().is_none());
    }

    #[test]
    fn test_falsy_ids_are_present() {
        assert_eq!(doc! { "id": 0 }.id(), Some(Value::I32(0)));
        assert_eq!(doc! { "id": "" }.id(), Some(Value::from("")));
        assert_eq!(doc! { "id": false }.id(), Some(Value::Bool(false)));
    }

    #[test]
    fn test_null_id_is_absent() {
        let doc = doc! { "id": (Value::Null), name: "foo" };
        assert!(doc.contains_key(DOC_ID));
        assert!(!doc.has_id());
        assert!(doc! { name: "foo" }.id().is_none());
    }

    #[test]
    fn test_set_seq_and_id() {
        let mut doc = doc! { name: "foo" };
        doc.set_seq(4);
        doc.set_id(Value::U64(4));
        assert_eq!(doc.seq(), Some(4));
        assert_eq!(doc.id(), Some(Value::I32(4)));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut doc = doc! { name: "foo", address: { city: "Oslo", zip: 150 } };
        doc.merge(&doc! { address: { city: "Bergen" }, age: 3 });

        assert_eq!(doc.get("name"), Value::from("foo"));
        assert_eq!(doc.get("age"), Value::I32(3));
        let address = doc.get("address");
        let address = address.as_document().unwrap();
        assert_eq!(address.get("city"), Value::from("Bergen"));
        assert!(!address.contains_key("zip"));
    }

    #[test]
    fn test_merge_fields_keeps_reserved_fields() {
        let mut stored = doc! { "id": 1, name: "foo" };
        stored.set_seq(1);
        let mut patch = doc! { "id": 99, name: "bar" };
        patch.set_seq(7);

        stored.merge_fields(&patch);
        assert_eq!(stored.id(), Some(Value::I32(1)));
        assert_eq!(stored.seq(), Some(1));
        assert_eq!(stored.get("name"), Value::from("bar"));
    }

    #[test]
    fn test_fields_skip_reserved() {
        let mut doc = doc! { "id": 1, name: "foo", age: 2 };
        doc.set_seq(0);
        let fields = doc.fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"age".to_string()));
    }

    #[test]
    fn test_remove() {
        let mut doc = doc! { name: "foo", age: 2 };
        doc.remove("age");
        doc.remove("missing");
        assert_eq!(doc.size(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = doc! { name: "foo" };
        let mut copy = original.clone();
        copy.put("name", "bar").unwrap();
        assert_eq!(original.get("name"), Value::from("foo"));
    }

    #[test]
    fn test_iter_in_key_order() {
        let doc = doc! { b: 2, a: 1 };
        let keys: Vec<&String> = doc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.to_map().len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Document::new().to_string(), "{}");
        assert_eq!(doc! { a: 1 }.to_string(), "{\n  \"a\": 1\n}");
    }
}
