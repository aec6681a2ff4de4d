use crate::collection::Document;
use crate::common::Value;

/// Insertion counter of a collection.
///
/// Every insert consumes exactly one ordinal, whether or not the record
/// brought its own id. Ordinals are never handed out twice, so a generated id
/// is never reused after the record carrying it is removed.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    insert_count: u64,
}

/// The ordinal and id an insert resolved to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Allocation {
    pub(crate) seq: u64,
    pub(crate) id: Value,
}

impl IdAllocator {
    pub(crate) fn new() -> Self {
        IdAllocator { insert_count: 0 }
    }

    /// Consumes the next ordinal for `record`. The id is the record's own
    /// when present, otherwise the ordinal itself.
    pub(crate) fn allocate(&mut self, record: &Document) -> Allocation {
        let seq = self.insert_count;
        self.insert_count += 1;

        let id = record.id().unwrap_or(Value::U64(seq));
        Allocation { seq, id }
    }

    pub(crate) fn insert_count(&self) -> u64 {
        self.insert_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_generated_ids_follow_the_counter() {
        let mut allocator = IdAllocator::new();
        for expected in 0..3u64 {
            let allocation = allocator.allocate(&doc! { name: "foo" });
            assert_eq!(allocation.seq, expected);
            assert_eq!(allocation.id, Value::U64(expected));
        }
        assert_eq!(allocator.insert_count(), 3);
    }

    #[test]
    fn test_supplied_id_still_consumes_an_ordinal() {
        let mut allocator = IdAllocator::new();
        let supplied = allocator.allocate(&doc! { "id": "suppliedid" });
        assert_eq!(supplied.seq, 0);
        assert_eq!(supplied.id, Value::from("suppliedid"));

        let generated = allocator.allocate(&doc! { name: "bar" });
        assert_eq!(generated.seq, 1);
        assert_eq!(generated.id, Value::U64(1));
    }

    #[test]
    fn test_zero_id_is_honored() {
        let mut allocator = IdAllocator::new();
        allocator.allocate(&doc! { name: "first" });
        let allocation = allocator.allocate(&doc! { "id": 0 });
        assert_eq!(allocation.seq, 1);
        assert_eq!(allocation.id, Value::I32(0));
    }
}
