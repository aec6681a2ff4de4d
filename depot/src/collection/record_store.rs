use std::collections::BTreeMap;

use crate::collection::Document;
use crate::common::Value;

/// Ordered id-to-record map of one collection, with a secondary index from
/// insertion ordinal to id.
///
/// Invariant: every `seq -> id` entry points at a stored record whose `_seq`
/// is `seq`.
#[derive(Debug, Default)]
pub(crate) struct RecordStore {
    records: BTreeMap<Value, Document>,
    seq_index: BTreeMap<u64, Value>,
}

impl RecordStore {
    pub(crate) fn new() -> Self {
        RecordStore {
            records: BTreeMap::new(),
            seq_index: BTreeMap::new(),
        }
    }

    /// Stores `record` at `id`, returning the record it replaced.
    pub(crate) fn put(&mut self, id: Value, record: Document) -> Option<Document> {
        let seq = record.seq();
        let replaced = self.records.insert(id.clone(), record);

        if let Some(old_seq) = replaced.as_ref().and_then(Document::seq) {
            self.seq_index.remove(&old_seq);
        }
        if let Some(seq) = seq {
            self.seq_index.insert(seq, id);
        }
        replaced
    }

    pub(crate) fn get(&self, id: &Value) -> Option<&Document> {
        self.records.get(id)
    }

    pub(crate) fn get_by_seq(&self, seq: u64) -> Option<&Document> {
        self.seq_index.get(&seq).and_then(|id| self.records.get(id))
    }

    pub(crate) fn remove(&mut self, id: &Value) -> Option<Document> {
        let removed = self.records.remove(id)?;
        if let Some(seq) = removed.seq() {
            self.seq_index.remove(&seq);
        }
        Some(removed)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
