//! Per-field value tables.

use std::hash::Hash;

use ahash::AHashMap;

use crate::posting::{DocId, PostingList};

/// Maps each value of one field to the posting list of documents that emit it.
///
/// Entries whose posting list becomes empty are dropped, so the table only
/// ever holds values that some live document still has.
#[derive(Debug, Clone)]
pub struct FieldTable<V> {
    postings: AHashMap<V, PostingList>,
    compaction_min_slots: usize,
}

impl<V: Eq + Hash> FieldTable<V> {
    /// Create an empty table whose posting lists use the given compaction threshold.
    pub fn new(compaction_min_slots: usize) -> Self {
        FieldTable {
            postings: AHashMap::new(),
            compaction_min_slots,
        }
    }

    /// Record that `doc_id` has `value`, creating the posting list if needed.
    pub fn insert(&mut self, value: V, doc_id: DocId) {
        let compaction_min_slots = self.compaction_min_slots;
        self.postings
            .entry(value)
            .or_insert_with(|| PostingList::with_compaction_min_slots(compaction_min_slots))
            .add(doc_id);
    }

    /// Forget that `doc_id` has `value`, dropping the entry once it is empty.
    pub fn remove(&mut self, value: &V, doc_id: DocId) {
        if let Some(list) = self.postings.get_mut(value) {
            if list.remove(doc_id) {
                self.postings.remove(value);
            }
        }
    }

    /// Get the posting list for a value.
    pub fn get(&self, value: &V) -> Option<&PostingList> {
        self.postings.get(value)
    }

    /// Check whether any live document has this value.
    pub fn contains_value(&self, value: &V) -> bool {
        self.postings.contains_key(value)
    }

    /// Iterate over the distinct values currently in the table.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.postings.keys()
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Sum of all posting list lengths.
    pub fn total_postings(&self) -> usize {
        self.postings.values().map(PostingList::len).sum()
    }

    /// Length of the longest posting list.
    pub fn max_posting_list_len(&self) -> usize {
        self.postings.values().map(PostingList::len).max().unwrap_or(0)
    }
}
