//! Posting lists.
//!
//! A posting list is the ascending, duplicate-free set of document IDs that
//! share one (field, value) pair. IDs are handed out by the index in
//! increasing order, so appending keeps the list sorted without ever sorting.
//!
//! Removal tombstones the slot instead of shifting the tail. Once tombstones
//! outnumber live entries (and pass a minimum), the list compacts itself.

use ahash::AHashMap;
use bit_vec::BitVec;
use tracing::trace;

use crate::config::DEFAULT_COMPACTION_MIN_SLOTS;
use crate::matcher::Matcher;

/// Identifier of a document inside one index instance.
pub type DocId = u64;

/// An ordered set of document IDs for a single field value.
#[derive(Debug, Clone)]
pub struct PostingList {
    /// Strictly ascending IDs, tombstoned entries included.
    slots: Vec<DocId>,
    /// One bit per slot; set when the slot was removed.
    tombstones: BitVec,
    /// Live ID to slot position.
    positions: AHashMap<DocId, usize>,
    compaction_min_slots: usize,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        Self::with_compaction_min_slots(DEFAULT_COMPACTION_MIN_SLOTS)
    }

    /// Create a new empty posting list with a custom compaction threshold.
    pub fn with_compaction_min_slots(compaction_min_slots: usize) -> Self {
        PostingList {
            slots: Vec::new(),
            tombstones: BitVec::new(),
            positions: AHashMap::new(),
            compaction_min_slots,
        }
    }

    /// Add a document ID. No-op if the ID is already present.
    ///
    /// IDs larger than every slot are appended in O(1). A smaller ID is
    /// inserted at its ordered position, which is O(n) but keeps the list
    /// sorted for callers that do not add in ascending order.
    pub fn add(&mut self, doc_id: DocId) {
        if self.positions.contains_key(&doc_id) {
            return;
        }

        match self.slots.last() {
            Some(&last) if doc_id <= last => self.insert_ordered(doc_id),
            _ => {
                self.positions.insert(doc_id, self.slots.len());
                self.slots.push(doc_id);
                self.tombstones.push(false);
            }
        }
    }

    /// Remove a document ID. No-op if the ID is absent.
    ///
    /// Returns `true` if the list is empty afterwards, so the owner can drop it.
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        if let Some(slot) = self.positions.remove(&doc_id) {
            self.tombstones.set(slot, true);

            if self.positions.is_empty() {
                self.slots.clear();
                self.tombstones = BitVec::new();
            } else {
                self.maybe_compact();
            }
        }

        self.positions.is_empty()
    }

    /// Check whether the ID is in the list.
    pub fn contains(&self, doc_id: DocId) -> bool {
        self.positions.contains_key(&doc_id)
    }

    /// Number of live IDs.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get an ascending iterator over the live IDs.
    pub fn iter(&self) -> PostingIterator<'_> {
        PostingIterator::new(self)
    }

    /// Collect the live IDs in ascending order.
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.iter().doc_ids().collect()
    }

    /// Number of physical slots, tombstones included.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn insert_ordered(&mut self, doc_id: DocId) {
        match self.slots.binary_search(&doc_id) {
            Ok(slot) => {
                // The ID was removed earlier and its slot is still there.
                self.tombstones.set(slot, false);
                self.positions.insert(doc_id, slot);
            }
            Err(slot) => {
                trace!(doc_id, slot, "out-of-order posting insert");
                self.compact();
                let slot = self.slots.partition_point(|&id| id < doc_id);
                self.slots.insert(slot, doc_id);
                self.rebuild();
            }
        }
    }

    fn maybe_compact(&mut self) {
        let dead = self.slots.len() - self.positions.len();
        if dead >= self.compaction_min_slots && dead > self.positions.len() {
            trace!(dead, live = self.positions.len(), "compacting posting list");
            self.compact();
        }
    }

    fn compact(&mut self) {
        let tombstones = &self.tombstones;
        let mut slot = 0;
        self.slots.retain(|_| {
            let live = !tombstones[slot];
            slot += 1;
            live
        });
        self.rebuild();
    }

    /// Reset tombstones and positions from `slots`, which must be all live.
    fn rebuild(&mut self) {
        self.tombstones = BitVec::from_elem(self.slots.len(), false);
        self.positions.clear();
        for (slot, &doc_id) in self.slots.iter().enumerate() {
            self.positions.insert(doc_id, slot);
        }
    }
}

impl Default for PostingList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<DocId> for PostingList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        let mut list = PostingList::new();
        for doc_id in iter {
            list.add(doc_id);
        }
        list
    }
}

/// Lazy ascending iterator over a posting list.
///
/// The iterator borrows the list, so the list cannot change while it is
/// being walked. An iterator over no list at all is immediately exhausted.
#[derive(Debug, Clone)]
pub struct PostingIterator<'a> {
    list: Option<&'a PostingList>,
    /// Always a live slot or one past the end.
    cursor: usize,
    remaining: usize,
}

impl<'a> PostingIterator<'a> {
    fn new(list: &'a PostingList) -> Self {
        let mut iter = PostingIterator {
            list: Some(list),
            cursor: 0,
            remaining: list.len(),
        };
        iter.skip_tombstones();
        iter
    }

    /// Create an iterator that yields nothing.
    pub fn empty() -> Self {
        PostingIterator {
            list: None,
            cursor: 0,
            remaining: 0,
        }
    }

    /// Iterate over an optional list, treating `None` as empty.
    pub fn from_option(list: Option<&'a PostingList>) -> Self {
        list.map_or_else(Self::empty, Self::new)
    }

    fn skip_tombstones(&mut self) {
        if let Some(list) = self.list {
            while self.cursor < list.slots.len() && list.tombstones[self.cursor] {
                self.cursor += 1;
            }
        }
    }
}

impl Matcher for PostingIterator<'_> {
    fn peek(&self) -> Option<DocId> {
        self.list.and_then(|list| list.slots.get(self.cursor).copied())
    }

    fn advance(&mut self) {
        if self.peek().is_some() {
            self.cursor += 1;
            self.remaining -= 1;
            self.skip_tombstones();
        }
    }

    fn remaining_hint(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut list = PostingList::new();
        list.add(1);
        list.add(2);
        list.add(2);
        list.add(1);

        assert_eq!(list.len(), 2);
        assert_eq!(list.doc_ids(), vec![1, 2]);
    }

    #[test]
    fn test_remove_reports_emptiness() {
        let mut list: PostingList = [1, 2].into_iter().collect();

        assert!(!list.remove(1));
        assert!(!list.remove(1));
        assert!(!list.contains(1));
        assert!(list.remove(2));
        assert!(list.is_empty());
        assert_eq!(list.slot_count(), 0);

        // Removing from an empty list is still a no-op that reports empty.
        assert!(list.remove(3));
    }

    #[test]
    fn test_out_of_order_add_keeps_ascending_order() {
        let mut list = PostingList::new();
        for doc_id in [5, 1, 9, 3, 7] {
            list.add(doc_id);
        }
        assert_eq!(list.doc_ids(), vec![1, 3, 5, 7, 9]);

        list.remove(3);
        list.add(3);
        list.add(4);
        assert_eq!(list.doc_ids(), vec![1, 3, 4, 5, 7, 9]);
        assert!(list.contains(4));
    }

    #[test]
    fn test_compaction() {
        let mut list = PostingList::with_compaction_min_slots(2);
        for doc_id in 1..=6 {
            list.add(doc_id);
        }

        list.remove(1);
        list.remove(2);
        list.remove(3);
        assert_eq!(list.slot_count(), 6);

        // Four tombstones against two live entries triggers compaction.
        list.remove(4);
        assert_eq!(list.slot_count(), 2);
        assert_eq!(list.doc_ids(), vec![5, 6]);

        list.add(7);
        assert!(list.contains(7));
        assert!(!list.remove(5));
        assert_eq!(list.doc_ids(), vec![6, 7]);
    }

    #[test]
    fn test_iterator_skips_tombstones() {
        let mut list: PostingList = (1..=5).collect();
        list.remove(1);
        list.remove(3);
        list.remove(5);

        let mut iter = list.iter();
        assert_eq!(iter.remaining_hint(), 2);
        assert_eq!(iter.peek(), Some(2));
        iter.advance();
        assert_eq!(iter.remaining_hint(), 1);
        assert_eq!(iter.peek(), Some(4));
        iter.advance();
        assert_eq!(iter.remaining_hint(), 0);
        assert_eq!(iter.peek(), None);

        // Advancing an exhausted iterator stays exhausted.
        iter.advance();
        assert_eq!(iter.peek(), None);
    }

    #[test]
    fn test_empty_iterator() {
        let iter = PostingIterator::empty();
        assert_eq!(iter.peek(), None);
        assert_eq!(iter.remaining_hint(), 0);

        let iter = PostingIterator::from_option(None);
        assert!(iter.is_exhausted());

        let list = PostingList::new();
        assert!(list.iter().is_exhausted());
    }
}
