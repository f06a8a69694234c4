//! In-memory inverted index over arbitrary documents.
//!
//! The index owns the document <-> DocID bijection and one value table per
//! registered field. Adding a document hands it the next DocID and fans it
//! out to every field; removing it reverses both steps under the same
//! `&mut self` borrow, so a half-removed document is never observable.
//!
//! Enumerating documents or query hits borrows the index immutably. The
//! borrow checker therefore rejects any attempt to add or remove documents
//! while a result sequence is still alive.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;
use tracing::{debug, trace};

use crate::config::IndexConfig;
use crate::error::{PilumError, Result};
use crate::index::field::{Field, FieldExtractor, FieldId, FieldSlot, FieldValue, TypedFieldSlot};
use crate::index::stats::IndexStats;
use crate::index::table::FieldTable;
use crate::matcher::Matcher;
use crate::posting::{DocId, PostingIterator, PostingList};
use crate::query::Query;

/// An inverted index over documents of type `D`.
///
/// # Example
///
/// ```
/// use pilum::prelude::*;
///
/// let length = Field::single("length", |word: &&str| word.len());
/// let mut index = InvertedIndex::builder().field(&length).build().unwrap();
///
/// index.add_all(["fig", "pear", "plum", "kiwi"]);
/// assert!(index.remove(&"kiwi"));
///
/// let hits: Vec<_> = index.evaluate(&length.query(4)).collect();
/// assert_eq!(hits, vec![&"pear", &"plum"]);
/// ```
pub struct InvertedIndex<D> {
    config: IndexConfig,
    /// Last DocID handed out. Never reused by this instance.
    last_doc_id: DocId,
    docs: AHashMap<DocId, D>,
    doc_ids: AHashMap<D, DocId>,
    fields: Vec<Box<dyn FieldSlot<D>>>,
    field_positions: AHashMap<FieldId, usize>,
}

impl<D> InvertedIndex<D>
where
    D: Eq + Hash + Clone + 'static,
{
    /// Start building an index.
    pub fn builder() -> IndexBuilder<D> {
        IndexBuilder::new()
    }

    /// Create an index without fields. Queries on it match nothing, but it
    /// still tracks documents.
    pub fn new(config: IndexConfig) -> Result<Self> {
        IndexBuilder::new().config(config).build()
    }

    /// Index a document.
    ///
    /// Returns `false` without doing anything if an equal document is
    /// already indexed.
    pub fn add(&mut self, doc: D) -> bool {
        if self.doc_ids.contains_key(&doc) {
            return false;
        }

        self.last_doc_id += 1;
        let doc_id = self.last_doc_id;

        for field in &mut self.fields {
            field.extract_and_insert(&doc, doc_id);
        }
        self.docs.insert(doc_id, doc.clone());
        self.doc_ids.insert(doc, doc_id);

        trace!(index = %self.config.name, doc_id, "added document");
        true
    }

    /// Index every document; returns whether any of them was new.
    pub fn add_all<I>(&mut self, docs: I) -> bool
    where
        I: IntoIterator<Item = D>,
    {
        let mut added = false;
        for doc in docs {
            added |= self.add(doc);
        }
        added
    }

    /// Remove a document from the index and from every field.
    ///
    /// Returns `false` if the document was not indexed.
    pub fn remove<Q>(&mut self, doc: &Q) -> bool
    where
        D: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(doc_id) = self.doc_ids.remove(doc) else {
            return false;
        };

        if let Some(stored) = self.docs.remove(&doc_id) {
            for field in &mut self.fields {
                field.extract_and_remove(&stored, doc_id);
            }
        }

        trace!(index = %self.config.name, doc_id, "removed document");
        true
    }

    /// Remove every document; returns whether any of them was indexed.
    pub fn remove_all<I>(&mut self, docs: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<D>,
    {
        let mut removed = false;
        for doc in docs {
            let doc: &D = doc.borrow();
            removed |= self.remove(doc);
        }
        removed
    }

    /// Check whether a document is indexed.
    pub fn contains<Q>(&self, doc: &Q) -> bool
    where
        D: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.doc_ids.contains_key(doc)
    }

    /// Get the DocID of an indexed document.
    pub fn doc_id<Q>(&self, doc: &Q) -> Option<DocId>
    where
        D: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.doc_ids.get(doc).copied()
    }

    /// Get the document behind a DocID.
    pub fn doc(&self, doc_id: DocId) -> Option<&D> {
        self.docs.get(&doc_id)
    }

    /// Every indexed document exactly once, in no particular order.
    pub fn docs(&self) -> impl Iterator<Item = &D> {
        self.docs.values()
    }

    /// Evaluate a query, yielding matching documents in DocID order.
    pub fn evaluate(&self, query: &Query<D>) -> Hits<'_, D> {
        Hits {
            docs: &self.docs,
            matcher: query.matcher(self),
        }
    }

    /// Evaluate a query down to its DocIDs.
    pub fn matcher(&self, query: &Query<D>) -> Box<dyn Matcher + '_> {
        query.matcher(self)
    }

    /// Count the documents matching a query.
    pub fn count(&self, query: &Query<D>) -> usize {
        query.matcher(self).doc_ids().count()
    }

    /// Get the posting list of one field value, if any live document has it.
    ///
    /// `None` also covers fields this index never registered.
    pub fn postings<V: FieldValue>(&self, field: &Field<D, V>, value: &V) -> Option<&PostingList> {
        self.table(field)?.get(value)
    }

    /// Iterate over the distinct values a field currently holds.
    pub fn field_values<V: FieldValue>(
        &self,
        field: &Field<D, V>,
    ) -> Option<impl Iterator<Item = &V>> {
        self.table(field).map(FieldTable::values)
    }

    /// Check whether a field is registered on this index.
    pub fn has_field<V>(&self, field: &Field<D, V>) -> bool {
        self.field_positions.contains_key(&field.id())
    }

    /// Names of the registered fields, in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name())
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Get the index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Collect statistics about the index.
    pub fn stats(&self) -> IndexStats {
        let fields: Vec<_> = self.fields.iter().map(|field| field.stats()).collect();
        IndexStats {
            name: self.config.name.clone(),
            doc_count: self.docs.len(),
            last_doc_id: self.last_doc_id,
            posting_list_count: fields.iter().map(|field| field.value_count).sum(),
            total_postings: fields.iter().map(|field| field.total_postings).sum(),
            fields,
        }
    }

    /// Iterator over one field value's posting list; empty when unknown.
    pub(crate) fn posting_iter<V: FieldValue>(
        &self,
        field: &Field<D, V>,
        value: &V,
    ) -> PostingIterator<'_> {
        if !self.has_field(field) {
            debug!(
                index = %self.config.name,
                field = field.name(),
                "query field is not registered on this index"
            );
        }
        PostingIterator::from_option(self.postings(field, value))
    }

    fn table<V: FieldValue>(&self, field: &Field<D, V>) -> Option<&FieldTable<V>> {
        let &position = self.field_positions.get(&field.id())?;
        self.fields[position]
            .as_any()
            .downcast_ref::<TypedFieldSlot<D, V>>()
            .map(TypedFieldSlot::table)
    }
}

impl<D> fmt::Debug for InvertedIndex<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvertedIndex")
            .field("name", &self.config.name)
            .field("docs", &self.docs.len())
            .field("last_doc_id", &self.last_doc_id)
            .field(
                "fields",
                &self.fields.iter().map(|field| field.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`InvertedIndex`].
pub struct IndexBuilder<D> {
    config: IndexConfig,
    extractors: Vec<Box<dyn FieldExtractor<D>>>,
}

impl<D> IndexBuilder<D>
where
    D: Eq + Hash + Clone + 'static,
{
    /// Create a builder with the default config and no fields.
    pub fn new() -> Self {
        IndexBuilder {
            config: IndexConfig::default(),
            extractors: Vec::new(),
        }
    }

    /// Set the index configuration.
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a field. The index gets its own empty table for it.
    pub fn field<V: FieldValue>(mut self, field: &Field<D, V>) -> Self {
        self.extractors.push(Box::new(field.clone()));
        self
    }

    /// Validate the config and fields and create the index.
    ///
    /// Fails if the config is invalid, if the same field is registered
    /// twice, or if two different fields share a name.
    pub fn build(self) -> Result<InvertedIndex<D>> {
        self.config.validate()?;

        let mut fields: Vec<Box<dyn FieldSlot<D>>> = Vec::with_capacity(self.extractors.len());
        let mut field_positions = AHashMap::with_capacity(self.extractors.len());

        for extractor in &self.extractors {
            if field_positions.contains_key(&extractor.field_id()) {
                return Err(PilumError::field(format!(
                    "field '{}' is registered twice",
                    extractor.name()
                )));
            }
            if fields.iter().any(|field| field.name() == extractor.name()) {
                return Err(PilumError::field(format!(
                    "another field is already named '{}'",
                    extractor.name()
                )));
            }

            field_positions.insert(extractor.field_id(), fields.len());
            fields.push(extractor.create_storage(self.config.compaction_min_slots));
        }

        debug!(
            index = %self.config.name,
            fields = fields.len(),
            "built inverted index"
        );

        Ok(InvertedIndex {
            last_doc_id: 0,
            docs: AHashMap::with_capacity(self.config.doc_capacity),
            doc_ids: AHashMap::with_capacity(self.config.doc_capacity),
            fields,
            field_positions,
            config: self.config,
        })
    }
}

impl<D> Default for IndexBuilder<D>
where
    D: Eq + Hash + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy sequence of documents matching a query.
///
/// Dropping it early is the way to stop; nothing needs cleaning up.
pub struct Hits<'a, D> {
    docs: &'a AHashMap<DocId, D>,
    matcher: Box<dyn Matcher + 'a>,
}

impl<D> Hits<'_, D> {
    /// Remaining-count hint of the underlying matcher tree.
    pub fn remaining_hint(&self) -> usize {
        self.matcher.remaining_hint()
    }
}

impl<'a, D> Iterator for Hits<'a, D> {
    type Item = &'a D;

    fn next(&mut self) -> Option<&'a D> {
        loop {
            let doc_id = self.matcher.peek()?;
            self.matcher.advance();
            if let Some(doc) = self.docs.get(&doc_id) {
                return Some(doc);
            }
        }
    }
}

impl<D> fmt::Debug for Hits<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hits")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}
