//! Field extractors and their type-erased storage.
//!
//! A [`Field`] turns a document into zero or more values of one type. The
//! index keeps one [`FieldTable`] per registered field; because fields of
//! different value types live side by side, the index only sees them through
//! two small object-safe traits:
//!
//! - `FieldExtractor` creates the storage for a field when an index is built.
//! - `FieldSlot` runs the extractor against that storage on add and remove.
//!
//! Typed lookups (queries, [`InvertedIndex::postings`]) find the slot by
//! [`FieldId`] and downcast it back to its concrete type.
//!
//! [`InvertedIndex::postings`]: crate::index::InvertedIndex::postings

use std::any::Any;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::index::inverted::InvertedIndex;
use crate::index::stats::FieldStats;
use crate::index::table::FieldTable;
use crate::posting::{DocId, PostingIterator};
use crate::query::Query;

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Values a field may emit.
pub trait FieldValue: Eq + Hash + Debug + Send + Sync + 'static {}

impl<T: Eq + Hash + Debug + Send + Sync + 'static> FieldValue for T {}

/// Process-unique identity of a [`Field`], shared by all its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(u64);

impl FieldId {
    fn next() -> Self {
        FieldId(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw identifier.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

type Extractor<D, V> = dyn Fn(&D, &mut dyn FnMut(V)) + Send + Sync;

/// One indexing dimension: a pure function from a document to its values.
///
/// A field is a cheap handle. It does not belong to any index, so the same
/// field can be registered on several indexes and queries built from it run
/// against any of them.
///
/// # Example
///
/// ```
/// use pilum::index::Field;
///
/// struct Song {
///     title: String,
///     year: u16,
/// }
///
/// let decade = Field::single("decade", |song: &Song| song.year / 10 * 10);
/// let initials = Field::new("initial", |song: &Song, emit: &mut dyn FnMut(char)| {
///     for word in song.title.split_whitespace() {
///         if let Some(c) = word.chars().next() {
///             emit(c);
///         }
///     }
/// });
///
/// let song = Song { title: "Blue Monday".to_string(), year: 1983 };
/// assert_eq!(decade.extract(&song), vec![1980]);
/// assert_eq!(initials.extract(&song), vec!['B', 'M']);
/// ```
pub struct Field<D, V> {
    inner: Arc<FieldInner<D, V>>,
}

struct FieldInner<D, V> {
    id: FieldId,
    name: String,
    extractor: Box<Extractor<D, V>>,
}

impl<D, V> Field<D, V> {
    /// Create a field from a callback-style extractor that calls `emit`
    /// once per value.
    pub fn new<S, F>(name: S, extractor: F) -> Self
    where
        S: Into<String>,
        F: Fn(&D, &mut dyn FnMut(V)) + Send + Sync + 'static,
    {
        Field {
            inner: Arc::new(FieldInner {
                id: FieldId::next(),
                name: name.into(),
                extractor: Box::new(extractor),
            }),
        }
    }

    /// Create a field that emits exactly one value per document.
    pub fn single<S, F>(name: S, extractor: F) -> Self
    where
        S: Into<String>,
        F: Fn(&D) -> V + Send + Sync + 'static,
    {
        Self::new(name, move |doc: &D, emit: &mut dyn FnMut(V)| emit(extractor(doc)))
    }

    /// Create a field that emits at most one value per document.
    pub fn optional<S, F>(name: S, extractor: F) -> Self
    where
        S: Into<String>,
        F: Fn(&D) -> Option<V> + Send + Sync + 'static,
    {
        Self::new(name, move |doc: &D, emit: &mut dyn FnMut(V)| {
            if let Some(value) = extractor(doc) {
                emit(value);
            }
        })
    }

    /// Create a field that emits every value of an owned collection.
    ///
    /// The collection cannot borrow from the document; use [`Field::new`]
    /// to emit values while walking borrowed data.
    pub fn multi<S, F, I>(name: S, extractor: F) -> Self
    where
        S: Into<String>,
        F: Fn(&D) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = V>,
    {
        Self::new(name, move |doc: &D, emit: &mut dyn FnMut(V)| {
            for value in extractor(doc) {
                emit(value);
            }
        })
    }

    /// Get the field identity.
    pub fn id(&self) -> FieldId {
        self.inner.id
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Run the extractor, calling `f` once per emitted value.
    pub fn for_each_value<F: FnMut(V)>(&self, doc: &D, mut f: F) {
        (self.inner.extractor)(doc, &mut f)
    }

    /// Run the extractor and collect the emitted values.
    pub fn extract(&self, doc: &D) -> Vec<V> {
        let mut values = Vec::new();
        self.for_each_value(doc, |value| values.push(value));
        values
    }
}

impl<D, V> Field<D, V>
where
    D: Eq + Hash + Clone + 'static,
    V: FieldValue,
{
    /// Build a query matching documents for which this field emits `value`.
    pub fn query(&self, value: V) -> Query<D> {
        Query::term(TermLeaf {
            field: self.clone(),
            value,
        })
    }
}

impl<D, V> Clone for Field<D, V> {
    fn clone(&self) -> Self {
        Field {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, V> Debug for Field<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

/// Registration-time view of a field: enough to identify it and to create
/// its storage.
pub(crate) trait FieldExtractor<D>: Send + Sync {
    fn field_id(&self) -> FieldId;

    fn name(&self) -> &str;

    fn create_storage(&self, compaction_min_slots: usize) -> Box<dyn FieldSlot<D>>;
}

impl<D, V> FieldExtractor<D> for Field<D, V>
where
    D: 'static,
    V: FieldValue,
{
    fn field_id(&self) -> FieldId {
        self.id()
    }

    fn name(&self) -> &str {
        Field::name(self)
    }

    fn create_storage(&self, compaction_min_slots: usize) -> Box<dyn FieldSlot<D>> {
        Box::new(TypedFieldSlot {
            field: self.clone(),
            table: FieldTable::new(compaction_min_slots),
        })
    }
}

/// A registered field together with its value table, with the value type erased.
pub(crate) trait FieldSlot<D>: Send + Sync {
    fn name(&self) -> &str;

    /// Add `doc_id` to the posting list of every value the field emits for `doc`.
    fn extract_and_insert(&mut self, doc: &D, doc_id: DocId);

    /// Remove `doc_id` from the posting list of every value the field emits for `doc`.
    fn extract_and_remove(&mut self, doc: &D, doc_id: DocId);

    fn stats(&self) -> FieldStats;

    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct TypedFieldSlot<D, V> {
    field: Field<D, V>,
    table: FieldTable<V>,
}

impl<D, V> TypedFieldSlot<D, V> {
    pub(crate) fn table(&self) -> &FieldTable<V> {
        &self.table
    }
}

impl<D, V> FieldSlot<D> for TypedFieldSlot<D, V>
where
    D: 'static,
    V: FieldValue,
{
    fn name(&self) -> &str {
        self.field.name()
    }

    fn extract_and_insert(&mut self, doc: &D, doc_id: DocId) {
        let table = &mut self.table;
        self.field
            .for_each_value(doc, |value| table.insert(value, doc_id));
    }

    fn extract_and_remove(&mut self, doc: &D, doc_id: DocId) {
        let table = &mut self.table;
        self.field
            .for_each_value(doc, |value| table.remove(&value, doc_id));
    }

    fn stats(&self) -> FieldStats {
        FieldStats {
            name: self.field.name().to_string(),
            value_count: self.table.len(),
            total_postings: self.table.total_postings(),
            max_posting_list_len: self.table.max_posting_list_len(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Query leaf: one value of one field.
pub(crate) struct TermLeaf<D, V> {
    field: Field<D, V>,
    value: V,
}

impl<D, V> TermLeaf<D, V>
where
    D: Eq + Hash + Clone + 'static,
    V: FieldValue,
{
    pub(crate) fn posting_iter<'a>(&self, index: &'a InvertedIndex<D>) -> PostingIterator<'a> {
        index.posting_iter(&self.field, &self.value)
    }

    pub(crate) fn field(&self) -> &Field<D, V> {
        &self.field
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }
}
