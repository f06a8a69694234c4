//! Boolean query algebra.
//!
//! A [`Query`] is an immutable expression tree that knows nothing about any
//! particular index. Evaluating it against an index builds a fresh tree of
//! lazy matchers over that index's current posting lists, so one query can be
//! reused across evaluations and across indexes that register the same fields.

pub mod boolean;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::index::field::{FieldValue, TermLeaf};
use crate::index::inverted::InvertedIndex;
use crate::matcher::{
    ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, ExclusionMatcher, Matcher,
};

pub use self::boolean::BooleanQueryBuilder;

/// A boolean retrieval query over documents of type `D`.
///
/// Leaves come from [`Field::query`](crate::index::Field::query); the
/// combinators are [`Query::and`], [`Query::or`] and [`Query::not`].
/// Cloning is cheap: subtrees are shared.
pub struct Query<D> {
    node: Arc<QueryNode<D>>,
}

enum QueryNode<D> {
    Term(Box<dyn TermLookup<D>>),
    And(Vec<Query<D>>),
    Or(Vec<Query<D>>),
    Not { positive: Query<D>, negative: Query<D> },
}

/// A leaf with its field value type erased.
trait TermLookup<D>: Send + Sync {
    fn matcher<'a>(&self, index: &'a InvertedIndex<D>) -> Box<dyn Matcher + 'a>;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<D, V> TermLookup<D> for TermLeaf<D, V>
where
    D: Eq + Hash + Clone + 'static,
    V: FieldValue,
{
    fn matcher<'a>(&self, index: &'a InvertedIndex<D>) -> Box<dyn Matcher + 'a> {
        Box::new(self.posting_iter(index))
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.field().name(), self.value())
    }
}

impl<D> Query<D> {
    fn from_node(node: QueryNode<D>) -> Self {
        Query {
            node: Arc::new(node),
        }
    }

    pub(crate) fn term<V>(leaf: TermLeaf<D, V>) -> Self
    where
        D: Eq + Hash + Clone + 'static,
        V: FieldValue,
    {
        Self::from_node(QueryNode::Term(Box::new(leaf)))
    }

    /// Documents matching every query. With no queries, matches nothing.
    pub fn and<I: IntoIterator<Item = Query<D>>>(queries: I) -> Self {
        Self::from_node(QueryNode::And(queries.into_iter().collect()))
    }

    /// Documents matching at least one query. With no queries, matches nothing.
    pub fn or<I: IntoIterator<Item = Query<D>>>(queries: I) -> Self {
        Self::from_node(QueryNode::Or(queries.into_iter().collect()))
    }

    /// Documents matching `positive` but not `negative`.
    pub fn not(positive: Query<D>, negative: Query<D>) -> Self {
        Self::from_node(QueryNode::Not { positive, negative })
    }

    /// A query that matches nothing.
    pub fn empty() -> Self {
        Self::or(Vec::new())
    }

    /// Build the matcher tree for this query over the index's current state.
    pub fn matcher<'a>(&self, index: &'a InvertedIndex<D>) -> Box<dyn Matcher + 'a> {
        match &*self.node {
            QueryNode::Term(leaf) => leaf.matcher(index),
            QueryNode::And(queries) => Self::fold(queries, index, |left, right| {
                Box::new(ConjunctionMatcher::new(left, right)) as Box<dyn Matcher + 'a>
            }),
            QueryNode::Or(queries) => Self::fold(queries, index, |left, right| {
                Box::new(DisjunctionMatcher::new(left, right)) as Box<dyn Matcher + 'a>
            }),
            QueryNode::Not { positive, negative } => Box::new(ExclusionMatcher::new(
                positive.matcher(index),
                negative.matcher(index),
            )),
        }
    }

    /// Left-to-right pairwise merge of the children's matchers.
    fn fold<'a, F>(
        queries: &[Query<D>],
        index: &'a InvertedIndex<D>,
        merge: F,
    ) -> Box<dyn Matcher + 'a>
    where
        F: FnMut(Box<dyn Matcher + 'a>, Box<dyn Matcher + 'a>) -> Box<dyn Matcher + 'a>,
    {
        let mut matchers = queries.iter().map(|query| query.matcher(index));
        match matchers.next() {
            Some(first) => matchers.fold(first, merge),
            None => Box::new(EmptyMatcher),
        }
    }
}

impl<D> Clone for Query<D> {
    fn clone(&self) -> Self {
        Query {
            node: Arc::clone(&self.node),
        }
    }
}

impl<D> fmt::Display for Query<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            QueryNode::Term(leaf) => leaf.describe(f),
            QueryNode::And(queries) => write_group(f, "AND", queries),
            QueryNode::Or(queries) => write_group(f, "OR", queries),
            QueryNode::Not { positive, negative } => write!(f, "({positive} NOT {negative})"),
        }
    }
}

impl<D> fmt::Debug for Query<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&format_args!("{self}")).finish()
    }
}

fn write_group<D>(f: &mut fmt::Formatter<'_>, op: &str, queries: &[Query<D>]) -> fmt::Result {
    if queries.is_empty() {
        return write!(f, "{op}()");
    }

    write!(f, "(")?;
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{query}")?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Field;
    use crate::posting::DocId;

    fn number_index() -> (InvertedIndex<u32>, Field<u32, bool>, Field<u32, u32>) {
        let even = Field::single("even", |n: &u32| n % 2 == 0);
        let mod3 = Field::single("mod3", |n: &u32| n % 3);
        let mut index = InvertedIndex::builder()
            .field(&even)
            .field(&mod3)
            .build()
            .unwrap();
        index.add_all(0..12);
        (index, even, mod3)
    }

    fn numbers(index: &InvertedIndex<u32>, query: &Query<u32>) -> Vec<u32> {
        index.evaluate(query).copied().collect()
    }

    #[test]
    fn test_empty_combinators_match_nothing() {
        let (index, _, _) = number_index();

        assert!(numbers(&index, &Query::and(Vec::new())).is_empty());
        assert!(numbers(&index, &Query::or(Vec::new())).is_empty());
        assert!(numbers(&index, &Query::empty()).is_empty());
    }

    #[test]
    fn test_single_child_is_transparent() {
        let (index, even, _) = number_index();

        let expected = numbers(&index, &even.query(true));
        assert_eq!(expected, vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(numbers(&index, &Query::and([even.query(true)])), expected);
        assert_eq!(numbers(&index, &Query::or([even.query(true)])), expected);
    }

    #[test]
    fn test_combinators() {
        let (index, even, mod3) = number_index();

        let and = Query::and([even.query(true), mod3.query(0)]);
        assert_eq!(numbers(&index, &and), vec![0, 6]);

        let or = Query::or([mod3.query(1), mod3.query(2), even.query(true)]);
        assert_eq!(numbers(&index, &or), vec![0, 1, 2, 4, 5, 6, 7, 8, 10, 11]);

        let not = Query::not(even.query(false), mod3.query(0));
        assert_eq!(numbers(&index, &not), vec![1, 5, 7, 11]);

        let nested = Query::not(or.clone(), and.clone());
        assert_eq!(numbers(&index, &nested), vec![1, 2, 4, 5, 7, 8, 10, 11]);

        let unseen = Query::and([even.query(true), mod3.query(7)]);
        assert!(numbers(&index, &unseen).is_empty());
    }

    #[test]
    fn test_query_reflects_current_index_state() {
        let (mut index, even, _) = number_index();
        let query = even.query(true);

        assert_eq!(index.count(&query), 6);
        index.remove(&0u32);
        index.remove(&2u32);
        assert_eq!(index.count(&query), 4);
        index.add(100);
        assert_eq!(numbers(&index, &query), vec![4, 6, 8, 10, 100]);
    }

    #[test]
    fn test_matcher_yields_doc_ids() {
        let (index, even, mod3) = number_index();
        let query = Query::and([even.query(false), mod3.query(1)]);

        // Numbers 0..12 were added in order, so DocID = n + 1.
        let doc_ids: Vec<DocId> = index.matcher(&query).doc_ids().collect();
        assert_eq!(doc_ids, vec![2, 8]);
    }

    #[test]
    fn test_display() {
        let even = Field::single("even", |n: &u32| n % 2 == 0);
        let name = Field::single("name", |n: &u32| n.to_string());

        let query = Query::not(
            Query::or([even.query(true), name.query("7".to_string())]),
            Query::and([even.query(false)]),
        );
        assert_eq!(query.to_string(), r#"((even:true OR name:"7") NOT (even:false))"#);
        assert_eq!(Query::<u32>::empty().to_string(), "OR()");
        assert_eq!(Query::<u32>::and(Vec::new()).to_string(), "AND()");
        assert!(format!("{query:?}").starts_with("Query("));
    }
}
