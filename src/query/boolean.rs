//! Clause-based builder on top of the AND/OR/NOT algebra.

use crate::query::Query;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause<D> {
    /// The query for this clause.
    pub query: Query<D>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl<D> BooleanClause<D> {
    /// Create a new boolean clause.
    pub fn new(query: Query<D>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }
}

/// Builder for clause-style boolean queries.
///
/// The built query is:
/// - all MUST clauses AND-ed together,
/// - AND-ed with the OR of all SHOULD clauses (which stand alone when there
///   are no MUST clauses),
/// - minus the OR of all MUST_NOT clauses.
///
/// With no MUST or SHOULD clause there is nothing to subtract from, so the
/// result matches nothing.
///
/// # Example
///
/// ```
/// use pilum::prelude::*;
///
/// let even = Field::single("even", |n: &u32| n % 2 == 0);
/// let small = Field::single("small", |n: &u32| *n < 5);
/// let mut index = InvertedIndex::builder().field(&even).field(&small).build().unwrap();
/// index.add_all(0..10);
///
/// let query = BooleanQueryBuilder::new()
///     .must(even.query(true))
///     .must_not(small.query(true))
///     .build();
/// let hits: Vec<u32> = index.evaluate(&query).copied().collect();
/// assert_eq!(hits, vec![6, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct BooleanQueryBuilder<D> {
    clauses: Vec<BooleanClause<D>>,
}

impl<D> BooleanQueryBuilder<D> {
    /// Create a new boolean query builder.
    pub fn new() -> Self {
        BooleanQueryBuilder {
            clauses: Vec::new(),
        }
    }

    /// Add a clause.
    pub fn clause(mut self, clause: BooleanClause<D>) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Add a MUST clause.
    pub fn must(self, query: Query<D>) -> Self {
        self.clause(BooleanClause::new(query, Occur::Must))
    }

    /// Add a SHOULD clause.
    pub fn should(self, query: Query<D>) -> Self {
        self.clause(BooleanClause::new(query, Occur::Should))
    }

    /// Add a MUST_NOT clause.
    pub fn must_not(self, query: Query<D>) -> Self {
        self.clause(BooleanClause::new(query, Occur::MustNot))
    }

    /// Get the clauses added so far.
    pub fn clauses(&self) -> &[BooleanClause<D>] {
        &self.clauses
    }

    /// Check if no clause was added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Build the query.
    pub fn build(self) -> Query<D> {
        let mut must = Vec::new();
        let mut should = Vec::new();
        let mut must_not = Vec::new();
        for clause in self.clauses {
            match clause.occur {
                Occur::Must => must.push(clause.query),
                Occur::Should => should.push(clause.query),
                Occur::MustNot => must_not.push(clause.query),
            }
        }

        if !should.is_empty() {
            must.push(collapse(should, Query::or));
        }
        if must.is_empty() {
            return Query::empty();
        }

        let positive = collapse(must, Query::and);
        if must_not.is_empty() {
            positive
        } else {
            Query::not(positive, collapse(must_not, Query::or))
        }
    }
}

impl<D> Default for BooleanQueryBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine non-empty `queries`, skipping the wrapper for a single query.
fn collapse<D>(mut queries: Vec<Query<D>>, combine: fn(Vec<Query<D>>) -> Query<D>) -> Query<D> {
    if queries.len() == 1 {
        queries.remove(0)
    } else {
        combine(queries)
    }
}
