//! Matcher implementations for query execution.
//!
//! A [`Matcher`] is a lazy cursor over an ascending, duplicate-free stream of
//! document IDs. The merge matchers combine two such streams in a single
//! linear pass and are matchers themselves, so they nest into arbitrarily
//! deep AND/OR/NOT trees.

use std::fmt::Debug;
use std::ops::ControlFlow;

use crate::posting::DocId;

/// Trait for document matchers.
pub trait Matcher: Debug {
    /// Get the current document ID, or `None` once exhausted.
    fn peek(&self) -> Option<DocId>;

    /// Move past the current document. No-op once exhausted.
    fn advance(&mut self);

    /// Estimate of how many documents are left.
    ///
    /// Exact for a single posting list. For merged matchers it follows the
    /// merge rule (min for AND, max for OR, positive side for NOT), so it is
    /// a cost estimate rather than a bound.
    fn remaining_hint(&self) -> usize;

    /// Check if this matcher is exhausted.
    fn is_exhausted(&self) -> bool {
        self.peek().is_none()
    }

    /// Advance until the current document is `>= target`.
    ///
    /// Returns `false` if the matcher ran out first.
    fn skip_to(&mut self, target: DocId) -> bool {
        loop {
            match self.peek() {
                Some(doc_id) if doc_id >= target => return true,
                Some(_) => self.advance(),
                None => return false,
            }
        }
    }

    /// Feed every remaining document to `f` until it asks to stop.
    fn visit<F>(&mut self, mut f: F) -> ControlFlow<()>
    where
        Self: Sized,
        F: FnMut(DocId) -> ControlFlow<()>,
    {
        while let Some(doc_id) = self.peek() {
            f(doc_id)?;
            self.advance();
        }
        ControlFlow::Continue(())
    }

    /// Turn this matcher into a standard iterator of document IDs.
    fn doc_ids(self) -> DocIds<Self>
    where
        Self: Sized,
    {
        DocIds { matcher: self }
    }
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn peek(&self) -> Option<DocId> {
        (**self).peek()
    }

    fn advance(&mut self) {
        (**self).advance()
    }

    fn remaining_hint(&self) -> usize {
        (**self).remaining_hint()
    }
}

/// Pull-style adapter returned by [`Matcher::doc_ids`].
#[derive(Debug)]
pub struct DocIds<M> {
    matcher: M,
}

impl<M: Matcher> DocIds<M> {
    /// Get back the underlying matcher.
    pub fn into_inner(self) -> M {
        self.matcher
    }
}

impl<M: Matcher> Iterator for DocIds<M> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        let doc_id = self.matcher.peek()?;
        self.matcher.advance();
        Some(doc_id)
    }
}

/// A matcher that matches no documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    /// Create a new empty matcher.
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn peek(&self) -> Option<DocId> {
        None
    }

    fn advance(&mut self) {}

    fn remaining_hint(&self) -> usize {
        0
    }
}

/// Intersection (AND) of two matchers.
///
/// Between calls both sides sit on the same document, or at least one side
/// is exhausted.
#[derive(Debug)]
pub struct ConjunctionMatcher<L, R> {
    left: L,
    right: R,
}

impl<L: Matcher, R: Matcher> ConjunctionMatcher<L, R> {
    /// Create a new conjunction matcher.
    pub fn new(left: L, right: R) -> Self {
        let mut matcher = ConjunctionMatcher { left, right };
        matcher.align();
        matcher
    }

    /// Move the side that is behind until both agree or one runs out.
    fn align(&mut self) {
        while let (Some(left), Some(right)) = (self.left.peek(), self.right.peek()) {
            if left == right {
                return;
            }
            if left < right {
                self.left.advance();
            } else {
                self.right.advance();
            }
        }
    }
}

impl<L: Matcher, R: Matcher> Matcher for ConjunctionMatcher<L, R> {
    fn peek(&self) -> Option<DocId> {
        match (self.left.peek(), self.right.peek()) {
            (Some(doc_id), Some(_)) => Some(doc_id),
            _ => None,
        }
    }

    fn advance(&mut self) {
        if self.is_exhausted() {
            return;
        }
        self.left.advance();
        self.align();
    }

    fn remaining_hint(&self) -> usize {
        self.left.remaining_hint().min(self.right.remaining_hint())
    }
}

/// Union (OR) of two matchers, deduplicated.
#[derive(Debug)]
pub struct DisjunctionMatcher<L, R> {
    left: L,
    right: R,
}

impl<L: Matcher, R: Matcher> DisjunctionMatcher<L, R> {
    /// Create a new disjunction matcher.
    pub fn new(left: L, right: R) -> Self {
        DisjunctionMatcher { left, right }
    }
}

impl<L: Matcher, R: Matcher> Matcher for DisjunctionMatcher<L, R> {
    fn peek(&self) -> Option<DocId> {
        match (self.left.peek(), self.right.peek()) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (left, right) => left.or(right),
        }
    }

    fn advance(&mut self) {
        match (self.left.peek(), self.right.peek()) {
            (Some(left), Some(right)) => {
                if left <= right {
                    self.left.advance();
                }
                if right <= left {
                    self.right.advance();
                }
            }
            (Some(_), None) => self.left.advance(),
            (None, Some(_)) => self.right.advance(),
            (None, None) => {}
        }
    }

    fn remaining_hint(&self) -> usize {
        self.left.remaining_hint().max(self.right.remaining_hint())
    }
}

/// Difference (NOT) of two matchers: documents of `positive` that are not
/// in `negative`, in `positive`'s order.
///
/// Between calls the positive side is strictly below the negative side, or
/// the negative side is exhausted.
#[derive(Debug)]
pub struct ExclusionMatcher<P, N> {
    positive: P,
    negative: N,
}

impl<P: Matcher, N: Matcher> ExclusionMatcher<P, N> {
    /// Create a new exclusion matcher.
    pub fn new(positive: P, negative: N) -> Self {
        let mut matcher = ExclusionMatcher { positive, negative };
        matcher.align();
        matcher
    }

    /// Skip excluded positives and stale negatives.
    fn align(&mut self) {
        while let Some(positive) = self.positive.peek() {
            match self.negative.peek() {
                Some(negative) if negative == positive => {
                    self.positive.advance();
                    self.negative.advance();
                }
                Some(negative) if negative < positive => self.negative.advance(),
                _ => return,
            }
        }
    }
}

impl<P: Matcher, N: Matcher> Matcher for ExclusionMatcher<P, N> {
    fn peek(&self) -> Option<DocId> {
        self.positive.peek()
    }

    fn advance(&mut self) {
        self.positive.advance();
        self.align();
    }

    fn remaining_hint(&self) -> usize {
        self.positive.remaining_hint()
    }
}
