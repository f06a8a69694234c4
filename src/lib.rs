//! # Pilum
//!
//! An embeddable, in-memory inverted index with boolean retrieval over
//! arbitrary document types.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Multi-field indexing with typed, possibly multi-valued field extractors
//! - Lazy AND/OR/NOT merge matchers over ascending posting lists
//! - Reusable, index-independent query trees
//!
//! ## Example
//!
//! ```
//! use pilum::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct Doc {
//!     i: i64,
//!     s: &'static str,
//! }
//!
//! let is_even = Field::single("is_even", |doc: &Doc| doc.i % 2 == 0);
//! let rune = Field::new("rune", |doc: &Doc, emit: &mut dyn FnMut(char)| {
//!     for c in doc.s.chars() {
//!         emit(c);
//!     }
//! });
//!
//! let mut index = InvertedIndex::builder()
//!     .field(&is_even)
//!     .field(&rune)
//!     .build()?;
//! index.add_all([Doc { i: 0, s: "roo" }, Doc { i: 1, s: "bar" }, Doc { i: 2, s: "baz" }]);
//!
//! let query = Query::and([is_even.query(true), rune.query('z')]);
//! let hits: Vec<_> = index.evaluate(&query).collect();
//! assert_eq!(hits, vec![&Doc { i: 2, s: "baz" }]);
//! # Ok::<(), pilum::error::PilumError>(())
//! ```
//!
//! ## Concurrency
//!
//! An index is a plain single-threaded structure with no internal locking.
//! Share it across threads behind your own lock.

pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod posting;
pub mod query;

pub mod prelude {
    pub use crate::config::IndexConfig;
    pub use crate::error::{PilumError, Result};
    pub use crate::index::{Field, FieldId, IndexBuilder, IndexStats, InvertedIndex};
    pub use crate::matcher::Matcher;
    pub use crate::posting::{DocId, PostingList};
    pub use crate::query::{BooleanQueryBuilder, Query};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
