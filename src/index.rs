//! Multi-field inverted index.

pub mod field;
pub mod inverted;
pub mod stats;
pub mod table;

pub use self::field::{Field, FieldId, FieldValue};
pub use self::inverted::{Hits, IndexBuilder, InvertedIndex};
pub use self::stats::{FieldStats, IndexStats};
pub use self::table::FieldTable;
