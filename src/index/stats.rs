//! Index statistics.

use serde::{Deserialize, Serialize};

use crate::posting::DocId;

/// Statistics about one registered field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Field name.
    pub name: String,
    /// Number of distinct values, i.e. posting lists.
    pub value_count: usize,
    /// Sum of all posting list lengths.
    pub total_postings: usize,
    /// Largest posting list size.
    pub max_posting_list_len: usize,
}

/// Statistics about an inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Index name from the config.
    pub name: String,
    /// Number of live documents.
    pub doc_count: usize,
    /// Last DocID handed out, 0 if none yet.
    pub last_doc_id: DocId,
    /// Total number of posting lists across all fields.
    pub posting_list_count: usize,
    /// Total number of postings across all fields.
    pub total_postings: usize,
    /// Per-field breakdown, in registration order.
    pub fields: Vec<FieldStats>,
}

impl IndexStats {
    /// Average postings per list, 0.0 for an empty index.
    pub fn avg_postings_per_list(&self) -> f64 {
        if self.posting_list_count > 0 {
            self.total_postings as f64 / self.posting_list_count as f64
        } else {
            0.0
        }
    }
}
