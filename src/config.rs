//! Configuration for inverted indexes.

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};

/// Default number of slots a posting list must hold in tombstones before it
/// is considered for compaction.
pub const DEFAULT_COMPACTION_MIN_SLOTS: usize = 64;

/// Configuration for an [`InvertedIndex`](crate::index::InvertedIndex).
///
/// # Example
///
/// ```
/// use pilum::config::IndexConfig;
///
/// let config = IndexConfig::from_json(r#"{ "name": "books", "doc_capacity": 1024 }"#).unwrap();
/// assert_eq!(config.name, "books");
/// assert_eq!(config.doc_capacity, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Name of the index, attached to log events.
    pub name: String,

    /// Number of documents to pre-allocate room for in the document maps.
    pub doc_capacity: usize,

    /// Minimum number of tombstoned slots before a posting list compacts.
    ///
    /// A posting list compacts once its tombstones reach this count and
    /// outnumber its live entries. Lower values trade CPU for memory.
    pub compaction_min_slots: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            name: "default".to_string(),
            doc_capacity: 0,
            compaction_min_slots: DEFAULT_COMPACTION_MIN_SLOTS,
        }
    }
}

impl IndexConfig {
    /// Create a config with the given index name and default settings.
    pub fn new<S: Into<String>>(name: S) -> Self {
        IndexConfig {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the document capacity hint.
    pub fn with_doc_capacity(mut self, doc_capacity: usize) -> Self {
        self.doc_capacity = doc_capacity;
        self
    }

    /// Set the compaction threshold for posting lists.
    pub fn with_compaction_min_slots(mut self, slots: usize) -> Self {
        self.compaction_min_slots = slots;
        self
    }

    /// Parse and validate a config from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the index cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PilumError::invalid_config("index name must not be empty"));
        }
        Ok(())
    }
}
