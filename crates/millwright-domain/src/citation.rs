//! Citation module - provenance for every data point

use serde::{Deserialize, Serialize};

/// A citation tying a data point or claim to its source.
///
/// Citations are immutable once created and attach to exactly one
/// [`DataResult`] or extracted claim. A citation is created for every
/// data-access call, including calls that find nothing, so "what was
/// queried" is always recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Source identifier (e.g. "sqlite:assets", "query:daily_metrics")
    pub source: String,

    /// Source table, when the source is a datastore; `table` on the wire
    #[serde(rename = "table", skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,

    /// Record identifier within the source table, when one record backs it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Unix timestamp (seconds) at which the query was executed; `timestamp`
    /// on the wire
    #[serde(rename = "timestamp")]
    pub query_timestamp: u64,

    /// Short excerpt of the cited data, used for claim matching
    pub excerpt: String,
}

impl Citation {
    /// Create a citation for a query against a source table
    pub fn new(
        source: impl Into<String>,
        source_table: impl Into<String>,
        query_timestamp: u64,
        excerpt: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_table: Some(source_table.into()),
            record_id: None,
            query_timestamp,
            excerpt: excerpt.into(),
        }
    }

    /// Create a citation for a derived/computed value with no single source
    /// table (e.g. "query:oee"); the excerpt records the computation inputs
    pub fn for_query(
        source: impl Into<String>,
        query_timestamp: u64,
        excerpt: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_table: None,
            record_id: None,
            query_timestamp,
            excerpt: excerpt.into(),
        }
    }

    /// Attach the identifier of the specific record backing this citation
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// Data plus the citation describing what was queried.
///
/// The unit returned by every data-access call. `data` may be `None` or
/// empty to represent "not found", but a `DataResult` is never returned
/// without its citation.
#[derive(Debug, Clone, PartialEq)]
pub struct DataResult<T> {
    /// The fetched data; empty/`None` means "not found", which is a normal
    /// successful result
    pub data: T,

    /// What was queried, from where, and when
    pub citation: Citation,
}

impl<T> DataResult<T> {
    /// Create a new data result
    pub fn new(data: T, citation: Citation) -> Self {
        Self { data, citation }
    }

    /// Map the data while preserving the citation
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> DataResult<U> {
        DataResult {
            data: f(self.data),
            citation: self.citation,
        }
    }
}
