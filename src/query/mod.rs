pub mod engine;
pub mod topk;

use crate::index::types::{DocId, HitCount};
use serde::{Deserialize, Serialize};

pub use engine::{QueryEngine, answer};
pub use topk::{RankedEntry, TopKHeap, select_top_k};

/// Maximum number of hits returned per query
pub const MAX_RESULTS: usize = 5;

/// One ranked document for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    /// Sum of the document's hit counts over all query words
    pub hit_count: HitCount,
}

/// A query together with its ranked hits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub hits: Vec<SearchHit>,
}
