use serde::{Deserialize, Serialize};

/// Identifier of a document within one index generation.
/// Assigned 0, 1, 2, ... in read order; not stable across rebuilds.
pub type DocId = usize;

/// Number of occurrences of a term
pub type HitCount = usize;

/// Posting entry - a document containing a term and how often it occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub hit_count: HitCount,
}

impl Posting {
    #[inline]
    pub fn new(doc_id: DocId, hit_count: HitCount) -> Self {
        Self { doc_id, hit_count }
    }
}

impl From<(DocId, HitCount)> for Posting {
    fn from((doc_id, hit_count): (DocId, HitCount)) -> Self {
        Self { doc_id, hit_count }
    }
}

/// Summary numbers for one index generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents (including empty ones)
    pub documents: usize,
    /// Number of distinct terms
    pub terms: usize,
    /// Total posting entries across all terms
    pub postings: usize,
    /// Total token occurrences across all documents
    pub tokens: usize,
    /// Length of the longest posting list
    pub longest_posting: usize,
}

impl IndexStats {
    /// Average posting list length, 0 for an empty index
    pub fn avg_posting_len(&self) -> f64 {
        if self.terms == 0 {
            0.0
        } else {
            self.postings as f64 / self.terms as f64
        }
    }
}
