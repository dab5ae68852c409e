//! Query answering against a guarded index.
//!
//! Answering a query has two phases:
//!
//! 1. **Accumulate** (guard held): size a dense per-document accumulator to
//!    the current document count and add up the hit counts of every query
//!    word's postings.
//! 2. **Rank** (guard released): select the top results from the
//!    accumulator.
//!
//! Only phase 1 touches the shared index, so a query observes exactly one
//! index generation even if a rebuild is swapped in while it ranks.

use crate::index::types::HitCount;
use crate::index::InvertedIndex;
use crate::query::topk::select_top_k;
use crate::query::{MAX_RESULTS, QueryResult, SearchHit};
use crate::sync::Synchronized;
use crate::utils::split_into_words;
use std::time::Instant;
use tracing::debug;

/// Answers queries, reusing one accumulator buffer across calls.
///
/// One engine belongs to one query stream; it is task-local state and
/// never shared.
#[derive(Debug)]
pub struct QueryEngine {
    /// Aggregate hit count per document id
    hits_by_doc: Vec<HitCount>,
    limit: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::with_limit(MAX_RESULTS)
    }

    /// Engine returning at most `limit` hits per query
    pub fn with_limit(limit: usize) -> Self {
        Self {
            hits_by_doc: Vec::new(),
            limit,
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Answer one query against the shared index
    pub fn answer(&mut self, query: &str, index: &Synchronized<InvertedIndex>) -> Vec<SearchHit> {
        let start = Instant::now();

        let words = {
            let access = index.access();
            self.accumulate(query, &access)
        };

        let hits = self.rank();
        debug!(
            query,
            words,
            hits = hits.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "answered query"
        );
        hits
    }

    /// Answer one query and pair the hits with the query text
    pub fn answer_result(
        &mut self,
        query: &str,
        index: &Synchronized<InvertedIndex>,
    ) -> QueryResult {
        let hits = self.answer(query, index);
        QueryResult {
            query: query.to_string(),
            hits,
        }
    }

    /// Reset the accumulator to the index's document count and add every
    /// query word's postings into it. Returns the number of query words.
    pub fn accumulate(&mut self, query: &str, index: &InvertedIndex) -> usize {
        self.hits_by_doc.clear();
        self.hits_by_doc.resize(index.document_count(), 0);

        let mut words = 0;
        for word in split_into_words(query) {
            words += 1;
            for posting in index.lookup(word) {
                self.hits_by_doc[posting.doc_id] += posting.hit_count;
            }
        }
        words
    }

    /// Top hits of the last accumulated query
    pub fn rank(&self) -> Vec<SearchHit> {
        select_top_k(&self.hits_by_doc, self.limit)
    }
}

/// Answer a single query with a fresh engine
pub fn answer(query: &str, index: &Synchronized<InvertedIndex>) -> Vec<SearchHit> {
    QueryEngine::new().answer(query, index)
}
