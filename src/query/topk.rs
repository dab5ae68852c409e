//! Bounded top-k selection over per-document hit counts.
//!
//! Ranking order is hit count descending, then document id ascending. The
//! selector keeps a min-heap of at most `k` entries whose root is the weakest
//! entry kept so far, so selecting from `n` documents costs O(n log k)
//! instead of a full sort.

use crate::index::types::{DocId, HitCount};
use crate::query::SearchHit;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A ranked candidate. `Ord` follows ranking order: a greater entry ranks
/// higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    pub hit_count: HitCount,
    pub doc_id: DocId,
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // (hit_count, -doc_id): lower ids win ties
        self.hit_count
            .cmp(&other.hit_count)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl From<RankedEntry> for SearchHit {
    fn from(entry: RankedEntry) -> Self {
        SearchHit {
            doc_id: entry.doc_id,
            hit_count: entry.hit_count,
        }
    }
}

/// Top-k selector. Uses a min-heap so the threshold (weakest kept entry) is
/// always at the root.
pub struct TopKHeap {
    heap: BinaryHeap<Reverse<RankedEntry>>,
    capacity: usize,
}

impl TopKHeap {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            capacity: k,
        }
    }

    /// Weakest entry currently kept, once the heap is full
    #[inline]
    pub fn threshold(&self) -> Option<RankedEntry> {
        if self.is_full() {
            self.heap.peek().map(|Reverse(e)| *e)
        } else {
            None
        }
    }

    /// Offer an entry. Returns true if it was kept.
    pub fn try_insert(&mut self, entry: RankedEntry) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return true;
        }
        match self.threshold() {
            Some(weakest) if entry > weakest => {
                self.heap.pop();
                self.heap.push(Reverse(entry));
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Consume the heap and return entries in ranking order (best first)
    pub fn into_sorted_vec(self) -> Vec<RankedEntry> {
        // Ascending order of Reverse<_> is descending rank
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(e)| e)
            .collect()
    }
}

/// Select the best `k` documents from a dense accumulator indexed by doc id.
///
/// Documents with zero hits are never returned, so the result may be shorter
/// than `k`.
pub fn select_top_k(hits_by_doc: &[HitCount], k: usize) -> Vec<SearchHit> {
    let mut top = TopKHeap::new(k);
    for (doc_id, &hit_count) in hits_by_doc.iter().enumerate() {
        if hit_count == 0 {
            continue;
        }
        top.try_insert(RankedEntry { hit_count, doc_id });
    }
    top.into_sorted_vec().into_iter().map(SearchHit::from).collect()
}
