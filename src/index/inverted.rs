//! In-memory inverted index.
//!
//! An [`InvertedIndex`] maps every word to its posting list: the documents the
//! word occurs in, in increasing id order, each with an occurrence count. One
//! instance holds one generation of the corpus and is never mutated after
//! [`InvertedIndex::build`] returns; rebuilding produces a new instance.

use crate::error::{Result, SearchError};
use crate::index::types::{DocId, IndexStats, Posting};
use crate::utils::{read_lines, split_into_words};
use ahash::AHashMap;
use rayon::prelude::*;
use std::io::{self, BufRead};
use std::time::Instant;
use tracing::debug;

/// Batches at least this large are tokenized on the rayon pool
pub const PARALLEL_BUILD_THRESHOLD: usize = 4096;

type PostingMap = AHashMap<Box<str>, Vec<Posting>>;

#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: PostingMap,
    docs: Vec<String>,
    tokens: usize,
}

impl InvertedIndex {
    /// Create an empty index with zero documents
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a batch of documents, one document per item.
    ///
    /// Document ids follow iteration order starting at 0.
    pub fn build<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let docs: Vec<String> = documents.into_iter().collect();
        let parallel = docs.len() >= PARALLEL_BUILD_THRESHOLD;
        Self::build_with(docs, parallel)
    }

    /// Build an index choosing explicitly whether tokenization runs in parallel.
    ///
    /// Postings are always merged sequentially in id order, so both paths
    /// produce identical indexes.
    pub fn build_with(docs: Vec<String>, parallel: bool) -> Self {
        let start = Instant::now();
        let mut postings = PostingMap::new();
        let mut tokens = 0usize;

        if parallel {
            let tokenized: Vec<Vec<&str>> = docs
                .par_iter()
                .map(|doc| split_into_words(doc).collect())
                .collect();

            for (doc_id, words) in tokenized.iter().enumerate() {
                tokens += words.len();
                for word in words {
                    add_occurrence(&mut postings, word, doc_id);
                }
            }
        } else {
            for (doc_id, doc) in docs.iter().enumerate() {
                for word in split_into_words(doc) {
                    tokens += 1;
                    add_occurrence(&mut postings, word, doc_id);
                }
            }
        }

        debug!(
            docs = docs.len(),
            terms = postings.len(),
            tokens,
            parallel,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built inverted index"
        );

        Self {
            postings,
            docs,
            tokens,
        }
    }

    /// Build an index reading one document per line.
    ///
    /// Fails only when the reader does.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let docs = read_lines(reader).collect::<io::Result<Vec<String>>>()?;
        Ok(Self::build(docs))
    }

    /// Posting list for `word`, empty when the word does not occur
    #[inline]
    pub fn lookup(&self, word: &str) -> &[Posting] {
        self.postings.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    /// Text of document `id`
    pub fn document_text(&self, id: DocId) -> Result<&str> {
        self.docs
            .get(id)
            .map(String::as_str)
            .ok_or(SearchError::DocumentOutOfRange {
                id,
                count: self.docs.len(),
            })
    }

    /// All documents in id order
    pub fn documents(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.docs.iter().map(String::as_str)
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// All terms with their posting lists, in no particular order
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.postings
            .iter()
            .map(|(term, list)| (&**term, list.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let (postings, longest_posting) = self
            .postings
            .values()
            .fold((0, 0), |(total, longest), list| {
                (total + list.len(), longest.max(list.len()))
            });

        IndexStats {
            documents: self.docs.len(),
            terms: self.postings.len(),
            postings,
            tokens: self.tokens,
            longest_posting,
        }
    }
}

/// Record one occurrence of `word` in `doc_id`.
///
/// Documents are scanned in id order, so the only entry that can belong to
/// `doc_id` is the last one. Coalescing with it keeps each list sorted and
/// free of duplicate ids.
#[inline]
fn add_occurrence(postings: &mut PostingMap, word: &str, doc_id: DocId) {
    if let Some(list) = postings.get_mut(word) {
        match list.last_mut() {
            Some(last) if last.doc_id == doc_id => last.hit_count += 1,
            _ => list.push(Posting::new(doc_id, 1)),
        }
        return;
    }
    postings.insert(word.into(), vec![Posting::new(doc_id, 1)]);
}
