//! # Sift - concurrent in-memory keyword search
//!
//! Sift answers ranked keyword queries against a corpus of text documents
//! using an in-memory inverted index. The index can be rebuilt from a new
//! document batch while queries keep being answered.
//!
//! ## Architecture
//!
//! - [`index`] - Inverted index: word -> (document id, hit count) postings
//! - [`sync`] - `Synchronized<T>`, the exclusive-access slot holding the index
//! - [`query`] - Per-query accumulation and top-5 ranking
//! - [`server`] - Task coordinator for rebuilds and query streams
//! - [`output`] - Text and JSON result sinks
//! - [`config`] - Application configuration
//! - [`utils`] - Tokenizer and line sources
//!
//! ## Quick Start
//!
//! ```
//! use sift::server::SearchServer;
//! use std::io::Cursor;
//!
//! let docs = Cursor::new("the cat sat\nthe dog sat on the mat\n");
//! let server = SearchServer::with_documents(docs).unwrap();
//!
//! let result = server.query("the sat");
//! let ranked: Vec<_> = result.hits.iter().map(|h| (h.doc_id, h.hit_count)).collect();
//! assert_eq!(ranked, [(1, 3), (0, 2)]);
//! ```
//!
//! ## Consistency
//!
//! Rebuilds construct a new index without holding the lock and swap it in
//! under the lock. Queries hold the lock only while accumulating hit counts,
//! so each query sees exactly one index generation.

pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod server;
pub mod sync;
pub mod utils;

pub use error::{Result, SearchError};
pub use index::InvertedIndex;
pub use query::{MAX_RESULTS, QueryEngine, QueryResult, SearchHit};
pub use server::{ResultSink, SearchServer};
pub use sync::{Access, Synchronized};
