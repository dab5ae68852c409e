//! Destinations for query results.
//!
//! A query-stream task hands every answered query to a [`ResultSink`]. How the
//! result is rendered is up to the sink; the text and JSON renderers live in
//! [`crate::output`].

use crate::error::{Result, SearchError};
use crate::query::{QueryResult, SearchHit};
use parking_lot::Mutex;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Receives ranked results, one call per query, in query order
pub trait ResultSink {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()>;

    /// Called once after the last query of a stream
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        (**self).write_result(query, hits)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        (**self).write_result(query, hits)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Collects results in memory
impl ResultSink for Vec<QueryResult> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        self.push(QueryResult {
            query: query.to_string(),
            hits: hits.to_vec(),
        });
        Ok(())
    }
}

/// Streams results to a receiver. Fails once the receiver is gone.
impl ResultSink for Sender<QueryResult> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        let result = QueryResult {
            query: query.to_string(),
            hits: hits.to_vec(),
        };
        self.send(result).map_err(|_| {
            SearchError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "result receiver dropped",
            ))
        })
    }
}

/// A sink shared by several query streams.
///
/// Each result is written under the sink's lock, so results from different
/// streams never interleave mid-record. Order across streams is unspecified.
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Recover the inner sink once every other clone is dropped
    pub fn try_unwrap(self) -> std::result::Result<S, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ResultSink> ResultSink for SharedSink<S> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        self.inner.lock().write_result(query, hits)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.lock().flush()
    }
}
