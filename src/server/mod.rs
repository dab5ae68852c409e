//! Search server: dispatches rebuild and query-stream tasks.
//!
//! Architecture:
//! - One guarded slot (`Synchronized<InvertedIndex>`) shared by every task
//! - Rebuild tasks build a new index without the lock, then swap it in
//! - Query-stream tasks answer their queries in order against whatever
//!   generation is installed when each query starts
//! - Every task runs on its own thread; the server keeps the join handles and
//!   joins them in [`SearchServer::wait`], [`SearchServer::shutdown`] or on drop

mod sink;

pub use sink::{ResultSink, SharedSink};

use crate::error::{Result, SearchError};
use crate::index::inverted::PARALLEL_BUILD_THRESHOLD;
use crate::index::InvertedIndex;
use crate::query::{QueryEngine, QueryResult};
use crate::sync::Synchronized;
use crate::utils::read_lines;
use std::any::Any;
use std::fmt;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Identifier of a submitted task, unique per server
pub type TaskId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Rebuild,
    QueryStream,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Rebuild => f.write_str("rebuild"),
            TaskKind::QueryStream => f.write_str("query"),
        }
    }
}

/// What a finished task did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Rebuilt { documents: usize, terms: usize },
    Answered { queries: usize },
}

/// Totals over the tasks joined by one [`SearchServer::wait`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub rebuilds: usize,
    pub query_streams: usize,
    pub queries: usize,
    /// Document count of the most recently submitted successful rebuild
    pub last_rebuild_documents: Option<usize>,
}

/// Server options
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Tokenize large rebuild batches on the rayon pool
    pub parallel_build: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            parallel_build: true,
        }
    }
}

struct Task {
    id: TaskId,
    kind: TaskKind,
    handle: JoinHandle<Result<TaskOutcome>>,
}

impl Task {
    fn name(&self) -> String {
        format!("{}-{}", self.kind, self.id)
    }
}

/// Coordinates rebuild and query tasks over one shared index
pub struct SearchServer {
    index: Arc<Synchronized<InvertedIndex>>,
    options: ServerOptions,
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl Default for SearchServer {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchServer {
    /// Server over an empty index
    pub fn new() -> Self {
        Self::with_options(ServerOptions::default())
    }

    pub fn with_options(options: ServerOptions) -> Self {
        Self {
            index: Arc::new(Synchronized::new(InvertedIndex::new())),
            options,
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Server whose first index generation is built from `documents` before
    /// this returns
    pub fn with_documents<R: BufRead>(documents: R) -> Result<Self> {
        let server = Self::new();
        server.load(documents)?;
        Ok(server)
    }

    /// Rebuild on the calling thread, returning the new document count
    pub fn load<R: BufRead>(&self, documents: R) -> Result<usize> {
        let (documents, _) = install_generation(&self.index, documents, self.options)?;
        Ok(documents)
    }

    /// Shared handle to the guarded index
    pub fn index(&self) -> Arc<Synchronized<InvertedIndex>> {
        Arc::clone(&self.index)
    }

    /// Answer one query on the calling thread
    pub fn query(&self, query: &str) -> QueryResult {
        QueryEngine::new().answer_result(query, &self.index)
    }

    /// Dispatch a rebuild from a new document batch, one document per line.
    ///
    /// The new index is built without holding the guard; only the final swap
    /// is done under it.
    pub fn submit_rebuild<R>(&mut self, documents: R) -> Result<TaskId>
    where
        R: BufRead + Send + 'static,
    {
        let index = Arc::clone(&self.index);
        let options = self.options;
        self.spawn(TaskKind::Rebuild, move || {
            let (documents, terms) = install_generation(&index, documents, options)?;
            Ok(TaskOutcome::Rebuilt { documents, terms })
        })
    }

    /// Dispatch a query stream. Results are written to `sink` in query order.
    pub fn submit_query_stream<R, S>(&mut self, queries: R, sink: S) -> Result<TaskId>
    where
        R: BufRead + Send + 'static,
        S: ResultSink + Send + 'static,
    {
        let index = Arc::clone(&self.index);
        self.spawn(TaskKind::QueryStream, move || {
            query_stream_task(&index, queries, sink)
        })
    }

    /// Dispatch a query stream and receive its results over a channel
    pub fn submit_query_channel<R>(&mut self, queries: R) -> Result<(TaskId, Receiver<QueryResult>)>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let id = self.submit_query_stream(queries, tx)?;
        Ok((id, rx))
    }

    /// Number of submitted tasks still running
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.handle.is_finished())
            .count()
    }

    /// Number of submitted tasks not yet joined
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Join every task submitted so far.
    ///
    /// All tasks are joined even if some fail; the first failure in
    /// submission order is returned.
    pub fn wait(&mut self) -> Result<TaskSummary> {
        let mut summary = TaskSummary::default();
        let mut first_error = None;

        for task in self.tasks.drain(..) {
            let name = task.name();
            let outcome = match task.handle.join() {
                Ok(result) => result.map_err(|e| e.in_task(name.as_str())),
                Err(payload) => Err(SearchError::TaskPanicked {
                    task: name.clone(),
                    message: panic_message(payload.as_ref()),
                }),
            };

            match outcome {
                Ok(TaskOutcome::Rebuilt { documents, .. }) => {
                    summary.rebuilds += 1;
                    summary.last_rebuild_documents = Some(documents);
                }
                Ok(TaskOutcome::Answered { queries }) => {
                    summary.query_streams += 1;
                    summary.queries += queries;
                }
                Err(e) => {
                    warn!(task = %name, error = %e, "task failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Join all outstanding tasks and stop the server
    pub fn shutdown(mut self) -> Result<TaskSummary> {
        self.wait()
    }

    fn spawn<F>(&mut self, kind: TaskKind, work: F) -> Result<TaskId>
    where
        F: FnOnce() -> Result<TaskOutcome> + Send + 'static,
    {
        let id = self.next_id;
        let handle = thread::Builder::new()
            .name(format!("sift-{}-{}", kind, id))
            .spawn(work)?;

        self.next_id += 1;
        self.tasks.push(Task { id, kind, handle });
        debug!(task = id, %kind, "submitted task");
        Ok(id)
    }
}

impl Drop for SearchServer {
    fn drop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        if let Err(e) = self.wait() {
            warn!(error = %e, "task failed before server shutdown");
        }
    }
}

/// Read a document batch and build a new generation off to the side
fn build_generation<R: BufRead>(documents: R, options: ServerOptions) -> Result<InvertedIndex> {
    let docs = read_lines(documents).collect::<io::Result<Vec<String>>>()?;
    let parallel = options.parallel_build && docs.len() >= PARALLEL_BUILD_THRESHOLD;
    Ok(InvertedIndex::build_with(docs, parallel))
}

/// Build a generation and swap it into the slot. Returns the new document
/// and term counts.
fn install_generation<R: BufRead>(
    index: &Synchronized<InvertedIndex>,
    documents: R,
    options: ServerOptions,
) -> Result<(usize, usize)> {
    let start = Instant::now();
    let new_index = build_generation(documents, options)?;
    let documents = new_index.document_count();
    let terms = new_index.term_count();

    let previous = index.replace(new_index);
    info!(
        documents,
        terms,
        replaced_documents = previous.document_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "installed new index generation"
    );
    // Old generation is freed here, outside the guard
    drop(previous);

    Ok((documents, terms))
}

fn query_stream_task<R, S>(
    index: &Synchronized<InvertedIndex>,
    queries: R,
    mut sink: S,
) -> Result<TaskOutcome>
where
    R: BufRead,
    S: ResultSink,
{
    let mut engine = QueryEngine::new();
    let mut answered = 0usize;

    for query in read_lines(queries) {
        let query = query?;
        let hits = engine.answer(&query, index);
        sink.write_result(&query, &hits)?;
        answered += 1;
    }
    sink.flush()?;

    debug!(queries = answered, "query stream finished");
    Ok(TaskOutcome::Answered { queries: answered })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::DocId;
    use crate::query::SearchHit;
    use std::io::Cursor;

    fn lines(text: &str) -> Cursor<Vec<u8>> {
        Cursor::new(text.as_bytes().to_vec())
    }

    fn pairs(hits: &[SearchHit]) -> Vec<(DocId, usize)> {
        hits.iter().map(|h| (h.doc_id, h.hit_count)).collect()
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn write_result(&mut self, _query: &str, _hits: &[SearchHit]) -> Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full").into())
        }
    }

    struct PanickingSink;

    impl ResultSink for PanickingSink {
        fn write_result(&mut self, _query: &str, _hits: &[SearchHit]) -> Result<()> {
            panic!("sink exploded");
        }
    }

    #[test]
    fn test_with_documents_builds_synchronously() {
        let server =
            SearchServer::with_documents(lines("the cat sat\nthe dog sat on the mat\n")).unwrap();
        let result = server.query("the sat");
        assert_eq!(pairs(&result.hits), vec![(1, 3), (0, 2)]);
    }

    #[test]
    fn test_query_stream_preserves_order() {
        let mut server = SearchServer::with_documents(lines("a b\nb c\nc d\n")).unwrap();
        let (_, rx) = server.submit_query_channel(lines("a\nb\nc\nzzz\n")).unwrap();
        let summary = server.wait().unwrap();

        let results: Vec<QueryResult> = rx.iter().collect();
        let queries: Vec<&str> = results.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["a", "b", "c", "zzz"]);
        assert_eq!(pairs(&results[1].hits), vec![(0, 1), (1, 1)]);
        assert!(results[3].hits.is_empty());
        assert_eq!(summary.query_streams, 1);
        assert_eq!(summary.queries, 4);
    }

    #[test]
    fn test_rebuild_replaces_generation() {
        let mut server = SearchServer::with_documents(lines("old words\n")).unwrap();
        server.submit_rebuild(lines("new words\nnew again\n")).unwrap();
        let summary = server.wait().unwrap();

        assert_eq!(summary.rebuilds, 1);
        assert_eq!(summary.last_rebuild_documents, Some(2));
        assert!(server.query("old").hits.is_empty());
        assert_eq!(pairs(&server.query("new").hits), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_empty_rebuild_clears_index() {
        let mut server = SearchServer::with_documents(lines("a\n")).unwrap();
        server.submit_rebuild(io::empty()).unwrap();
        server.wait().unwrap();
        assert_eq!(server.index().access().document_count(), 0);
        assert!(server.query("a").hits.is_empty());
    }

    #[test]
    fn test_task_ids_are_sequential() {
        let mut server = SearchServer::new();
        let first = server.submit_rebuild(lines("x\n")).unwrap();
        let second = server.submit_query_stream(lines("x\n"), Vec::new()).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(server.outstanding(), 2);
        server.wait().unwrap();
        assert_eq!(server.outstanding(), 0);
        assert_eq!(server.pending(), 0);
    }

    #[test]
    fn test_sink_error_propagates() {
        let mut server = SearchServer::with_documents(lines("a\n")).unwrap();
        server.submit_query_stream(lines("a\n"), FailingSink).unwrap();
        server.submit_rebuild(lines("b\n")).unwrap();

        let err = server.wait().unwrap_err();
        assert!(matches!(err, SearchError::TaskFailed { ref task, .. } if task == "query-0"));
        // Remaining tasks were still joined
        assert_eq!(server.outstanding(), 0);
        assert_eq!(pairs(&server.query("b").hits), vec![(0, 1)]);
    }

    #[test]
    fn test_task_panic_is_reported() {
        let mut server = SearchServer::with_documents(lines("a\n")).unwrap();
        server.submit_query_stream(lines("a\n"), PanickingSink).unwrap();
        match server.shutdown() {
            Err(SearchError::TaskPanicked { task, message }) => {
                assert_eq!(task, "query-0");
                assert_eq!(message, "sink exploded");
            }
            other => panic!("expected panic report, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_joins_outstanding_tasks() {
        let collected = SharedSink::new(Vec::<QueryResult>::new());
        {
            let mut server = SearchServer::with_documents(lines("a\n")).unwrap();
            server.submit_query_stream(lines("a\na\n"), collected.clone()).unwrap();
        }
        let results = collected.try_unwrap().ok().unwrap();
        assert_eq!(results.len(), 2);
    }
}
