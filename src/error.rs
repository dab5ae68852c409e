use crate::index::types::DocId;
use thiserror::Error;

/// Error type for index, query and task operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Document {id} out of range (index holds {count} documents)")]
    DocumentOutOfRange { id: DocId, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Task {task} panicked: {message}")]
    TaskPanicked { task: String, message: String },

    #[error("Task {task} failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<SearchError>,
    },
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Wrap an error with the name of the task that produced it
    pub fn in_task(self, task: impl Into<String>) -> Self {
        SearchError::TaskFailed {
            task: task.into(),
            source: Box::new(self),
        }
    }
}
