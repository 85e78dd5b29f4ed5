//! Error types for concurrent dispatch

use thiserror::Error;

/// Boxed error produced by a fallible user operation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while dispatching work across workers
#[derive(Debug, Error)]
pub enum Error {
    /// Worker count must be at least one
    #[error("invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// Invalid pool configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Partitioner produced an invalid layout
    #[error("partitioning error: {0}")]
    Partition(String),

    /// Worker thread could not be spawned
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    /// User operation panicked inside a worker
    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Worker that observed the panic
        worker: usize,
        /// Panic payload, when it was a string
        message: String,
    },

    /// User operation returned an error for an element
    #[error("operation failed at index {index}: {source}")]
    Operation {
        /// Index of the element that failed
        index: usize,
        /// Error returned by the operation
        #[source]
        source: BoxError,
    },

    /// No worker produced a result for this index
    #[error("missing result for index {index}")]
    MissingResult {
        /// Index left without a result
        index: usize,
    },

    /// Workers reported fewer processed elements than the input holds
    #[error("incomplete run: processed {processed} of {expected} elements")]
    Incomplete {
        /// Elements the workers reported as processed
        processed: usize,
        /// Length of the input
        expected: usize,
    },
}

impl Error {
    /// Whether the error was raised before any worker started
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidWorkerCount(_) | Error::InvalidConfig(_) | Error::Partition(_)
        )
    }
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
