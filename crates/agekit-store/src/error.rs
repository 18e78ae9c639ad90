//! Error types for the agekit-store crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// An agtype value the codec could not turn into a typed entity.
    /// Carries the offending record text for diagnosis; a fetch that hits
    /// this aborts wholesale, never returning a partial graph.
    #[error("malformed agtype record ({reason}): {record}")]
    MalformedRecord { reason: String, record: String },

    #[error("graph not found: {0}")]
    GraphNotFound(String),

    /// Store-level failure, surfaced unmodified. Never retried here.
    #[error("query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error(transparent)]
    Graph(#[from] agekit_graph::GraphError),

    #[error(transparent)]
    Core(#[from] agekit_core::CoreError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
