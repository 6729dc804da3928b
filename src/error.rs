//! Typed errors for the engine core.
//!
//! Internal components return `Result<T, EngineError>`; the facade and the
//! demo binary convert to `anyhow::Result` at their boundaries, the usual
//! split between library-internal typed errors and application-level
//! propagation.

use thiserror::Error;

/// Errors recognized by the engine components.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data parse error at offset {offset}")]
    DataParse { offset: u64 },

    #[error("invalid record data: {reason}")]
    DataInvalid { reason: String },

    #[error("insert failed: {0}")]
    Insert(String),

    #[error("update failed: {0}")]
    Update(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("json error")]
    Json(#[from] serde_json::Error),

    #[error("unknown task kind")]
    UnknownTaskKind,

    #[error("task {task_code} is not claimed by this node")]
    NotClaimed { task_code: u64 },

    #[error("task {task_code} not found")]
    NotFound { task_code: u64 },
}

impl EngineError {
    /// Classifies an error for transactional-rollback decisions.
    ///
    /// Only `Insert`/`Update`/`Delete` are rollback-eligible.
    pub fn is_rollback_kind(&self) -> bool {
        matches!(self, EngineError::Insert(_) | EngineError::Update(_) | EngineError::Delete(_))
    }
}
