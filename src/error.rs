//! Error types for wallet session operations
//!
//! Adapter and storage failures are caught at the session manager boundary
//! and folded into state; these types surface where callers can act on them
//! (discardable disconnect results, provider lookups, task submission).

use thiserror::Error;

use crate::submission::TaskStatus;

/// Top-level error for the session crate
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Wallet adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("use_wallet must be used within a WalletProvider")]
    OutsideProvider,

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

/// Failures reported by a wallet SDK adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The user declined the request in their wallet app
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Reasons a work submission is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("You are not authorized to submit work for this task")]
    NotAuthorized,

    #[error("This task is in {0} status and cannot accept submissions")]
    InvalidStatus(TaskStatus),

    #[error("{0}")]
    InvalidForm(String),

    #[error("Cannot move task {task_id} from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

impl AdapterError {
    /// Create a rejected-request error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
