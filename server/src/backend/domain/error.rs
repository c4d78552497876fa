//! Error taxonomy for ledger operations.
//!
//! Callers distinguish "bad input" (`Validation`) from "already handled"
//! (`Conflict`). Store failures are propagated untouched as `Storage`.
use super::models::InvalidMonthKey;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        LedgerError::Conflict(message.into())
    }
}

impl From<InvalidMonthKey> for LedgerError {
    fn from(error: InvalidMonthKey) -> Self {
        LedgerError::Validation(error.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
