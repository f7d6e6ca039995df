use thiserror::Error;

/// Failure taxonomy for the reporting core.
///
/// `SourceUnavailable` and `StoreWriteFailure` carry the operation that
/// failed so a caller can retry or report it. `SyncConflict` is per-row:
/// the denormalizer logs it, skips the row, and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation}: store unavailable: {source}")]
    SourceUnavailable {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("expense {expense_id}: unresolved {missing} reference")]
    SyncConflict {
        expense_id: i64,
        missing: &'static str,
    },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{operation}: write did not commit: {source}")]
    StoreWriteFailure {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl Error {
    pub(crate) fn read(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::SourceUnavailable { operation, source }
    }

    pub(crate) fn write(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::StoreWriteFailure { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
