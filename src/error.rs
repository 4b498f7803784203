//! Error types for the library desk core

use thiserror::Error;

/// Numeric error codes shown next to messages in the desk UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StorageFailure = 3,
    NoSuchItem = 5,
    ItemNotAvailable = 7,
    Duplicate = 8,
    MaxBorrowsReached = 11,
    AlreadyBorrowed = 13,
    BadValue = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("You can only borrow {max} books at a time. Return a book before borrowing another.")]
    LimitReached { max: usize },

    #[error("You have already borrowed book {book_id} and not returned it yet")]
    AlreadyBorrowed { book_id: i64 },

    #[error("Book {book_id} is not available right now")]
    Unavailable { book_id: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchItem,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::LimitReached { .. } => ErrorCode::MaxBorrowsReached,
            AppError::AlreadyBorrowed { .. } => ErrorCode::AlreadyBorrowed,
            AppError::Unavailable { .. } => ErrorCode::ItemNotAvailable,
            AppError::Storage(_) => ErrorCode::StorageFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Expected outcomes of a user action, as opposed to faults.
    ///
    /// The presentation layer shows these as plain messages; everything else
    /// is a bug or an environment problem and is worth a log line.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            AppError::Authorization(_)
                | AppError::NotFound(_)
                | AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::LimitReached { .. }
                | AppError::AlreadyBorrowed { .. }
                | AppError::Unavailable { .. }
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", e);
        AppError::Storage(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        tracing::error!("CSV error: {:?}", e);
        AppError::Storage(e.to_string())
    }
}

impl From<tempfile::PersistError> for AppError {
    fn from(e: tempfile::PersistError) -> Self {
        AppError::from(e.error)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
