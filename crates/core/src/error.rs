// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Closed classification of [`AppError`].
///
/// Callers branch on the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input was empty or malformed. Raised before any storage call.
    InvalidArgument,
    /// Store or consumer lookup missed. A normal outcome, not a fault.
    NotFound,
    /// Store name already registered.
    AlreadyExists,
    /// Persistence collaborator failed (I/O, timeout, driver error).
    Infrastructure,
    /// Misconfiguration or broken invariant inside the process.
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AppError::Database(_) | AppError::Timeout(_) | AppError::Io(_) => {
                ErrorKind::Infrastructure
            }
            AppError::Config(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn store_not_found(key: &str) -> Self {
        AppError::NotFound(format!("store {} not found", key))
    }

    pub fn consumer_not_found(store: &str, key: &str) -> Self {
        AppError::NotFound(format!("consumer {} not found in store {}", key, store))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
