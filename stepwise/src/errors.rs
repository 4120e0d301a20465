use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for migration operations
///
/// Each kind describes one category of failure so callers can decide whether
/// to ignore it (e.g. a duplicate registration during startup) or abort.
///
/// # Examples
///
/// ```rust
/// use stepwise::errors::{ErrorKind, MigrateError, MigrateResult};
///
/// fn example() -> MigrateResult<()> {
///     Err(MigrateError::new("version 3 is already registered", ErrorKind::DuplicateVersion))
/// }
///
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::DuplicateVersion);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Registry Errors
    /// A migration with the same version is already registered
    DuplicateVersion,

    // Configuration Errors
    /// The timeout option could not be parsed into a duration
    InvalidTimeout,
    /// A required collaborator is missing or a setting is unusable
    InvalidConfiguration,

    // Storage Errors
    /// Failure reported by the storage adapter
    StorageError,
    /// The deadline of a storage call elapsed
    Timeout,
    /// The storage adapter has already been closed
    StoreAlreadyClosed,
    /// A marker record could not be encoded or decoded
    EncodingError,

    // Migration Errors
    /// A forward or backward migration function reported failure
    MigrationFunctionError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DuplicateVersion => write!(f, "Duplicate version"),
            ErrorKind::InvalidTimeout => write!(f, "Invalid timeout"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::StorageError => write!(f, "Storage error"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::MigrationFunctionError => write!(f, "Migration function error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for every fallible operation of the crate.
///
/// `MigrateError` carries a message, an [ErrorKind], an optional cause and
/// the backtrace captured at construction time.
///
/// # Examples
///
/// ```rust
/// use stepwise::errors::{ErrorKind, MigrateError};
///
/// let cause = MigrateError::new("connection reset", ErrorKind::StorageError);
/// let err = MigrateError::new_with_cause(
///     "forward migration 2 failed",
///     ErrorKind::MigrationFunctionError,
///     cause,
/// );
/// assert_eq!(err.cause().map(|c| c.kind().clone()), Some(ErrorKind::StorageError));
/// ```
#[derive(Clone)]
pub struct MigrateError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MigrateError>>,
    backtrace: Atomic<Backtrace>,
}

impl MigrateError {
    /// Creates a new `MigrateError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MigrateError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `MigrateError` wrapping `cause`.
    ///
    /// The cause is kept intact so callers can inspect the original failure
    /// through [MigrateError::cause] or [Error::source].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MigrateError) -> Self {
        MigrateError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&MigrateError> {
        self.cause.as_deref()
    }

    /// Walks the cause chain and returns the innermost error.
    pub fn root_cause(&self) -> &MigrateError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl Display for MigrateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MigrateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for MigrateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<std::io::Error> for MigrateError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorKind::Timeout,
            _ => ErrorKind::StorageError,
        };
        MigrateError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<humantime::DurationError> for MigrateError {
    fn from(err: humantime::DurationError) -> Self {
        MigrateError::new(&format!("Invalid timeout: {}", err), ErrorKind::InvalidTimeout)
    }
}

impl From<String> for MigrateError {
    fn from(msg: String) -> Self {
        MigrateError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MigrateError {
    fn from(msg: &str) -> Self {
        MigrateError::new(msg, ErrorKind::InternalError)
    }
}
