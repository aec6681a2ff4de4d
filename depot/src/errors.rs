use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Depot operations
///
/// Each kind names one category of failure so callers can match on it
/// instead of parsing messages.
///
/// # Examples
///
/// ```rust
/// use depot::errors::{DepotError, DepotResult, ErrorKind};
///
/// fn example() -> DepotResult<()> {
///     Err(DepotError::new("unknown watch kind", ErrorKind::InvalidArgument))
/// }
///
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::InvalidArgument);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// An argument was outside the accepted set (watch kind, collection name)
    InvalidArgument,
    /// A record has no usable `id`
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Collection does not exist in the depot
    CollectionNotFound,
    /// A watcher failed while handling an event
    EventError,
    /// Error mapping a value to or from another representation
    ObjectMappingError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::EventError => write!(f, "Event error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Depot error type.
///
/// `DepotError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created.
///
/// ```rust
/// use depot::errors::{DepotError, ErrorKind};
///
/// let cause = DepotError::new("watcher rejected record", ErrorKind::InvalidOperation);
/// let err = DepotError::new_with_cause("watcher failed", ErrorKind::EventError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct DepotError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DepotError>>,
    backtrace: Atomic<Backtrace>,
}

impl DepotError {
    /// Creates a new `DepotError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DepotError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `DepotError` wrapping `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DepotError) -> Self {
        DepotError {
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

    pub fn cause(&self) -> Option<&DepotError> {
        self.cause.as_deref()
    }
}

impl Display for DepotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DepotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for DepotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Depot operations.
pub type DepotResult<T> = Result<T, DepotError>;

#[cfg(feature = "serde")]
impl serde::de::Error for DepotError {
    fn custom<T: Display>(msg: T) -> Self {
        DepotError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for DepotError {
    fn custom<T: Display>(msg: T) -> Self {
        DepotError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::fmt::Error> for DepotError {
    fn from(err: std::fmt::Error) -> Self {
        DepotError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for DepotError {
    fn from(msg: String) -> Self {
        DepotError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DepotError {
    fn from(msg: &str) -> Self {
        DepotError::new(msg, ErrorKind::InternalError)
    }
}
