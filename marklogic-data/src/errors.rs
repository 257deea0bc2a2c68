use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

use crate::client::StoreError;

/// Error kinds for data access operations.
///
/// The first six variants form the data-access taxonomy every store failure is
/// classified into. The remaining variants describe failures raised locally,
/// before a request ever reaches the store.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::errors::{DataError, ErrorKind};
///
/// match template.write(None, &mut order) {
///     Err(e) if *e.kind() == ErrorKind::ResourceFailure => retry_later(),
///     other => other.map(|_| ()),
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    /// The request was malformed, e.g. a query the store could not parse
    InvalidApiUsage,
    /// A document with the same identifier already exists
    DuplicateKey,
    /// The store is unreachable or unavailable
    ResourceFailure,
    /// The store rejected the request because a limit was exceeded or a
    /// resource (such as a transaction) is no longer usable
    ResourceUsage,
    /// The write would violate a consistency constraint
    DataIntegrityViolation,
    /// The store failed in a way no classification rule recognizes
    Uncategorized,

    /// Error mapping an entity to or from document content
    ObjectMapping,
    /// The operation is not valid in the current state
    InvalidOperation,
    /// A configuration value failed validation
    InvalidConfiguration,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidApiUsage => write!(f, "Invalid API usage"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::ResourceFailure => write!(f, "Resource failure"),
            ErrorKind::ResourceUsage => write!(f, "Resource usage"),
            ErrorKind::DataIntegrityViolation => write!(f, "Data integrity violation"),
            ErrorKind::Uncategorized => write!(f, "Uncategorized data access error"),
            ErrorKind::ObjectMapping => write!(f, "Object mapping error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
        }
    }
}

/// Data access error.
///
/// `DataError` carries a message, the [`ErrorKind`] it was classified as, an
/// optional underlying cause and the backtrace captured where it was raised.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::errors::{DataError, ErrorKind};
///
/// let err = DataError::new("Entity has no id", ErrorKind::InvalidOperation);
/// assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
/// ```
#[derive(Clone)]
pub struct DataError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Arc<dyn Error + Send + Sync>>,
    backtrace: Arc<Backtrace>,
}

impl DataError {
    /// Creates a new `DataError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DataError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `DataError` that keeps `cause` as its source.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    pub fn new_with_cause<E>(message: &str, error_kind: ErrorKind, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        DataError {
            message: message.to_string(),
            error_kind,
            cause: Some(Arc::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns `true` when the failure was raised by the store rather than
    /// by local validation or mapping.
    pub fn is_store_failure(&self) -> bool {
        !matches!(
            self.error_kind,
            ErrorKind::ObjectMapping | ErrorKind::InvalidOperation | ErrorKind::InvalidConfiguration
        )
    }
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(
                f,
                "[{}] {}\nCaused by: {:?}",
                self.error_kind, self.message, cause
            ),
            None => write!(f, "[{}] {}\n{:?}", self.error_kind, self.message, self.backtrace),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref() as &(dyn Error + 'static)),
            None => None,
        }
    }
}

/// A result type alias for data access operations.
pub type DataResult<T> = Result<T, DataError>;

impl de::Error for DataError {
    fn custom<T: Display>(msg: T) -> Self {
        DataError::new(&msg.to_string(), ErrorKind::ObjectMapping)
    }
}

impl ser::Error for DataError {
    fn custom<T: Display>(msg: T) -> Self {
        DataError::new(&msg.to_string(), ErrorKind::ObjectMapping)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::new(
            &format!("Document mapping error: {}", err),
            ErrorKind::ObjectMapping,
        )
    }
}

impl From<StoreError> for DataError {
    fn from(err: StoreError) -> Self {
        crate::template::translate(err)
    }
}
