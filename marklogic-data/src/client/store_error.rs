use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

/// Category of a failure reported by the document store.
///
/// A client classifies every raw failure exactly once, at the point where the
/// response is received, so that callers can match on the variant instead of
/// inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFailure {
    /// The store could not be reached at all
    Connection,
    /// The store answered but is not serving requests
    ServiceUnavailable,
    /// A query could not be parsed
    QuerySyntax,
    /// The request parameters were rejected
    InvalidRequest,
    /// A create-only write targeted an existing URI
    DuplicateUri,
    /// A server limit was exceeded
    LimitExceeded,
    /// The transaction handle is unknown, expired or already finished
    TransactionNotFound,
    /// The write conflicts with a concurrent update
    Conflict,
    /// The document violates a validation rule
    ConstraintViolation,
    /// No classification rule matched
    Unknown,
}

pub const CODE_NO_TRANSACTION: &str = "XDMP-NOTXN";
pub const CODE_CONFLICTING_UPDATES: &str = "XDMP-CONFLICTINGUPDATES";
pub const CODE_DEADLOCK: &str = "XDMP-DEADLOCK";
pub const CODE_VALIDATION: &str = "XDMP-VALIDATE";
pub const CODE_LIMIT_EXCEEDED: &str = "XDMP-LIMITEXCEEDED";
pub const CODE_CACHE_FULL: &str = "XDMP-EXPNTREECACHEFULL";
pub const CODE_HOST_DOWN: &str = "XDMP-HOSTDOWN";
pub const CODE_FOREST_NOT_OPEN: &str = "XDMP-FORESTNOTOPEN";
pub const CODE_QUERY_SYNTAX: &str = "SEARCH-QUERYSYNTAX";
pub const CODE_CONTENT_EXISTS: &str = "RESTAPI-CONTENTEXISTS";
pub const CODE_INVALID_REQUEST: &str = "RESTAPI-INVALIDREQ";
pub const CODE_NO_TRANSFORM: &str = "RESTAPI-NOTRANSFORM";

static MESSAGE_CODES: LazyLock<HashMap<&'static str, StoreFailure>> = LazyLock::new(|| {
    HashMap::from([
        (CODE_NO_TRANSACTION, StoreFailure::TransactionNotFound),
        (CODE_CONFLICTING_UPDATES, StoreFailure::Conflict),
        (CODE_DEADLOCK, StoreFailure::Conflict),
        (CODE_VALIDATION, StoreFailure::ConstraintViolation),
        (CODE_LIMIT_EXCEEDED, StoreFailure::LimitExceeded),
        (CODE_CACHE_FULL, StoreFailure::LimitExceeded),
        (CODE_HOST_DOWN, StoreFailure::ServiceUnavailable),
        (CODE_FOREST_NOT_OPEN, StoreFailure::ServiceUnavailable),
        (CODE_QUERY_SYNTAX, StoreFailure::QuerySyntax),
        (CODE_CONTENT_EXISTS, StoreFailure::DuplicateUri),
        (CODE_INVALID_REQUEST, StoreFailure::InvalidRequest),
        (CODE_NO_TRANSFORM, StoreFailure::InvalidRequest),
    ])
});

impl StoreFailure {
    /// Classifies a raw store response.
    ///
    /// The message code is looked up first; the HTTP status is only consulted
    /// when the code is absent or unknown. Anything left over is `Unknown`.
    pub fn classify(status: Option<u16>, message_code: Option<&str>) -> StoreFailure {
        if let Some(failure) = message_code.and_then(|code| MESSAGE_CODES.get(code)) {
            return *failure;
        }

        match status {
            Some(400) => StoreFailure::InvalidRequest,
            Some(409) => StoreFailure::Conflict,
            Some(503) | Some(504) => StoreFailure::ServiceUnavailable,
            _ => StoreFailure::Unknown,
        }
    }
}

impl Display for StoreFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StoreFailure::Connection => "connection failure",
            StoreFailure::ServiceUnavailable => "service unavailable",
            StoreFailure::QuerySyntax => "query syntax error",
            StoreFailure::InvalidRequest => "invalid request",
            StoreFailure::DuplicateUri => "duplicate uri",
            StoreFailure::LimitExceeded => "limit exceeded",
            StoreFailure::TransactionNotFound => "transaction not found",
            StoreFailure::Conflict => "conflicting update",
            StoreFailure::ConstraintViolation => "constraint violation",
            StoreFailure::Unknown => "unknown failure",
        };
        write!(f, "{}", text)
    }
}

/// A failure returned by a [`DatabaseClient`](super::DatabaseClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    failure: StoreFailure,
    message: String,
    message_code: Option<String>,
    status: Option<u16>,
}

impl StoreError {
    pub fn new(failure: StoreFailure, message: impl Into<String>) -> Self {
        StoreError {
            failure,
            message: message.into(),
            message_code: None,
            status: None,
        }
    }

    /// Builds an error from a raw server response, classifying it through
    /// [`StoreFailure::classify`].
    pub fn from_response(
        status: Option<u16>,
        message_code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        StoreError {
            failure: StoreFailure::classify(status, message_code),
            message: message.into(),
            message_code: message_code.map(str::to_string),
            status,
        }
    }

    /// Builds an error carrying a known message code.
    pub fn with_code(message_code: &str, message: impl Into<String>) -> Self {
        StoreError::from_response(None, Some(message_code), message)
    }

    pub fn failure(&self) -> StoreFailure {
        self.failure
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn message_code(&self) -> Option<&str> {
        self.message_code.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message_code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;
