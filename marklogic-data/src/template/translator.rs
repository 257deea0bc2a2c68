use crate::client::{StoreError, StoreFailure};
use crate::errors::{DataError, ErrorKind};

/// The data-access error kind a store failure is reported as.
pub fn error_kind_of(failure: StoreFailure) -> ErrorKind {
    match failure {
        StoreFailure::QuerySyntax | StoreFailure::InvalidRequest => ErrorKind::InvalidApiUsage,
        StoreFailure::DuplicateUri => ErrorKind::DuplicateKey,
        StoreFailure::Connection | StoreFailure::ServiceUnavailable => ErrorKind::ResourceFailure,
        StoreFailure::LimitExceeded | StoreFailure::TransactionNotFound => ErrorKind::ResourceUsage,
        StoreFailure::Conflict | StoreFailure::ConstraintViolation => {
            ErrorKind::DataIntegrityViolation
        }
        StoreFailure::Unknown => ErrorKind::Uncategorized,
    }
}

/// Translates a store failure into a [`DataError`], keeping the store's
/// message and the failure itself as the cause.
pub fn translate(err: StoreError) -> DataError {
    let kind = error_kind_of(err.failure());
    log::error!("Store failure ({}) reported as {}: {}", err.failure(), kind, err);
    let message = err.message().to_string();
    DataError::new_with_cause(&message, kind, err)
}
