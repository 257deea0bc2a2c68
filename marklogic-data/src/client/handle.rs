use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Server-side identifier of an open transaction.
///
/// A handle is issued by
/// [`DatabaseClient::open_transaction`](super::DatabaseClient::open_transaction)
/// and attached to every request that should run inside that transaction. It
/// is an opaque value: cloning it does not open another transaction, and
/// dropping it neither commits nor rolls back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionHandle {
    id: String,
    name: Option<String>,
    timeout: Duration,
}

impl TransactionHandle {
    pub fn new(id: impl Into<String>, name: Option<String>, timeout: Duration) -> Self {
        TransactionHandle {
            id: id.into(),
            name,
            timeout,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The time limit the transaction was opened with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Display for TransactionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}
