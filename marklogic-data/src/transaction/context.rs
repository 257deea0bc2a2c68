use crate::client::{DatabaseClient, StoreResult, TransactionHandle};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Timeout requested for a transaction when none is configured.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Holds the transaction handle of one unit of work.
///
/// A context starts idle. [`begin`](TransactionContext::begin) lazily asks
/// the store for a handle and marks the context as the owner of that
/// transaction; [`set_transaction`](TransactionContext::set_transaction)
/// joins a transaction owned by someone else. [`clear`](TransactionContext::clear)
/// returns the context to idle without talking to the store; finishing the
/// transaction is up to the [`TransactionManager`](super::TransactionManager).
///
/// # Characteristics
/// - **Lazy**: at most one handle request per activation; `begin` is a no-op
///   while a handle is held
/// - **Owned**: every mutation takes `&mut self`, so a context can never be
///   changed by two units of work at once. A context is not `Clone`; share
///   its transaction through [`set_transaction`](TransactionContext::set_transaction)
///   instead, which yields a joined context that never finishes it
/// - **Passive**: never commits, rolls back or classifies errors
///
/// # Usage
/// ```ignore
/// let mut context = TransactionContext::named("import");
/// context.begin(client.as_ref())?;
/// template.write(Some(&context), &mut car)?;
/// manager.commit(&mut context)?;
/// ```
///
/// An owning context cannot be duplicated:
/// ```compile_fail
/// use marklogic_data::transaction::TransactionContext;
///
/// let context = TransactionContext::new();
/// let copy = context.clone();
/// ```
#[derive(Debug)]
pub struct TransactionContext {
    name: Option<String>,
    handle: Option<TransactionHandle>,
    is_new: bool,
    timeout: Duration,
}

impl TransactionContext {
    pub fn new() -> Self {
        TransactionContext {
            name: None,
            handle: None,
            is_new: false,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Creates a context whose transaction carries `name` on the server.
    pub fn named(name: &str) -> Self {
        TransactionContext {
            name: Some(name.to_string()),
            ..TransactionContext::new()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Opens a transaction unless a handle is already held.
    ///
    /// # Errors
    /// Returns the client's [`StoreError`](crate::client::StoreError)
    /// untouched when the handle request fails; the context stays idle.
    pub fn begin(&mut self, client: &dyn DatabaseClient) -> StoreResult<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let handle = client.open_transaction(self.name.as_deref(), self.timeout)?;
        log::debug!("Transaction context began {}", handle);
        self.handle = Some(handle);
        self.is_new = true;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether this context opened its transaction and so must finish it.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Joins a transaction opened elsewhere. The context will not be
    /// considered its owner.
    pub fn set_transaction(&mut self, handle: TransactionHandle) {
        log::debug!("Transaction context joined {}", handle);
        self.handle = Some(handle);
        self.is_new = false;
    }

    pub fn transaction(&self) -> Option<&TransactionHandle> {
        self.handle.as_ref()
    }

    pub fn clear(&mut self) {
        self.handle = None;
        self.is_new = false;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        TransactionContext::new()
    }
}

impl Display for TransactionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.handle {
            Some(handle) if self.is_new => write!(f, "TransactionContext [owned {}]", handle),
            Some(handle) => write!(f, "TransactionContext [joined {}]", handle),
            None => write!(f, "TransactionContext [idle]"),
        }
    }
}
