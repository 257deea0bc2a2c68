use super::{TransactionContext, DEFAULT_TRANSACTION_TIMEOUT};
use crate::client::DatabaseClient;
use crate::errors::{DataError, DataResult};
use std::sync::Arc;
use std::time::Duration;

/// How a unit of work relates to a transaction that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Join the running transaction, or start one if there is none
    #[default]
    Required,
    /// Always start a separate transaction
    RequiresNew,
}

/// Settings for a transaction started by the [`TransactionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDefinition {
    name: Option<String>,
    timeout: Duration,
    propagation: Propagation,
}

impl TransactionDefinition {
    pub fn new() -> Self {
        TransactionDefinition {
            name: None,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
            propagation: Propagation::Required,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub fn propagation_behavior(&self) -> Propagation {
        self.propagation
    }

    fn new_context(&self) -> TransactionContext {
        let context = match &self.name {
            Some(name) => TransactionContext::named(name),
            None => TransactionContext::new(),
        };
        context.with_timeout(self.timeout)
    }
}

impl Default for TransactionDefinition {
    fn default() -> Self {
        TransactionDefinition::new()
    }
}

/// Drives the lifecycle of [`TransactionContext`]s against one client.
///
/// Only a context that opened its own transaction commits or rolls it back;
/// a context that joined another transaction is simply cleared. Every store
/// failure is translated into a [`DataError`], and the context is cleared on
/// every path.
///
/// # Usage
/// ```ignore
/// let manager = TransactionManager::new(client.clone());
/// let id = manager.execute(&TransactionDefinition::new(), |context| {
///     template.write(Some(context), &mut car)
/// })?;
/// ```
#[derive(Clone)]
pub struct TransactionManager {
    client: Arc<dyn DatabaseClient>,
}

impl TransactionManager {
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        TransactionManager { client }
    }

    pub fn client(&self) -> &Arc<dyn DatabaseClient> {
        &self.client
    }

    pub fn begin(&self, context: &mut TransactionContext) -> DataResult<()> {
        context.begin(self.client.as_ref())?;
        Ok(())
    }

    /// Commits the context's transaction if the context owns it, then clears
    /// the context.
    ///
    /// A rejected commit is followed by a rollback so the store releases the
    /// transaction; the commit error is returned either way.
    pub fn commit(&self, context: &mut TransactionContext) -> DataResult<()> {
        let result = match context.transaction() {
            Some(handle) if context.is_new() => {
                log::debug!("Committing transaction {}", handle);
                self.client.commit(handle).map_err(|commit_err| {
                    if let Err(rollback_err) = self.client.rollback(handle) {
                        log::error!(
                            "Rollback of {} after failed commit failed: {}",
                            handle,
                            rollback_err
                        );
                    }
                    DataError::from(commit_err)
                })
            }
            _ => Ok(()),
        };
        context.clear();
        result
    }

    /// Rolls back the context's transaction if the context owns it, then
    /// clears the context.
    pub fn rollback(&self, context: &mut TransactionContext) -> DataResult<()> {
        let result = match context.transaction() {
            Some(handle) if context.is_new() => {
                log::debug!("Rolling back transaction {}", handle);
                self.client.rollback(handle).map_err(DataError::from)
            }
            _ => Ok(()),
        };
        context.clear();
        result
    }

    /// Runs `work` inside a new transaction: committed when `work` succeeds,
    /// rolled back when it fails.
    pub fn execute<R, F>(&self, definition: &TransactionDefinition, work: F) -> DataResult<R>
    where
        F: FnOnce(&TransactionContext) -> DataResult<R>,
    {
        let mut context = definition.new_context();
        self.begin(&mut context)?;

        match work(&context) {
            Ok(value) => {
                self.commit(&mut context)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback(&mut context) {
                    log::error!("Rollback after failed unit of work failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Runs `work` as part of `outer` when the definition allows joining and
    /// `outer` is active; the joined work neither commits nor rolls back.
    /// Otherwise behaves like [`execute`](TransactionManager::execute).
    pub fn execute_within<R, F>(
        &self,
        outer: &TransactionContext,
        definition: &TransactionDefinition,
        work: F,
    ) -> DataResult<R>
    where
        F: FnOnce(&TransactionContext) -> DataResult<R>,
    {
        match outer.transaction() {
            Some(handle) if definition.propagation == Propagation::Required => {
                let mut joined = definition.new_context();
                joined.set_transaction(handle.clone());
                let result = work(&joined);
                joined.clear();
                result
            }
            _ => self.execute(definition, work),
        }
    }
}
