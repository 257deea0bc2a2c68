//! Contract to the document store connection.
//!
//! Everything the rest of the crate needs from a store is expressed by the
//! [`DatabaseClient`] trait. Each call takes the transaction handle to run
//! under, or `None` to run as its own single-statement transaction.

mod config;
mod handle;
mod request;
mod store_error;

pub use config::*;
pub use handle::*;
pub use request::*;
pub use store_error::*;

use std::time::Duration;

/// Blocking connection to a document store.
///
/// Implementations must be safe to share between threads; the transaction
/// handles they hand out are not, and are only ever used by the unit of work
/// that opened or adopted them.
pub trait DatabaseClient: Send + Sync {
    /// Settings this client was constructed with.
    fn config(&self) -> &ClientConfig;

    /// Opens a multi-statement transaction that the server closes on its own
    /// once `timeout` has elapsed without a commit or rollback.
    fn open_transaction(&self, name: Option<&str>, timeout: Duration)
        -> StoreResult<TransactionHandle>;

    fn commit(&self, transaction: &TransactionHandle) -> StoreResult<()>;

    fn rollback(&self, transaction: &TransactionHandle) -> StoreResult<()>;

    /// Writes a document and returns its URI.
    fn write(
        &self,
        transaction: Option<&TransactionHandle>,
        document: DocumentWrite,
    ) -> StoreResult<String>;

    fn read(
        &self,
        transaction: Option<&TransactionHandle>,
        uri: &str,
    ) -> StoreResult<Option<StoredDocument>>;

    /// Deletes a document, returning whether it existed.
    fn delete(&self, transaction: Option<&TransactionHandle>, uri: &str) -> StoreResult<bool>;

    /// Deletes every document tagged with any of `collections`, returning
    /// the number of documents removed.
    fn delete_collections(
        &self,
        transaction: Option<&TransactionHandle>,
        collections: &[String],
    ) -> StoreResult<u64>;

    fn search(
        &self,
        transaction: Option<&TransactionHandle>,
        request: &SearchRequest,
    ) -> StoreResult<SearchResponse>;
}
