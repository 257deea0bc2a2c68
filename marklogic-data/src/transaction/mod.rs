//! Transaction scoping for units of work.
//!
//! A [`TransactionContext`] carries the handle of the transaction a unit of
//! work runs in and is handed explicitly to every template call. The
//! [`TransactionManager`] opens, commits and rolls back the transactions
//! those contexts own, or runs a closure inside one with
//! [`execute`](TransactionManager::execute).

mod context;
mod manager;

pub use context::*;
pub use manager::*;
