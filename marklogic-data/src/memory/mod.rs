//! An in-process document store.
//!
//! [`InMemoryClient`] implements [`DatabaseClient`](crate::client::DatabaseClient)
//! without a server, including transactions, string queries, facets and
//! transforms. It backs the test suites and can stand in for a real
//! connection wherever one is expected.

mod client;
mod config;
mod evaluator;
mod query_text;

pub use client::*;
pub use config::*;
