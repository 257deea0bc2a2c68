//! # marklogic-data - Data Access Core for a Document Store
//!
//! `marklogic-data` maps Rust entities to JSON documents held in a
//! MarkLogic-style document database and runs searches, pagination and
//! faceting against it, optionally inside multi-statement transactions.
//!
//! ## Key Features
//!
//! - **Entities**: serde types stored one document per instance, tagged with collections
//! - **Transactions**: explicit per-unit-of-work contexts with lazily opened handles
//! - **Search**: structured and string queries, sorting, offset pagination and facets
//! - **Polymorphism**: several document types decoded into one sum type
//! - **Uniform Errors**: every store failure translated into one data-access taxonomy
//! - **In-Memory Store**: a complete in-process backend for tests and local use
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marklogic_data::domain::ChunkRequest;
//! use marklogic_data::memory::InMemoryClient;
//! use marklogic_data::query::{property, FacetSpec, QueryDefinition};
//! use marklogic_data::template::DocumentTemplate;
//! use marklogic_data::transaction::{TransactionDefinition, TransactionManager};
//! use std::sync::Arc;
//!
//! let client = Arc::new(InMemoryClient::new());
//! let template = DocumentTemplate::new(client.clone());
//! let manager = TransactionManager::new(client);
//!
//! manager.execute(&TransactionDefinition::new(), |context| {
//!     template.write(Some(context), &mut car)
//! })?;
//!
//! let page = template.search::<Car>(
//!     None,
//!     &QueryDefinition::new(property("make").eq("Volvo")).with_facet(FacetSpec::on("color")),
//!     &ChunkRequest::unsorted(0, 20),
//! )?;
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - Store connection contract, configuration and store failures
//! - [`convert`] - Entity mapping and polymorphic decoding
//! - [`domain`] - Sorting, chunk pagination and faceted pages
//! - [`errors`] - Error types and result definitions
//! - [`memory`] - In-process document store
//! - [`query`] - Structured queries and facet definitions
//! - [`template`] - Document operations façade and error translation
//! - [`transaction`] - Transaction contexts and their manager

pub mod client;
pub mod common;
pub mod convert;
pub mod domain;
pub mod errors;
pub mod memory;
pub mod query;
pub mod template;
pub mod transaction;
