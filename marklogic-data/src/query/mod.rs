//! Structured queries sent to the document store.
//!
//! Queries are plain values built either from [`StructuredQuery`] variants or
//! through the fluent helpers:
//!
//! ```rust,ignore
//! use marklogic_data::query::{property, text, FacetSpec, QueryDefinition};
//!
//! let definition = QueryDefinition::new(
//!     property("make").eq("Volvo").and(property("price").lt(30_000)),
//! )
//! .with_facet(FacetSpec::on("color"));
//!
//! let free_text = text("color:red -status:sold");
//! ```

mod definition;
mod fluent;
mod structured;

pub use definition::*;
pub use fluent::*;
pub use structured::*;
