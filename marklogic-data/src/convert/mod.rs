//! Mapping between Rust types and JSON document content.
//!
//! Plain types implement [`Entity`] and are converted through serde.
//! Families of types stored under one collection are decoded into a sum type
//! by a [`TypeRegistry`], keyed on the [`DISCRIMINATOR_FIELD`] written by
//! [`Entity::to_content`] for types with a [`type_alias`](Entity::type_alias).

mod entity;
mod type_registry;

pub use entity::*;
pub use type_registry::*;

/// Content field holding a document's type alias.
pub const DISCRIMINATOR_FIELD: &str = "_type";
