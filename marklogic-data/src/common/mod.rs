//! Small shared helpers.

mod shared;

pub use shared::*;
