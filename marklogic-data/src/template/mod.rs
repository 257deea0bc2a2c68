//! Document operations on entities.
//!
//! [`DocumentTemplate`] is the façade application code talks to. Search
//! behavior can be tuned per entity with [`EntityOptions`] registered in the
//! [`TemplateConfig`], and store failures reach callers through [`translate`].

mod document_template;
mod options;
mod translator;

pub use document_template::*;
pub use options::*;
pub use translator::*;
