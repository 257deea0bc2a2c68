use crate::convert::Entity;
use crate::errors::{DataError, DataResult, ErrorKind};
use crate::query::StructuredQuery;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Page size of searches that are not given a chunk request.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Rewrites the final query of an entity's searches.
pub trait QueryDecorator: Send + Sync {
    fn decorate(&self, query: StructuredQuery, entity_name: &str) -> StructuredQuery;
}

impl<F> QueryDecorator for F
where
    F: Fn(StructuredQuery, &str) -> StructuredQuery + Send + Sync,
{
    fn decorate(&self, query: StructuredQuery, entity_name: &str) -> StructuredQuery {
        self(query, entity_name)
    }
}

/// Search settings applied to every search of one entity type.
#[derive(Clone, Default)]
pub struct EntityOptions {
    query_override: Option<StructuredQuery>,
    extract: Vec<String>,
    transform: Option<String>,
    decorator: Option<Arc<dyn QueryDecorator>>,
}

impl EntityOptions {
    pub fn new() -> Self {
        EntityOptions::default()
    }

    /// Replaces the caller's query with `query`.
    pub fn query_override(mut self, query: StructuredQuery) -> Self {
        self.query_override = Some(query);
        self
    }

    /// Limits search results to the given property paths.
    pub fn extract(mut self, paths: &[&str]) -> Self {
        self.extract = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Applies the named server-side transform to search results.
    pub fn transform(mut self, name: &str) -> Self {
        self.transform = Some(name.to_string());
        self
    }

    pub fn decorator<D: QueryDecorator + 'static>(mut self, decorator: D) -> Self {
        self.decorator = Some(Arc::new(decorator));
        self
    }

    pub fn overridden_query(&self) -> Option<&StructuredQuery> {
        self.query_override.as_ref()
    }

    pub fn extract_paths(&self) -> &[String] {
        &self.extract
    }

    pub fn transform_name(&self) -> Option<&str> {
        self.transform.as_deref()
    }

    /// The caller's query, or the override when one is set.
    pub fn resolve_query(&self, query: StructuredQuery) -> StructuredQuery {
        match &self.query_override {
            Some(replacement) => replacement.clone(),
            None => query,
        }
    }

    /// Passes the final query through the decorator, if any.
    pub fn decorate(&self, query: StructuredQuery, entity_name: &str) -> StructuredQuery {
        match &self.decorator {
            Some(decorator) => decorator.decorate(query, entity_name),
            None => query,
        }
    }
}

impl Debug for EntityOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityOptions")
            .field("query_override", &self.query_override)
            .field("extract", &self.extract)
            .field("transform", &self.transform)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

/// Settings of a [`DocumentTemplate`](super::DocumentTemplate).
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    default_page_size: u64,
    entity_options: HashMap<String, EntityOptions>,
}

impl TemplateConfig {
    pub fn new() -> Self {
        TemplateConfig {
            default_page_size: DEFAULT_PAGE_SIZE,
            entity_options: HashMap::new(),
        }
    }

    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    pub(crate) fn set_default_page_size(&mut self, size: u64) -> DataResult<()> {
        if size == 0 {
            log::error!("Default page size must be positive");
            return Err(DataError::new(
                "Default page size must be greater than zero",
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.default_page_size = size;
        Ok(())
    }

    pub(crate) fn set_options(
        &mut self,
        entity_name: String,
        options: EntityOptions,
    ) -> DataResult<()> {
        if self.entity_options.contains_key(&entity_name) {
            log::error!("Entity options for {} registered twice", entity_name);
            return Err(DataError::new(
                &format!("Options for entity {} are already registered", entity_name),
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.entity_options.insert(entity_name, options);
        Ok(())
    }

    /// Options registered for `T`, if any.
    pub fn options_for<T: Entity>(&self) -> Option<&EntityOptions> {
        self.entity_options.get(&T::entity_name())
    }

    pub fn options_named(&self, entity_name: &str) -> Option<&EntityOptions> {
        self.entity_options.get(entity_name)
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        TemplateConfig::new()
    }
}
