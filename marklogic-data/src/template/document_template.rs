use super::{EntityOptions, TemplateConfig};
use crate::client::{DatabaseClient, DocumentWrite, SearchRequest, TransactionHandle};
use crate::convert::{Entity, TypeRegistry};
use crate::domain::{ChunkRequest, FacetedPage, Pageable};
use crate::errors::{DataError, DataResult};
use crate::query::{QueryDefinition, StructuredQuery};
use crate::transaction::TransactionContext;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Entry point for document operations on entities.
///
/// # Purpose
/// `DocumentTemplate` maps entities to documents and sends every operation to
/// the [`DatabaseClient`] it was built with. Each call takes the
/// [`TransactionContext`] to run in; `None`, or an idle context, runs the call
/// as its own single-statement transaction. Store failures are translated into
/// [`DataError`]s and never retried.
///
/// # Characteristics
/// - **Stateless**: holds only the client and the configuration; cheap to clone
/// - **Thread-Safe**: can be shared between threads, each passing its own context
/// - **Configurable**: per-entity [`EntityOptions`] shape every search of that entity
///
/// # Usage
/// ```ignore
/// let template = DocumentTemplate::builder(client)
///     .entity_options::<Car>(EntityOptions::new().extract(&["make", "price"]))
///     .build()?;
///
/// let id = template.write(None, &mut car)?;
/// let page: FacetedPage<Car> = template.search(
///     None,
///     &QueryDefinition::new(property("make").eq("Volvo")),
///     &ChunkRequest::unsorted(0, 20),
/// )?;
/// ```
#[derive(Clone)]
pub struct DocumentTemplate {
    inner: Arc<DocumentTemplateInner>,
}

impl DocumentTemplate {
    pub fn builder(client: Arc<dyn DatabaseClient>) -> DocumentTemplateBuilder {
        DocumentTemplateBuilder::new(client)
    }

    /// Creates a template with the default configuration.
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        DocumentTemplate {
            inner: Arc::new(DocumentTemplateInner {
                client,
                config: TemplateConfig::new(),
            }),
        }
    }

    pub fn client(&self) -> &Arc<dyn DatabaseClient> {
        &self.inner.client
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.inner.config
    }

    /// Saves `entity`, replacing any document with the same id.
    ///
    /// An entity without an id is given a random UUID first, so the caller's
    /// value reflects the stored identifier afterwards.
    ///
    /// # Returns
    /// The entity's id.
    pub fn write<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        entity: &mut T,
    ) -> DataResult<String> {
        self.inner.save(tx, entity, true)
    }

    /// Saves `entity` only if no document with its id exists yet.
    ///
    /// # Errors
    /// [`ErrorKind::DuplicateKey`](crate::errors::ErrorKind::DuplicateKey) when
    /// the id is already taken.
    pub fn insert<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        entity: &mut T,
    ) -> DataResult<String> {
        self.inner.save(tx, entity, false)
    }

    /// Writes every entity in order, stopping at the first failure.
    pub fn write_all<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        entities: &mut [T],
    ) -> DataResult<Vec<String>> {
        entities
            .iter_mut()
            .map(|entity| self.inner.save(tx, entity, true))
            .collect()
    }

    pub fn read<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        id: &str,
    ) -> DataResult<Option<T>> {
        let document = self.inner.client.read(handle(tx), &T::uri_for(id))?;
        document.map(|document| T::from_content(document.content)).transpose()
    }

    pub fn exists<T: Entity>(&self, tx: Option<&TransactionContext>, id: &str) -> DataResult<bool> {
        Ok(self.inner.client.read(handle(tx), &T::uri_for(id))?.is_some())
    }

    /// Deletes the entity stored under `id`, returning whether it existed.
    pub fn delete<T: Entity>(&self, tx: Option<&TransactionContext>, id: &str) -> DataResult<bool> {
        let uri = T::uri_for(id);
        let deleted = self.inner.client.delete(handle(tx), &uri)?;
        log::debug!("Delete {} (existed: {})", uri, deleted);
        Ok(deleted)
    }

    /// Number of `T` documents matching `query`.
    pub fn count<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        query: StructuredQuery,
    ) -> DataResult<u64> {
        let definition = QueryDefinition::new(query);
        let request = self.inner.search_request(
            &T::entity_name(),
            T::collections(),
            &definition,
            &ChunkRequest::unsorted(0, 0),
        );
        Ok(self.inner.client.search(handle(tx), &request)?.total)
    }

    /// The first `T` matching `query`, if any.
    pub fn search_one<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        query: StructuredQuery,
    ) -> DataResult<Option<T>> {
        let definition = QueryDefinition::new(query);
        let page: FacetedPage<T> = self.search(tx, &definition, &ChunkRequest::unsorted(0, 1))?;
        Ok(page.into_content().into_iter().next())
    }

    /// Runs `definition` against the collections of `T` and returns the
    /// requested chunk, the total match count and the requested facets.
    ///
    /// No match is not an error: the result is then an empty page.
    pub fn search<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        definition: &QueryDefinition,
        chunk: &ChunkRequest,
    ) -> DataResult<FacetedPage<T>> {
        self.inner.search_with(
            tx,
            &T::entity_name(),
            T::collections(),
            definition,
            chunk,
            T::from_content,
        )
    }

    /// [`search`](DocumentTemplate::search) for the first chunk of the default
    /// page size.
    pub fn search_page<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        definition: &QueryDefinition,
    ) -> DataResult<FacetedPage<T>> {
        let chunk = ChunkRequest::unsorted(0, self.inner.config.default_page_size());
        self.search(tx, definition, &chunk)
    }

    /// Searches a collection holding several document types and decodes each
    /// result through `registry`.
    ///
    /// Entity options registered under the registry's collection name apply.
    pub fn search_polymorphic<T>(
        &self,
        tx: Option<&TransactionContext>,
        registry: &TypeRegistry<T>,
        definition: &QueryDefinition,
        chunk: &ChunkRequest,
    ) -> DataResult<FacetedPage<T>> {
        let collection = registry.collection();
        self.inner.search_with(
            tx,
            collection,
            vec![collection.to_string()],
            definition,
            chunk,
            |content| registry.decode(content),
        )
    }

    /// Reads the document at `uri` and decodes it through `registry`.
    pub fn read_polymorphic<T>(
        &self,
        tx: Option<&TransactionContext>,
        registry: &TypeRegistry<T>,
        uri: &str,
    ) -> DataResult<Option<T>> {
        let document = self.inner.client.read(handle(tx), uri)?;
        document.map(|document| registry.decode(document.content)).transpose()
    }

    /// Deletes every document tagged with any of `collections`.
    ///
    /// Inside a transaction the deletion is undone if the transaction is
    /// rolled back.
    pub fn drop_collections(
        &self,
        tx: Option<&TransactionContext>,
        collections: &[&str],
    ) -> DataResult<u64> {
        let collections: Vec<String> = collections.iter().map(|c| c.to_string()).collect();
        let removed = self.inner.client.delete_collections(handle(tx), &collections)?;
        log::info!("Dropped {} documents from {:?}", removed, collections);
        Ok(removed)
    }
}

fn handle(tx: Option<&TransactionContext>) -> Option<&TransactionHandle> {
    tx.and_then(TransactionContext::transaction)
}

struct DocumentTemplateInner {
    client: Arc<dyn DatabaseClient>,
    config: TemplateConfig,
}

impl DocumentTemplateInner {
    fn save<T: Entity>(
        &self,
        tx: Option<&TransactionContext>,
        entity: &mut T,
        overwrite: bool,
    ) -> DataResult<String> {
        let id = match entity.id() {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = Uuid::new_v4().to_string();
                entity.set_id(id.clone());
                id
            }
        };

        let uri = T::uri_for(&id);
        let content = entity.to_content()?;
        let write = if overwrite {
            DocumentWrite::upsert(uri, content, T::collections())
        } else {
            DocumentWrite::create(uri, content, T::collections())
        };
        let uri = self.client.write(handle(tx), write)?;
        log::debug!("Saved {} {} at {}", T::entity_name(), id, uri);
        Ok(id)
    }

    fn search_request(
        &self,
        entity_name: &str,
        collections: Vec<String>,
        definition: &QueryDefinition,
        chunk: &ChunkRequest,
    ) -> SearchRequest {
        let options = self.config.options_named(entity_name);
        let base = match options {
            Some(options) => options.resolve_query(definition.query().clone()),
            None => definition.query().clone(),
        };
        let scoped = if definition.collections().is_empty() {
            base
        } else {
            base.and(StructuredQuery::Collection(definition.collections().to_vec()))
        };
        let definition = definition.clone().with_query(match options {
            Some(options) => options.decorate(scoped, entity_name),
            None => scoped,
        });

        let (extract, transform) = match options {
            Some(options) => (
                options.extract_paths().to_vec(),
                options.transform_name().map(str::to_string),
            ),
            None => (Vec::new(), None),
        };

        SearchRequest::new(definition.query().clone())
            .collections(collections)
            .sort(chunk.sort().clone())
            .page(chunk.offset(), chunk.limit())
            .facets(definition.facets().to_vec())
            .extract(extract)
            .transform(transform)
    }

    fn search_with<T, F>(
        &self,
        tx: Option<&TransactionContext>,
        entity_name: &str,
        collections: Vec<String>,
        definition: &QueryDefinition,
        chunk: &ChunkRequest,
        decode: F,
    ) -> DataResult<FacetedPage<T>>
    where
        F: Fn(Value) -> DataResult<T>,
    {
        let request = self.search_request(entity_name, collections, definition, chunk);
        let response = self.client.search(handle(tx), &request)?;
        let content = response
            .results
            .into_iter()
            .map(|document| decode(document.content))
            .collect::<DataResult<Vec<T>>>()?;

        log::debug!(
            "Search of {} returned {} of {} matches",
            entity_name,
            content.len(),
            response.total
        );
        Ok(FacetedPage::from_response(
            content,
            chunk.clone(),
            response.total,
            &response.facets,
        ))
    }
}

/// Builds a [`DocumentTemplate`], collecting configuration errors until
/// [`build`](DocumentTemplateBuilder::build).
pub struct DocumentTemplateBuilder {
    client: Arc<dyn DatabaseClient>,
    error: Option<DataError>,
    config: TemplateConfig,
}

impl DocumentTemplateBuilder {
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        DocumentTemplateBuilder {
            client,
            error: None,
            config: TemplateConfig::new(),
        }
    }

    pub fn default_page_size(mut self, size: u64) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_default_page_size(size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Registers search options for `T`.
    pub fn entity_options<T: Entity>(self, options: EntityOptions) -> Self {
        self.named_options(&T::entity_name(), options)
    }

    /// Registers search options under an entity or collection name, e.g.
    /// the collection of a [`TypeRegistry`].
    pub fn named_options(mut self, entity_name: &str, options: EntityOptions) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_options(entity_name.to_string(), options) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn build(self) -> DataResult<DocumentTemplate> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(DocumentTemplate {
            inner: Arc::new(DocumentTemplateInner {
                client: self.client,
                config: self.config,
            }),
        })
    }
}
