use crate::domain::Sort;
use crate::query::{FacetSpec, StructuredQuery};
use serde_json::Value;

/// A document as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub uri: String,
    pub content: Value,
    pub collections: Vec<String>,
}

impl StoredDocument {
    pub fn new(uri: impl Into<String>, content: Value, collections: Vec<String>) -> Self {
        StoredDocument {
            uri: uri.into(),
            content,
            collections,
        }
    }

    pub fn in_collection(&self, collection: &str) -> bool {
        self.collections.iter().any(|c| c == collection)
    }
}

/// A single document write.
///
/// With `overwrite` unset the store must reject the write when the URI is
/// already taken.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub uri: String,
    pub content: Value,
    pub collections: Vec<String>,
    pub overwrite: bool,
}

impl DocumentWrite {
    pub fn upsert(uri: impl Into<String>, content: Value, collections: Vec<String>) -> Self {
        DocumentWrite {
            uri: uri.into(),
            content,
            collections,
            overwrite: true,
        }
    }

    pub fn create(uri: impl Into<String>, content: Value, collections: Vec<String>) -> Self {
        DocumentWrite {
            uri: uri.into(),
            content,
            collections,
            overwrite: false,
        }
    }

    pub(crate) fn into_stored(self) -> StoredDocument {
        StoredDocument::new(self.uri, self.content, self.collections)
    }
}

/// A structured search sent to the store.
///
/// `start` is a zero-based offset into the ordered match list; a
/// `page_length` of zero asks for totals and facets only.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: StructuredQuery,
    pub collections: Vec<String>,
    pub sort: Sort,
    pub start: u64,
    pub page_length: u64,
    pub facets: Vec<FacetSpec>,
    pub extract: Vec<String>,
    pub transform: Option<String>,
}

impl SearchRequest {
    pub fn new(query: StructuredQuery) -> Self {
        SearchRequest {
            query,
            collections: Vec::new(),
            sort: Sort::unsorted(),
            start: 0,
            page_length: 0,
            facets: Vec::new(),
            extract: Vec::new(),
            transform: None,
        }
    }

    pub fn collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, start: u64, page_length: u64) -> Self {
        self.start = start;
        self.page_length = page_length;
        self
    }

    pub fn facets(mut self, facets: Vec<FacetSpec>) -> Self {
        self.facets = facets;
        self
    }

    pub fn extract(mut self, paths: Vec<String>) -> Self {
        self.extract = paths;
        self
    }

    pub fn transform(mut self, transform: Option<String>) -> Self {
        self.transform = transform;
        self
    }
}

/// The raw facet payload of a search response: a facet name and its
/// `(label, count)` pairs in the order the store produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFacet {
    pub name: String,
    pub values: Vec<(String, u64)>,
}

impl RawFacet {
    pub fn new(name: impl Into<String>, values: Vec<(String, u64)>) -> Self {
        RawFacet {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    pub total: u64,
    pub results: Vec<StoredDocument>,
    pub facets: Vec<RawFacet>,
}
