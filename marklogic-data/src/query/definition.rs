use super::StructuredQuery;

/// Requests a facet over the distinct values of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetSpec {
    name: String,
    property: String,
    limit: Option<usize>,
}

impl FacetSpec {
    pub fn new(name: &str, property: &str) -> Self {
        FacetSpec {
            name: name.to_string(),
            property: property.to_string(),
            limit: None,
        }
    }

    /// A facet named after the property it breaks down.
    pub fn on(property: &str) -> Self {
        FacetSpec::new(property, property)
    }

    /// Caps the number of values reported.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// A query together with the facets to compute alongside it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDefinition {
    query: StructuredQuery,
    facets: Vec<FacetSpec>,
    collections: Vec<String>,
}

impl QueryDefinition {
    pub fn new(query: StructuredQuery) -> Self {
        QueryDefinition {
            query,
            facets: Vec::new(),
            collections: Vec::new(),
        }
    }

    pub fn with_facet(mut self, facet: FacetSpec) -> Self {
        self.facets.push(facet);
        self
    }

    /// Restricts the search to additional collections on top of the
    /// entity's own.
    pub fn in_collections(mut self, collections: &[&str]) -> Self {
        self.collections
            .extend(collections.iter().map(|c| c.to_string()));
        self
    }

    pub fn query(&self) -> &StructuredQuery {
        &self.query
    }

    pub fn facets(&self) -> &[FacetSpec] {
        &self.facets
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub(crate) fn with_query(mut self, query: StructuredQuery) -> Self {
        self.query = query;
        self
    }
}

impl From<StructuredQuery> for QueryDefinition {
    fn from(query: StructuredQuery) -> Self {
        QueryDefinition::new(query)
    }
}
