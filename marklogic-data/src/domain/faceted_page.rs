use super::{ChunkRequest, FacetResult, Pageable};
use crate::client::RawFacet;

/// One chunk of search results together with the facets computed over the
/// whole match set.
///
/// A `FacetedPage` is built once per search response and never changes
/// afterwards. Construction is a pure transformation of the store's payload;
/// no I/O happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetedPage<T> {
    content: Vec<T>,
    pageable: ChunkRequest,
    total: u64,
    facets: Vec<FacetResult>,
}

impl<T> FacetedPage<T> {
    pub fn new(
        content: Vec<T>,
        pageable: ChunkRequest,
        total: u64,
        facets: Vec<FacetResult>,
    ) -> Self {
        FacetedPage {
            content,
            pageable,
            total,
            facets,
        }
    }

    /// Builds a page from a raw facet payload, keeping the payload's facet
    /// and value order.
    pub fn from_response(
        content: Vec<T>,
        pageable: ChunkRequest,
        total: u64,
        raw_facets: &[RawFacet],
    ) -> Self {
        let facets = raw_facets.iter().map(FacetResult::from).collect();
        FacetedPage::new(content, pageable, total, facets)
    }

    pub fn empty(pageable: ChunkRequest) -> Self {
        FacetedPage::new(Vec::new(), pageable, 0, Vec::new())
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    pub fn pageable(&self) -> &ChunkRequest {
        &self.pageable
    }

    pub fn facets(&self) -> &[FacetResult] {
        &self.facets
    }

    pub fn facet(&self, name: &str) -> Option<&FacetResult> {
        self.facets.iter().find(|f| f.name() == name)
    }

    /// Total number of matches across all chunks.
    pub fn total_elements(&self) -> u64 {
        self.total
    }

    /// `ceil(total / limit)`, or `1` for a zero limit.
    pub fn total_pages(&self) -> u64 {
        let limit = self.pageable.limit();
        if limit == 0 {
            return 1;
        }
        self.total.div_ceil(limit)
    }

    pub fn number(&self) -> u64 {
        self.pageable.page_number()
    }

    pub fn size(&self) -> u64 {
        self.pageable.page_size()
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        let limit = self.pageable.limit();
        limit > 0 && self.pageable.offset().saturating_add(limit) < self.total
    }

    pub fn has_previous(&self) -> bool {
        self.pageable.has_previous()
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn next_pageable(&self) -> Option<ChunkRequest> {
        if self.has_next() {
            Some(self.pageable.next())
        } else {
            None
        }
    }

    pub fn previous_pageable(&self) -> Option<ChunkRequest> {
        if self.has_previous() {
            Some(self.pageable.previous_or_first())
        } else {
            None
        }
    }

    /// Converts the content, keeping paging and facets.
    pub fn map<U, F>(self, f: F) -> FacetedPage<U>
    where
        F: FnMut(T) -> U,
    {
        FacetedPage {
            content: self.content.into_iter().map(f).collect(),
            pageable: self.pageable,
            total: self.total,
            facets: self.facets,
        }
    }
}

impl<T> IntoIterator for FacetedPage<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FacetedPage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
