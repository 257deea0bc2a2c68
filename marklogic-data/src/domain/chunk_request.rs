use super::Sort;
use std::fmt::{Display, Formatter};

/// Page-number / page-size view of a pagination request.
///
/// Stores address results by offset, so implementations are free to keep an
/// offset internally and derive the page number from it.
pub trait Pageable {
    fn page_number(&self) -> u64;

    fn page_size(&self) -> u64;

    /// Zero-based index of the first requested result.
    fn offset(&self) -> u64;

    fn sort(&self) -> &Sort;

    fn next(&self) -> Self
    where
        Self: Sized;

    fn previous_or_first(&self) -> Self
    where
        Self: Sized;

    fn first(&self) -> Self
    where
        Self: Sized;

    fn has_previous(&self) -> bool;
}

/// A pagination request addressed by raw offset and limit.
///
/// `ChunkRequest` satisfies [`Pageable`] while never rounding its offset to a
/// page boundary: a request for `(offset = 30, limit = 20)` reports page `1`
/// but still starts at result 30.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::domain::{ChunkRequest, Pageable, Sort};
///
/// let chunk = ChunkRequest::new(30, 20, Sort::unsorted());
/// assert_eq!(chunk.page_number(), 1);
/// assert_eq!(chunk.previous(), ChunkRequest::new(10, 20, Sort::unsorted()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkRequest {
    offset: u64,
    limit: u64,
    sort: Sort,
}

impl ChunkRequest {
    /// Creates a chunk request. A negative offset is clamped to zero.
    pub fn new(offset: i64, limit: u64, sort: Sort) -> Self {
        ChunkRequest {
            offset: offset.max(0) as u64,
            limit,
            sort,
        }
    }

    pub fn unsorted(offset: i64, limit: u64) -> Self {
        ChunkRequest::new(offset, limit, Sort::unsorted())
    }

    /// Creates a request for a whole page: `offset = page * size`.
    pub fn of_page(page: u64, size: u64, sort: Sort) -> Self {
        ChunkRequest {
            offset: page.saturating_mul(size),
            limit: size,
            sort,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn with_sort(&self, sort: Sort) -> Self {
        ChunkRequest {
            offset: self.offset,
            limit: self.limit,
            sort,
        }
    }

    /// The chunk ending where this one starts. Never goes below offset 0.
    pub fn previous(&self) -> Self {
        ChunkRequest {
            offset: self.offset.saturating_sub(self.limit),
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }
}

impl Pageable for ChunkRequest {
    /// `offset / limit`, or `0` for a zero limit.
    fn page_number(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.offset / self.limit
    }

    fn page_size(&self) -> u64 {
        self.limit
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn sort(&self) -> &Sort {
        &self.sort
    }

    fn next(&self) -> Self {
        ChunkRequest {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }

    fn previous_or_first(&self) -> Self {
        if self.has_previous() {
            self.previous()
        } else {
            self.first()
        }
    }

    fn first(&self) -> Self {
        ChunkRequest {
            offset: 0,
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }

    // Offset 1 counts as having no previous chunk.
    fn has_previous(&self) -> bool {
        self.offset > 1
    }
}

impl Display for ChunkRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ChunkRequest [offset: {}, limit: {}, sort: {}]",
            self.offset, self.limit, self.sort
        )
    }
}
