//! Pagination and result shapes.
//!
//! Searches are paged by [`ChunkRequest`], an offset/limit request that also
//! satisfies the page-number/page-size [`Pageable`] contract. Results come
//! back as a [`FacetedPage`]: the requested chunk of content, the total match
//! count and any facets computed alongside the search.
//!
//! ```rust,ignore
//! use marklogic_data::domain::{ChunkRequest, Pageable, Sort, Order};
//!
//! let chunk = ChunkRequest::new(0, 20, Sort::by(vec![Order::desc("price")]));
//! let page = template.search::<Car>(None, &definition, &chunk)?;
//! for facet in page.facets() {
//!     println!("{}: {} distinct values", facet.name(), facet.count());
//! }
//! ```

mod chunk_request;
mod facet;
mod faceted_page;
mod sort;

pub use chunk_request::*;
pub use facet::*;
pub use faceted_page::*;
pub use sort::*;
