//! Catalog browsing: the filter/sort pipeline and its response cache.

pub mod cache;
pub mod filter;

pub use cache::CatalogCache;
pub use filter::{CatalogFilter, SortOrder, apply, categories, price_ceiling};
