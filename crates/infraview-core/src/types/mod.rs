//! Query helper types carried by list and find operations.

pub mod filter;
pub mod pagination;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use pagination::PageRequest;
pub use sorting::{SortDirection, SortField};

/// Resolves a dotted field path (`metadata.name`) inside a JSON document.
pub fn lookup_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| current.get(segment))
}
