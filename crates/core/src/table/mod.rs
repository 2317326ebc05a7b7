pub mod sort;

pub use sort::{sorted_rows, SortConfig, SortDirection, SortKey, SortValue};
