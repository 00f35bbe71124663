//! Ordering layer — strategies for reordering the managed file list.
//!
//! - [`natural`] — natural string comparison.
//! - [`rank`] — metadata rank lookup with a default for unranked items.
//! - [`dispatcher`] — [`OrderingDispatcher`], which picks a strategy by code
//!   and writes the result back into the store.

pub mod dispatcher;
pub mod natural;
pub mod rank;

pub use dispatcher::{order, OrderingDispatcher, SortMode, UnknownSortMode};
pub use natural::{natural_cmp, natural_sort};
pub use rank::{rank_from_value, resolve_rank};
