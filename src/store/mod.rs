//! Store layer — the process-wide field mapping.
//!
//! [`KeyedStore`] holds every application field, applies batched patches and
//! tells its subscribers exactly which fields changed.

pub mod keyed_store;

pub use keyed_store::{string_list, BoxError, KeyedStore, SubscriberFn, SubscriberResult};
