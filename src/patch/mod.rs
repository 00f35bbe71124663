//! Change detection over the store's flat field mapping.

pub mod changeset;
pub mod diff;

pub use changeset::Changeset;
pub use diff::{apply_patch, diff_fields, values_equal};
