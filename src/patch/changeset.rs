use std::collections::BTreeSet;

/// The set of top-level field names whose value changed in one update.
/// Sorted, so iteration order is deterministic across runs.
pub type Changeset = BTreeSet<String>;

/// Create a new empty changeset.
pub fn create_changeset() -> Changeset {
    BTreeSet::new()
}
