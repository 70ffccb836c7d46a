//! Well-known identifiers.

/// Sentinel parent id for top-level instrument groups. Deleting a group
/// re-parents its children here instead of removing them.
pub const INSTRUMENT_GROUP_ROOT_ID: &str = "ROOT";
