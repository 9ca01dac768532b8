//! Shared types and constants.

/// Case ids that ship as bundled demo content.
///
/// These cases are served from static assets, are never persisted to the
/// database, are skipped by reconciliation, and reject every mutating
/// operation regardless of the caller's permissions.
pub const STATIC_CASE_IDS: [&str; 4] = ["static-demo", "static-econ", "static-law", "static-med"];

/// Whether the given case id belongs to the bundled demo set.
pub fn is_static_case_id(case_id: &str) -> bool {
    STATIC_CASE_IDS.contains(&case_id)
}
