//! Access-control decision logic.

pub mod decision;

pub use decision::{CasePermissions, decide};
