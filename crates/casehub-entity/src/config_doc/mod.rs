//! The object-store-resident case configuration document.

pub mod model;

pub use model::{Assistant, CaseConfig, DocumentRef};
