//! Case entity (relational projection).

pub mod model;

pub use model::Case;
