//! User entity.

pub mod model;

pub use model::{UpdateUserFlags, User};
