//! Access and admin grant entities.

pub mod model;
pub mod role;

pub use model::{AccessGrant, AdminGrant};
pub use role::GrantRole;
