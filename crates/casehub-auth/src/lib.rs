//! # casehub-auth
//!
//! Identity resolution (trusted headers from the external identity
//! provider), Argon2 hashing for case and assistant passwords, and the
//! pure access-control decision logic.

pub mod access;
pub mod identity;
pub mod password;

pub use access::{CasePermissions, decide};
pub use identity::Principal;
pub use password::PasswordHasher;
