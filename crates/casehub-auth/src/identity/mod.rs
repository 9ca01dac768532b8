//! Principal resolution from identity-provider headers.

pub mod principal;

pub use principal::{IdentityResolver, Principal};
