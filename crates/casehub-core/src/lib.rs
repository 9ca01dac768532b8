//! # casehub-core
//!
//! Core crate for CaseHub. Contains configuration schemas, cross-crate
//! traits, shared types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CaseHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
