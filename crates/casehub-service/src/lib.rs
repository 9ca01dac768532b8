//! # casehub-service
//!
//! Business logic for CaseHub. The reconciliation engine keeps the
//! relational access store convergent with the object store; the case,
//! assistant, and user services implement the operations the API exposes,
//! authorizing every one through the access-control decision logic.

pub mod access;
pub mod assistant;
pub mod case;
pub mod chat;
pub mod context;
pub mod urls;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
