//! # casehub-entity
//!
//! Domain entity models for CaseHub: relational rows (users, cases,
//! grants) and the object-store-resident case configuration document.

pub mod case;
pub mod config_doc;
pub mod grant;
pub mod user;

pub use case::Case;
pub use config_doc::{Assistant, CaseConfig, DocumentRef};
pub use grant::{AccessGrant, AdminGrant, GrantRole};
pub use user::User;
