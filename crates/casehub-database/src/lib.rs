//! # casehub-database
//!
//! PostgreSQL connection management, the [`AccessStore`](store::AccessStore)
//! trait over users/cases/grants, and its concrete sqlx implementation.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{AccessStore, PgAccessStore};
