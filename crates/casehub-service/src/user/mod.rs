//! User and grant administration.

pub mod service;

pub use service::UserAdminService;
