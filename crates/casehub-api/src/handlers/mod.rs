//! HTTP request handlers, organized by domain.

pub mod admin;
pub mod assistants;
pub mod cases;
pub mod chat;
pub mod documents;
pub mod health;
pub mod objects;
