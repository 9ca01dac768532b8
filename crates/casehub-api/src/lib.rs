//! # casehub-api
//!
//! HTTP API layer for CaseHub built on Axum.
//!
//! REST endpoints for cases, assistants, documents, chat proxying, and
//! user administration, plus signed-object serving for the local storage
//! provider. Identity arrives in trusted forwarded headers; every handler
//! works against the shared [`AppState`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
