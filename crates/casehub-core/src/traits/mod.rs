//! Cross-crate traits defined in core and implemented in leaf crates.

pub mod cache;
pub mod storage;
