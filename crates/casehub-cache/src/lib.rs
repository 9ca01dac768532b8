//! # casehub-cache
//!
//! Process-scoped caches: a general in-memory [`CacheProvider`]
//! implementation and the signed-URL cache.
//!
//! [`CacheProvider`]: casehub_core::traits::cache::CacheProvider

pub mod memory;
pub mod signed_url;

pub use memory::MemoryCacheProvider;
pub use signed_url::SignedUrlCache;
