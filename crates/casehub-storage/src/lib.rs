//! # casehub-storage
//!
//! [`ObjectStore`] implementations (local filesystem and S3), the object
//! key conventions for case assets, and signed-URL minting.
//!
//! [`ObjectStore`]: casehub_core::traits::storage::ObjectStore

pub mod manager;
pub mod paths;
pub mod providers;
pub mod sign;

pub use manager::StorageManager;
pub use sign::UrlSigner;
