//! Case and assistant password hashing.

pub mod hasher;

pub use hasher::PasswordHasher;
