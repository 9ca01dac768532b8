//! Repository implementations for the CaseHub relational entities.

pub mod case;
pub mod grant;
pub mod user;

pub use case::CaseRepository;
pub use grant::GrantRepository;
pub use user::UserRepository;
