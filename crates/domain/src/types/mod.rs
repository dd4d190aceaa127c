//! Domain types and models

pub mod admin;
pub mod indexation;
pub mod role;

// Re-export for convenience
pub use admin::{AdminAccount, AdminList, IdentityEnvelope, NewAdmin};
pub use indexation::{IndexationStatus, IndexationSummary, NewIndexation, UrlIndexation};
pub use role::Role;
