// Team domain module
// Contains team aggregate root, members, value objects, and domain events

#![allow(clippy::module_inception)]

pub mod errors;
pub mod events;
pub mod member;
pub mod team;
pub mod value_objects;

// Re-export main types for convenience
pub use errors::TeamError;
pub use member::Member;
pub use team::Team;
pub use value_objects::{ApprovalStatus, ReviewerRole, TeamId};
