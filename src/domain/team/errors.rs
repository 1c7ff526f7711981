use thiserror::Error;

use super::value_objects::TeamId;

/// Business rule violations raised by the Team aggregate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("A team needs at least one member")]
    NoMembers,

    #[error("Cannot remove the last member of team {0}")]
    LastMember(TeamId),

    #[error("Member not found: {0}")]
    MemberNotFound(String),
}
