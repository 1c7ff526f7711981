use chrono::{DateTime, Utc};

use super::value_objects::{ApprovalStatus, ReviewerRole, TeamId};

/// Domain events that occur within the Team aggregate
///
/// Aggregate methods and workflow commands return these so callers can
/// log, audit or forward what actually changed.
///
/// # Example
/// ```
/// use teamboard_api::domain::team::events::TeamEvent;
/// use teamboard_api::domain::team::value_objects::TeamId;
///
/// let event = TeamEvent::Deleted { team_id: TeamId::from("t-1") };
/// assert_eq!(event.team_id().as_str(), "t-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamEvent {
    /// Fired when a team is created
    Created {
        team_id: TeamId,
        name: String,
        created_at: DateTime<Utc>,
    },
    /// Fired when a reviewer changes their approval
    ApprovalChanged {
        team_id: TeamId,
        role: ReviewerRole,
        from: ApprovalStatus,
        to: ApprovalStatus,
    },
    /// Fired when a team moves to a new list position
    Reordered {
        team_id: TeamId,
        from: usize,
        to: usize,
    },
    /// Fired when a team is removed from the collection
    Deleted { team_id: TeamId },
    /// Fired when a member joins the roster
    MemberAdded { team_id: TeamId, member_id: String },
    /// Fired when a member leaves the roster
    MemberRemoved { team_id: TeamId, member_id: String },
}

impl TeamEvent {
    /// Returns the team_id for this event
    pub fn team_id(&self) -> &TeamId {
        match self {
            TeamEvent::Created { team_id, .. } => team_id,
            TeamEvent::ApprovalChanged { team_id, .. } => team_id,
            TeamEvent::Reordered { team_id, .. } => team_id,
            TeamEvent::Deleted { team_id } => team_id,
            TeamEvent::MemberAdded { team_id, .. } => team_id,
            TeamEvent::MemberRemoved { team_id, .. } => team_id,
        }
    }
}
