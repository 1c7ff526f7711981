use thiserror::Error;

use crate::domain::ordering::OrderingError;
use crate::domain::repositories::GatewayError;
use crate::domain::team::value_objects::{InvalidApprovalValue, InvalidRole};
use crate::domain::team::{ReviewerRole, TeamId};

/// Errors surfaced by the team workflow controller
///
/// Validation variants are raised before any state changes. The `*Failed`
/// variants are raised after the optimistic change has been rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Index {index} out of range for {len} teams")]
    InvalidIndex { index: usize, len: usize },

    #[error(transparent)]
    InvalidApprovalValue(#[from] InvalidApprovalValue),

    #[error(transparent)]
    InvalidRole(#[from] InvalidRole),

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Another reorder is still in flight")]
    ReorderInProgress,

    #[error("Failed to update {role} approval for team {team_id}: {source}")]
    ApprovalUpdateFailed {
        team_id: TeamId,
        role: ReviewerRole,
        source: GatewayError,
    },

    #[error("Failed to persist team order: {0}")]
    ReorderFailed(#[source] GatewayError),

    #[error("Failed to delete {} team(s): {source}", .team_ids.len())]
    DeleteFailed {
        team_ids: Vec<TeamId>,
        source: GatewayError,
    },

    #[error("Failed to load teams: {0}")]
    LoadFailed(#[source] GatewayError),
}

impl From<OrderingError> for WorkflowError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::InvalidIndex { index, len } => WorkflowError::InvalidIndex { index, len },
        }
    }
}

impl WorkflowError {
    /// True for errors raised before any state was touched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidIndex { .. }
                | WorkflowError::InvalidApprovalValue(_)
                | WorkflowError::InvalidRole(_)
        )
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
