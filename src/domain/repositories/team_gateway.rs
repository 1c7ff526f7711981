use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ordering::OrderPatchEntry;
use crate::domain::team::{ApprovalStatus, ReviewerRole, Team, TeamId};

/// Server-side narrowing for [`TeamGateway::list_teams`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    /// Substring to match, `None` for every team
    pub search: Option<String>,
}

/// Failures reported by a persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Gateway request timed out")]
    Timeout,

    #[error("Team not found: {0}")]
    NotFound(TeamId),

    #[error("Gateway rejected request: {0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Persistence gateway for an organization's teams
///
/// The workflow controller is the only caller. Every mutation is expected
/// to be atomic: `persist_order` and `bulk_delete_teams` either apply the
/// whole batch or nothing.
#[async_trait]
pub trait TeamGateway: Send + Sync {
    /// Fetch teams, sorted by their stored rank
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>, GatewayError>;

    /// Store one reviewer's approval for a team
    async fn update_approval(
        &self,
        team_id: &TeamId,
        role: ReviewerRole,
        status: ApprovalStatus,
    ) -> Result<(), GatewayError>;

    /// Store the full rank list produced by a reorder
    async fn persist_order(&self, patch: &[OrderPatchEntry]) -> Result<(), GatewayError>;

    /// Delete a team and its members
    async fn delete_team(&self, team_id: &TeamId) -> Result<(), GatewayError>;

    /// Delete several teams in one batch
    async fn bulk_delete_teams(&self, team_ids: &[TeamId]) -> Result<(), GatewayError>;
}
