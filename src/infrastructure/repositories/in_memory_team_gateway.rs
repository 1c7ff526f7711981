use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::ordering::OrderPatchEntry;
use crate::domain::repositories::{GatewayError, TeamFilter, TeamGateway};
use crate::domain::search::SearchFilter;
use crate::domain::team::{ApprovalStatus, ReviewerRole, Team, TeamId};

/// A call received by [`InMemoryTeamGateway`], in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListTeams(TeamFilter),
    UpdateApproval {
        team_id: TeamId,
        role: ReviewerRole,
        status: ApprovalStatus,
    },
    PersistOrder(Vec<OrderPatchEntry>),
    DeleteTeam(TeamId),
    BulkDeleteTeams(Vec<TeamId>),
}

/// Scripted outcome for the next gateway call
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    pub delay: Duration,
    pub failure: Option<GatewayError>,
}

impl ScriptedResponse {
    pub fn ok_after(delay: Duration) -> Self {
        Self {
            delay,
            failure: None,
        }
    }

    pub fn fail(failure: GatewayError) -> Self {
        Self {
            delay: Duration::ZERO,
            failure: Some(failure),
        }
    }

    pub fn fail_after(delay: Duration, failure: GatewayError) -> Self {
        Self {
            delay,
            failure: Some(failure),
        }
    }
}

/// Team gateway backed by a vector in memory
///
/// Records every call and lets tests queue delays and failures. A call
/// with no scripted response succeeds immediately. Failed calls leave the
/// stored teams untouched.
#[derive(Debug, Default)]
pub struct InMemoryTeamGateway {
    teams: Mutex<Vec<Team>>,
    calls: Mutex<Vec<GatewayCall>>,
    script: Mutex<VecDeque<ScriptedResponse>>,
}

impl InMemoryTeamGateway {
    pub fn new(teams: Vec<Team>) -> Self {
        Self {
            teams: Mutex::new(teams),
            ..Self::default()
        }
    }

    /// Queues the outcome of the next unscripted call
    pub async fn push_response(&self, response: ScriptedResponse) {
        self.script.lock().await.push_back(response);
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    /// Stored teams, sorted by rank
    pub async fn teams(&self) -> Vec<Team> {
        let mut teams = self.teams.lock().await.clone();
        teams.sort_by_key(|t| t.order());
        teams
    }

    async fn receive(&self, call: GatewayCall) -> Result<(), GatewayError> {
        self.calls.lock().await.push(call);
        let response = self.script.lock().await.pop_front().unwrap_or_default();

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        match response.failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TeamGateway for InMemoryTeamGateway {
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>, GatewayError> {
        self.receive(GatewayCall::ListTeams(filter.clone())).await?;

        let search = SearchFilter::new(filter.search.clone().unwrap_or_default(), true);
        Ok(self
            .teams()
            .await
            .into_iter()
            .filter(|team| search.matches(team))
            .collect())
    }

    async fn update_approval(
        &self,
        team_id: &TeamId,
        role: ReviewerRole,
        status: ApprovalStatus,
    ) -> Result<(), GatewayError> {
        self.receive(GatewayCall::UpdateApproval {
            team_id: team_id.clone(),
            role,
            status,
        })
        .await?;

        let mut teams = self.teams.lock().await;
        let team = teams
            .iter_mut()
            .find(|t| t.id() == team_id)
            .ok_or_else(|| GatewayError::NotFound(team_id.clone()))?;
        team.set_approval(role, status);
        Ok(())
    }

    async fn persist_order(&self, patch: &[OrderPatchEntry]) -> Result<(), GatewayError> {
        self.receive(GatewayCall::PersistOrder(patch.to_vec())).await?;

        let mut teams = self.teams.lock().await;
        if let Some(entry) = patch.iter().find(|e| !teams.iter().any(|t| t.id() == &e.id)) {
            return Err(GatewayError::NotFound(entry.id.clone()));
        }
        for entry in patch {
            if let Some(team) = teams.iter_mut().find(|t| t.id() == &entry.id) {
                team.set_order(entry.order);
            }
        }
        Ok(())
    }

    async fn delete_team(&self, team_id: &TeamId) -> Result<(), GatewayError> {
        self.receive(GatewayCall::DeleteTeam(team_id.clone())).await?;

        let mut teams = self.teams.lock().await;
        let before = teams.len();
        teams.retain(|t| t.id() != team_id);
        if teams.len() == before {
            return Err(GatewayError::NotFound(team_id.clone()));
        }
        Ok(())
    }

    async fn bulk_delete_teams(&self, team_ids: &[TeamId]) -> Result<(), GatewayError> {
        self.receive(GatewayCall::BulkDeleteTeams(team_ids.to_vec()))
            .await?;

        let mut teams = self.teams.lock().await;
        if let Some(missing) = team_ids.iter().find(|id| !teams.iter().any(|t| t.id() == *id)) {
            return Err(GatewayError::NotFound(missing.clone()));
        }
        let doomed: HashSet<&TeamId> = team_ids.iter().collect();
        teams.retain(|t| !doomed.contains(t.id()));
        Ok(())
    }
}
