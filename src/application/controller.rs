//! Team workflow controller.
//!
//! Every intent follows the same command shape: validate, apply the change
//! to the in-memory board, publish, call the gateway, then either keep the
//! change or revert it and return a typed error. The controller is the only
//! component that talks to the gateway.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};

use super::errors::{WorkflowError, WorkflowResult};
use super::tokens::{ApprovalKey, RequestTokens};
use super::view::{BoardView, OperationKind, OperationState};
use crate::config::{ReorderConflictPolicy, WorkflowConfig};
use crate::domain::ordering::{DragGesture, TeamOrderingService};
use crate::domain::repositories::{GatewayError, TeamFilter, TeamGateway};
use crate::domain::search::SearchFilter;
use crate::domain::team::events::TeamEvent;
use crate::domain::team::{ApprovalStatus, ReviewerRole, TeamId};

#[derive(Debug, Default)]
struct Board {
    ordering: TeamOrderingService,
    filter: SearchFilter,
    selection: BTreeSet<TeamId>,
    tokens: RequestTokens,
    operations: BTreeMap<OperationKind, OperationState>,
}

impl Board {
    fn view(&self) -> BoardView {
        BoardView {
            teams: self
                .ordering
                .teams()
                .iter()
                .filter(|team| self.filter.matches(team))
                .cloned()
                .collect(),
            selection: self.selection.iter().cloned().collect(),
            search: self.filter.query().to_string(),
            total: self.ordering.len(),
            operations: self.operations.clone(),
        }
    }

    fn visible_ids(&self) -> Vec<TeamId> {
        self.ordering
            .teams()
            .iter()
            .filter(|team| self.filter.matches(team))
            .map(|team| team.id().clone())
            .collect()
    }

    /// Puts acknowledged approvals back on teams restored after a failed
    /// delete; their snapshot may carry a value that was rolled back meanwhile.
    fn restore_confirmed_approvals(&mut self, team_ids: &[TeamId]) {
        for team_id in team_ids {
            for role in ReviewerRole::ALL {
                let key = ApprovalKey {
                    team_id: team_id.clone(),
                    role,
                };
                if let Some(status) = self.tokens.settled(&key) {
                    if let Some(team) = self.ordering.get_mut(team_id) {
                        team.set_approval(role, status);
                    }
                }
            }
        }
    }

    fn begin(&mut self, kind: OperationKind) {
        self.operations.insert(kind, OperationState::InFlight);
    }

    fn succeed(&mut self, kind: OperationKind) {
        self.operations.insert(kind, OperationState::Succeeded);
    }

    fn fail(&mut self, kind: OperationKind, err: &GatewayError) {
        self.operations.insert(
            kind,
            OperationState::Failed {
                message: err.to_string(),
            },
        );
    }
}

/// Orchestrates approvals, ordering, deletion, search and selection
///
/// Sequence-changing commands (load, reorder, delete, bulk delete) are
/// serialized through one gate so a patch is never computed against a
/// sequence another command is about to revert.
pub struct TeamWorkflowController {
    gateway: Arc<dyn TeamGateway>,
    config: WorkflowConfig,
    board: Mutex<Board>,
    sequence_gate: Mutex<()>,
    view_tx: watch::Sender<BoardView>,
}

impl TeamWorkflowController {
    pub fn new(gateway: Arc<dyn TeamGateway>, config: WorkflowConfig) -> Self {
        let (view_tx, _) = watch::channel(BoardView::default());
        let board = Board {
            filter: SearchFilter::new("", config.member_search),
            ..Board::default()
        };

        Self {
            gateway,
            config,
            board: Mutex::new(board),
            sequence_gate: Mutex::new(()),
            view_tx,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Latest published view
    pub fn view(&self) -> BoardView {
        self.view_tx.borrow().clone()
    }

    /// Receiver that is notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.view_tx.subscribe()
    }

    fn publish(&self, board: &Board) {
        self.view_tx.send_replace(board.view());
    }

    async fn call<T, F>(&self, request: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match tokio::time::timeout(self.config.gateway_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        }
    }

    async fn reorder_gate(&self) -> WorkflowResult<MutexGuard<'_, ()>> {
        match self.config.reorder_conflict {
            ReorderConflictPolicy::Queue => Ok(self.sequence_gate.lock().await),
            ReorderConflictPolicy::Reject => self
                .sequence_gate
                .try_lock()
                .map_err(|_| WorkflowError::ReorderInProgress),
        }
    }

    /// Replaces the board with the gateway's current team list
    ///
    /// Selections for teams that are no longer present are dropped.
    pub async fn load(&self, filter: &TeamFilter) -> WorkflowResult<usize> {
        let _gate = self.sequence_gate.lock().await;
        {
            let mut guard = self.board.lock().await;
            guard.begin(OperationKind::LoadTeams);
            self.publish(&guard);
        }

        let result = self.call(self.gateway.list_teams(filter)).await;

        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        match result {
            Ok(teams) => {
                board.ordering = TeamOrderingService::new(teams);
                let ordering = &board.ordering;
                board.selection.retain(|id| ordering.get(id).is_some());
                board.tokens.retain_teams(|id| ordering.get(id).is_some());
                for team in ordering.teams() {
                    for role in ReviewerRole::ALL {
                        let key = ApprovalKey {
                            team_id: team.id().clone(),
                            role,
                        };
                        board.tokens.rebase(&key, team.approval(role));
                    }
                }
                board.succeed(OperationKind::LoadTeams);
                self.publish(board);

                tracing::info!(count = board.ordering.len(), "Teams loaded");
                Ok(board.ordering.len())
            }
            Err(source) => {
                board.fail(OperationKind::LoadTeams, &source);
                self.publish(board);

                tracing::warn!(error = %source, "Failed to load teams");
                Err(WorkflowError::LoadFailed(source))
            }
        }
    }

    /// Sets one reviewer's approval on a team
    ///
    /// On gateway failure the field falls back to the last value the
    /// gateway acknowledged. While a newer request for the same team and
    /// role is unresolved, older responses leave the field to it.
    pub async fn change_approval(
        &self,
        team_id: &TeamId,
        role: ReviewerRole,
        status: ApprovalStatus,
    ) -> WorkflowResult<TeamEvent> {
        let key = ApprovalKey {
            team_id: team_id.clone(),
            role,
        };

        let (token, event) = {
            let mut guard = self.board.lock().await;
            let board = &mut *guard;
            let team = board
                .ordering
                .get_mut(team_id)
                .ok_or_else(|| WorkflowError::TeamNotFound(team_id.clone()))?;
            let previous = team.approval(role);
            let event = team.set_approval(role, status);
            let token = board.tokens.issue(key.clone(), previous);
            board.begin(OperationKind::ChangeApproval);
            self.publish(board);
            (token, event)
        };

        let result = self
            .call(self.gateway.update_approval(team_id, role, status))
            .await;

        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        match result {
            Ok(()) => {
                if let Some(shown) = board.tokens.succeed(&key, token, status) {
                    if let Some(team) = board.ordering.get_mut(team_id) {
                        team.set_approval(role, shown);
                    }
                }
                board.succeed(OperationKind::ChangeApproval);
                self.publish(board);

                tracing::info!(team_id = %team_id, role = %role, status = %status, "Approval updated");
                Ok(event)
            }
            Err(source) => {
                match board.tokens.fail(&key, token) {
                    Some(confirmed) => {
                        // A team removed by an in-flight delete picks this up on reinsert
                        if let Some(team) = board.ordering.get_mut(team_id) {
                            team.set_approval(role, confirmed);
                        }
                        tracing::warn!(
                            team_id = %team_id,
                            role = %role,
                            error = %source,
                            "Approval update failed, reverted to {}",
                            confirmed
                        );
                    }
                    None => {
                        tracing::warn!(
                            team_id = %team_id,
                            role = %role,
                            error = %source,
                            "Approval update failed, newer request still in flight"
                        );
                    }
                }
                board.fail(OperationKind::ChangeApproval, &source);
                self.publish(board);

                Err(WorkflowError::ApprovalUpdateFailed {
                    team_id: team_id.clone(),
                    role,
                    source,
                })
            }
        }
    }

    /// [`Self::change_approval`] with role and status still in their wire
    /// form; both are decoded before anything changes.
    pub async fn change_approval_encoded(
        &self,
        team_id: &TeamId,
        role: &str,
        status: &str,
    ) -> WorkflowResult<TeamEvent> {
        let role: ReviewerRole = role.parse()?;
        let status = ApprovalStatus::from_text(status)?;
        self.change_approval(team_id, role, status).await
    }

    /// Click-advance: moves the approval one step along its cycle
    pub async fn advance_approval(
        &self,
        team_id: &TeamId,
        role: ReviewerRole,
    ) -> WorkflowResult<TeamEvent> {
        let current = {
            let guard = self.board.lock().await;
            guard
                .ordering
                .get(team_id)
                .map(|team| team.approval(role))
                .ok_or_else(|| WorkflowError::TeamNotFound(team_id.clone()))?
        };
        self.change_approval(team_id, role, current.next()).await
    }

    /// Moves the team at `from` to `to` in the full ordered sequence and
    /// persists the complete rank list
    ///
    /// Returns `Ok(None)` when both indices are equal; nothing is persisted.
    pub async fn reorder(&self, from: usize, to: usize) -> WorkflowResult<Option<TeamEvent>> {
        let _gate = self.reorder_gate().await?;

        let (previous, patch, team_id) = {
            let mut guard = self.board.lock().await;
            let board = &mut *guard;
            let moved = TeamOrderingService::move_item(board.ordering.teams(), from, to)?;
            if from == to {
                tracing::debug!(index = from, "Reorder onto same index ignored");
                return Ok(None);
            }

            let previous = board.ordering.id_order();
            let team_id = moved[to].id().clone();
            let patch = TeamOrderingService::to_order_patch(&moved);
            board.ordering.replace(moved);
            board.begin(OperationKind::Reorder);
            self.publish(board);
            (previous, patch, team_id)
        };

        let result = self.call(self.gateway.persist_order(&patch)).await;

        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        match result {
            Ok(()) => {
                board.succeed(OperationKind::Reorder);
                self.publish(board);

                tracing::info!(team_id = %team_id, from, to, "Teams reordered");
                Ok(Some(TeamEvent::Reordered { team_id, from, to }))
            }
            Err(source) => {
                board.ordering.restore_id_order(&previous);
                board.fail(OperationKind::Reorder, &source);
                self.publish(board);

                tracing::warn!(team_id = %team_id, from, to, error = %source, "Reorder failed, order restored");
                Err(WorkflowError::ReorderFailed(source))
            }
        }
    }

    /// Resolves a finished drag into at most one reorder
    pub async fn finish_drag(&self, gesture: DragGesture) -> WorkflowResult<Option<TeamEvent>> {
        match gesture.finish() {
            Some(request) => self.reorder(request.from, request.to).await,
            None => {
                tracing::debug!(source = ?gesture.source(), "Drag ended without a target");
                Ok(None)
            }
        }
    }

    /// Deletes one team; confirmation is the caller's job
    pub async fn delete_team(&self, team_id: &TeamId) -> WorkflowResult<TeamEvent> {
        let _gate = self.sequence_gate.lock().await;

        let removed = {
            let mut guard = self.board.lock().await;
            let board = &mut *guard;
            if board.ordering.get(team_id).is_none() {
                return Err(WorkflowError::TeamNotFound(team_id.clone()));
            }
            let ids: HashSet<TeamId> = [team_id.clone()].into_iter().collect();
            let removed = board.ordering.remove(&ids);
            board.begin(OperationKind::Delete);
            self.publish(board);
            removed
        };

        let result = self.call(self.gateway.delete_team(team_id)).await;

        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        match result {
            Ok(()) => {
                board.selection.remove(team_id);
                board.tokens.forget_team(team_id);
                board.succeed(OperationKind::Delete);
                self.publish(board);

                tracing::info!(team_id = %team_id, "Team deleted");
                Ok(TeamEvent::Deleted {
                    team_id: team_id.clone(),
                })
            }
            Err(source) => {
                board.ordering.reinsert(removed);
                board.restore_confirmed_approvals(std::slice::from_ref(team_id));
                board.fail(OperationKind::Delete, &source);
                self.publish(board);

                tracing::warn!(team_id = %team_id, error = %source, "Delete failed, team restored");
                Err(WorkflowError::DeleteFailed {
                    team_ids: vec![team_id.clone()],
                    source,
                })
            }
        }
    }

    /// Deletes several teams in one gateway batch
    ///
    /// Every id must be loaded. On success the whole selection is cleared;
    /// on failure every removed team goes back to its original position.
    pub async fn bulk_delete(&self, team_ids: &[TeamId]) -> WorkflowResult<Vec<TeamEvent>> {
        let mut seen = HashSet::new();
        let ids: Vec<TeamId> = team_ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let _gate = self.sequence_gate.lock().await;

        let removed = {
            let mut guard = self.board.lock().await;
            let board = &mut *guard;
            if let Some(missing) = ids.iter().find(|id| board.ordering.get(id).is_none()) {
                return Err(WorkflowError::TeamNotFound(missing.clone()));
            }
            let removed = board.ordering.remove(&seen);
            board.begin(OperationKind::BulkDelete);
            self.publish(board);
            removed
        };

        let result = self.call(self.gateway.bulk_delete_teams(&ids)).await;

        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        match result {
            Ok(()) => {
                board.selection.clear();
                for id in &ids {
                    board.tokens.forget_team(id);
                }
                board.succeed(OperationKind::BulkDelete);
                self.publish(board);

                tracing::info!(count = ids.len(), "Teams deleted");
                Ok(ids
                    .into_iter()
                    .map(|team_id| TeamEvent::Deleted { team_id })
                    .collect())
            }
            Err(source) => {
                board.ordering.reinsert(removed);
                board.restore_confirmed_approvals(&ids);
                board.fail(OperationKind::BulkDelete, &source);
                self.publish(board);

                tracing::warn!(count = ids.len(), error = %source, "Bulk delete failed, teams restored");
                Err(WorkflowError::DeleteFailed {
                    team_ids: ids,
                    source,
                })
            }
        }
    }

    /// Bulk-deletes whatever is currently selected
    pub async fn bulk_delete_selected(&self) -> WorkflowResult<Vec<TeamEvent>> {
        let ids: Vec<TeamId> = {
            let guard = self.board.lock().await;
            guard.selection.iter().cloned().collect()
        };
        self.bulk_delete(&ids).await
    }

    pub async fn set_search_filter(&self, query: &str) {
        let mut guard = self.board.lock().await;
        guard.filter = SearchFilter::new(query, self.config.member_search);
        self.publish(&guard);

        tracing::debug!(query, "Search filter updated");
    }

    /// Flips one team's selection; returns whether it is now selected
    pub async fn toggle_selection(&self, team_id: &TeamId) -> WorkflowResult<bool> {
        let mut guard = self.board.lock().await;
        if guard.ordering.get(team_id).is_none() {
            return Err(WorkflowError::TeamNotFound(team_id.clone()));
        }

        let selected = if guard.selection.remove(team_id) {
            false
        } else {
            guard.selection.insert(team_id.clone());
            true
        };
        self.publish(&guard);
        Ok(selected)
    }

    /// Selects every team in the current filter, or deselects them all if
    /// they already are; teams outside the filter are left alone.
    ///
    /// Returns the size of the selection afterwards.
    pub async fn toggle_select_all(&self) -> usize {
        let mut guard = self.board.lock().await;
        let visible = guard.visible_ids();

        if visible.iter().all(|id| guard.selection.contains(id)) {
            for id in &visible {
                guard.selection.remove(id);
            }
        } else {
            guard.selection.extend(visible);
        }
        self.publish(&guard);
        guard.selection.len()
    }

    /// Clears the selection, including teams hidden by the filter
    pub async fn select_none(&self) {
        let mut guard = self.board.lock().await;
        guard.selection.clear();
        self.publish(&guard);
    }
}
