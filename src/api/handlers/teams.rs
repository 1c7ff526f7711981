use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::errors::ApiError;
use crate::application::{BoardView, OperationKind, OperationState, TeamWorkflowController};
use crate::domain::repositories::TeamFilter;
use crate::domain::team::{ApprovalStatus, Member, ReviewerRole, Team, TeamId};

type Controller = State<Arc<TeamWorkflowController>>;

/// Team as rendered in the board
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: TeamId,
    pub name: String,
    pub description: String,
    pub manager_name: String,
    pub director_name: String,
    pub manager_approval: ApprovalStatus,
    pub director_approval: ApprovalStatus,
    pub order: usize,
    pub members: Vec<Member>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id().clone(),
            name: team.name().to_string(),
            description: team.description().to_string(),
            manager_name: team.manager_name().to_string(),
            director_name: team.director_name().to_string(),
            manager_approval: team.approval(ReviewerRole::Manager),
            director_approval: team.approval(ReviewerRole::Director),
            order: team.order(),
            members: team.members().to_vec(),
        }
    }
}

/// Filtered, ordered board plus selection and operation state
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub teams: Vec<TeamResponse>,
    pub selection: Vec<TeamId>,
    pub search: String,
    pub total: usize,
    pub operations: BTreeMap<OperationKind, OperationState>,
}

impl From<&BoardView> for BoardResponse {
    fn from(view: &BoardView) -> Self {
        Self {
            teams: view.teams.iter().map(TeamResponse::from).collect(),
            selection: view.selection.clone(),
            search: view.search.clone(),
            total: view.total,
            operations: view.operations.clone(),
        }
    }
}

/// Request body for an approval change; `status` may be `1` or `"1"`
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub status: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

/// Request body for bulk delete; without ids the current selection is used
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteRequest {
    pub team_ids: Option<Vec<TeamId>>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: Vec<TeamId>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: bool,
    pub selection: Vec<TeamId>,
}

fn board(controller: &TeamWorkflowController) -> Json<BoardResponse> {
    Json(BoardResponse::from(&controller.view()))
}

/// Current board
///
/// GET /api/board
pub async fn get_board(State(controller): Controller) -> Json<BoardResponse> {
    board(&controller)
}

/// Re-fetch every team from the gateway
///
/// POST /api/board/reload
pub async fn reload_board(State(controller): Controller) -> Result<Json<BoardResponse>, ApiError> {
    controller.load(&TeamFilter::default()).await?;
    Ok(board(&controller))
}

/// Set one reviewer's approval
///
/// PUT /api/teams/:id/approvals/:role
pub async fn change_approval(
    State(controller): Controller,
    Path((id, role)): Path<(String, String)>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    let role: ReviewerRole = role.parse().map_err(|e| ApiError::bad_request(format!("{}", e)))?;
    let status = ApprovalStatus::decode(&req.status)
        .map_err(|e| ApiError::bad_request(format!("{}", e)))?;

    controller
        .change_approval(&TeamId::new(id), role, status)
        .await?;

    Ok(board(&controller))
}

/// Advance one reviewer's approval along its cycle
///
/// POST /api/teams/:id/approvals/:role/advance
pub async fn advance_approval(
    State(controller): Controller,
    Path((id, role)): Path<(String, String)>,
) -> Result<Json<BoardResponse>, ApiError> {
    let role: ReviewerRole = role.parse().map_err(|e| ApiError::bad_request(format!("{}", e)))?;

    controller.advance_approval(&TeamId::new(id), role).await?;

    Ok(board(&controller))
}

/// Move a team within the full ordered list
///
/// POST /api/board/reorder
pub async fn reorder(
    State(controller): Controller,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    controller.reorder(req.from, req.to).await?;
    Ok(board(&controller))
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(controller): Controller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    controller.delete_team(&TeamId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several teams at once
///
/// POST /api/board/bulk-delete
pub async fn bulk_delete(
    State(controller): Controller,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    let events = match req.team_ids {
        Some(ids) => controller.bulk_delete(&ids).await?,
        None => controller.bulk_delete_selected().await?,
    };

    let deleted = events.iter().map(|e| e.team_id().clone()).collect();
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Set the search filter
///
/// PUT /api/board/search
pub async fn search(
    State(controller): Controller,
    Json(req): Json<SearchRequest>,
) -> Json<BoardResponse> {
    controller.set_search_filter(&req.query).await;
    board(&controller)
}

/// Toggle one team's selection
///
/// POST /api/teams/:id/selection
pub async fn toggle_selection(
    State(controller): Controller,
    Path(id): Path<String>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let selected = controller.toggle_selection(&TeamId::new(id)).await?;
    Ok(Json(SelectionResponse {
        selected,
        selection: controller.view().selection,
    }))
}

/// Toggle selection of every team in the current filter
///
/// POST /api/selection/all
pub async fn toggle_select_all(State(controller): Controller) -> Json<BoardResponse> {
    controller.toggle_select_all().await;
    board(&controller)
}

/// Clear the selection
///
/// DELETE /api/selection
pub async fn select_none(State(controller): Controller) -> Json<BoardResponse> {
    controller.select_none().await;
    board(&controller)
}
