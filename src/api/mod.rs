// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::application::TeamWorkflowController;
use handlers::{health, teams};

/// Builds the router exposing the workflow controller
pub fn router(controller: Arc<TeamWorkflowController>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Board
        .route("/api/board", get(teams::get_board))
        .route("/api/board/reload", post(teams::reload_board))
        .route("/api/board/reorder", post(teams::reorder))
        .route("/api/board/search", put(teams::search))
        .route("/api/board/bulk-delete", post(teams::bulk_delete))
        // Single team
        .route("/api/teams/:id", delete(teams::delete_team))
        .route("/api/teams/:id/approvals/:role", put(teams::change_approval))
        .route(
            "/api/teams/:id/approvals/:role/advance",
            post(teams::advance_approval),
        )
        .route("/api/teams/:id/selection", post(teams::toggle_selection))
        // Selection
        .route("/api/selection", delete(teams::select_none))
        .route("/api/selection/all", post(teams::toggle_select_all))
        .with_state(controller)
}
