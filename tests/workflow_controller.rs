//! Integration tests for the team workflow controller
//!
//! These tests drive the controller against the in-memory gateway and
//! verify optimistic updates, rollbacks, ordering, selection and search.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use teamboard_api::application::{OperationKind, OperationState, TeamWorkflowController, WorkflowError};
use teamboard_api::config::{ReorderConflictPolicy, WorkflowConfig};
use teamboard_api::domain::ordering::{DragGesture, OrderPatchEntry};
use teamboard_api::domain::repositories::{GatewayError, TeamFilter};
use teamboard_api::domain::team::events::TeamEvent;
use teamboard_api::domain::team::value_objects::Email;
use teamboard_api::domain::team::{ApprovalStatus, Member, ReviewerRole, Team, TeamId};
use teamboard_api::infrastructure::repositories::{
    GatewayCall, InMemoryTeamGateway, ScriptedResponse,
};

fn team(id: &str, order: usize) -> Team {
    team_named(id, order, &format!("Team {}", id), "someone@example.com")
}

fn team_named(id: &str, order: usize, name: &str, email: &str) -> Team {
    Team::from_persistence(
        TeamId::from(id),
        name.to_string(),
        format!("{} description", name),
        "Mia".to_string(),
        "Dan".to_string(),
        ApprovalStatus::Pending,
        ApprovalStatus::Pending,
        vec![Member::new("Lin", "Engineer", Email::new(email).unwrap())],
        order,
        Utc::now(),
    )
}

async fn setup_with(
    teams: Vec<Team>,
    config: WorkflowConfig,
) -> (Arc<InMemoryTeamGateway>, Arc<TeamWorkflowController>) {
    let gateway = Arc::new(InMemoryTeamGateway::new(teams));
    let controller = Arc::new(TeamWorkflowController::new(gateway.clone(), config));
    controller
        .load(&TeamFilter::default())
        .await
        .expect("initial load");
    (gateway, controller)
}

async fn setup(teams: Vec<Team>) -> (Arc<InMemoryTeamGateway>, Arc<TeamWorkflowController>) {
    setup_with(teams, WorkflowConfig::default()).await
}

/// Gateway calls made after the initial load
async fn mutations(gateway: &InMemoryTeamGateway) -> Vec<GatewayCall> {
    gateway
        .calls()
        .await
        .into_iter()
        .filter(|call| !matches!(call, GatewayCall::ListTeams(_)))
        .collect()
}

fn visible_ids(controller: &TeamWorkflowController) -> Vec<String> {
    controller
        .view()
        .teams
        .iter()
        .map(|t| t.id().to_string())
        .collect()
}

fn approval(controller: &TeamWorkflowController, id: &str, role: ReviewerRole) -> ApprovalStatus {
    controller
        .view()
        .team(&TeamId::from(id))
        .expect("team is visible")
        .approval(role)
}

// ===== Approvals =====

#[tokio::test]
async fn change_approval_updates_one_team_and_calls_gateway_once() {
    let (gateway, controller) = setup(vec![team("1", 0), team("2", 1)]).await;

    controller
        .change_approval_encoded(&TeamId::from("1"), "manager", "1")
        .await
        .expect("approval change");

    assert_eq!(approval(&controller, "1", ReviewerRole::Manager).as_text(), "1");
    assert_eq!(approval(&controller, "2", ReviewerRole::Manager), ApprovalStatus::Pending);
    assert_eq!(
        mutations(&gateway).await,
        vec![GatewayCall::UpdateApproval {
            team_id: TeamId::from("1"),
            role: ReviewerRole::Manager,
            status: ApprovalStatus::Approved,
        }]
    );
}

#[tokio::test]
async fn failed_approval_change_is_rolled_back() {
    let (gateway, controller) = setup(vec![team("1", 0)]).await;
    controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Director, ApprovalStatus::Rejected)
        .await
        .unwrap();
    gateway
        .push_response(ScriptedResponse::fail(GatewayError::Rejected("boom".to_string())))
        .await;

    let result = controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Director, ApprovalStatus::Approved)
        .await;

    assert!(matches!(result, Err(WorkflowError::ApprovalUpdateFailed { .. })));
    assert_eq!(approval(&controller, "1", ReviewerRole::Director), ApprovalStatus::Rejected);
    assert!(matches!(
        controller.view().operation(OperationKind::ChangeApproval),
        Some(OperationState::Failed { .. })
    ));
}

#[tokio::test]
async fn timed_out_approval_change_is_rolled_back() {
    let config = WorkflowConfig {
        gateway_timeout: Duration::from_millis(20),
        ..WorkflowConfig::default()
    };
    let (gateway, controller) = setup_with(vec![team("1", 0)], config).await;
    gateway
        .push_response(ScriptedResponse::ok_after(Duration::from_millis(500)))
        .await;

    let result = controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Approved)
        .await;

    match result {
        Err(WorkflowError::ApprovalUpdateFailed { source, .. }) => {
            assert_eq!(source, GatewayError::Timeout)
        }
        other => panic!("expected timeout failure, got {:?}", other),
    }
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
}

#[tokio::test]
async fn invalid_inputs_are_rejected_before_any_change() {
    let (gateway, controller) = setup(vec![team("1", 0)]).await;

    let bad_role = controller
        .change_approval_encoded(&TeamId::from("1"), "owner", "1")
        .await;
    let bad_status = controller
        .change_approval_encoded(&TeamId::from("1"), "manager", "2")
        .await;

    assert!(matches!(bad_role, Err(WorkflowError::InvalidRole(_))));
    assert!(matches!(bad_status, Err(WorkflowError::InvalidApprovalValue(_))));
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
    assert!(mutations(&gateway).await.is_empty());
}

#[tokio::test]
async fn approval_on_unknown_team_fails() {
    let (_gateway, controller) = setup(vec![team("1", 0)]).await;

    let result = controller
        .change_approval(&TeamId::from("9"), ReviewerRole::Manager, ApprovalStatus::Approved)
        .await;

    assert_eq!(result, Err(WorkflowError::TeamNotFound(TeamId::from("9"))));
}

#[tokio::test]
async fn advance_walks_the_cycle() {
    let (_gateway, controller) = setup(vec![team("1", 0)]).await;
    let id = TeamId::from("1");

    for expected in [
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
        ApprovalStatus::Pending,
    ] {
        controller.advance_approval(&id, ReviewerRole::Manager).await.unwrap();
        assert_eq!(approval(&controller, "1", ReviewerRole::Manager), expected);
    }
}

#[tokio::test]
async fn director_can_decide_before_manager() {
    let (_gateway, controller) = setup(vec![team("1", 0)]).await;

    controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Director, ApprovalStatus::Approved)
        .await
        .unwrap();

    assert_eq!(approval(&controller, "1", ReviewerRole::Director), ApprovalStatus::Approved);
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
}

#[tokio::test]
async fn stale_failure_does_not_clobber_newer_change() {
    let (gateway, controller) = setup(vec![team("1", 0)]).await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(100),
            GatewayError::Rejected("late".to_string()),
        ))
        .await;

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Approved)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Rejected)
        .await
        .expect("newer change succeeds");

    let stale = slow.await.unwrap();
    assert!(matches!(stale, Err(WorkflowError::ApprovalUpdateFailed { .. })));
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Rejected);
}

async fn stored_approval(gateway: &InMemoryTeamGateway, id: &str, role: ReviewerRole) -> ApprovalStatus {
    gateway
        .teams()
        .await
        .iter()
        .find(|t| t.id().as_str() == id)
        .expect("team is stored")
        .approval(role)
}

/// Two overlapping changes on team 1's manager approval: Approved, then
/// Rejected, answered by `first` and `second` respectively
async fn overlapping_changes(
    first: ScriptedResponse,
    second: ScriptedResponse,
) -> (
    Arc<InMemoryTeamGateway>,
    Arc<TeamWorkflowController>,
    Result<TeamEvent, WorkflowError>,
    Result<TeamEvent, WorkflowError>,
) {
    let (gateway, controller) = setup(vec![team("1", 0)]).await;
    gateway.push_response(first).await;
    gateway.push_response(second).await;

    let earlier = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Approved)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let later = controller
        .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Rejected)
        .await;
    let earlier = earlier.await.unwrap();

    (gateway, controller, earlier, later)
}

#[tokio::test]
async fn overlapping_failures_revert_to_stored_value() {
    let (gateway, controller, earlier, later) = overlapping_changes(
        ScriptedResponse::fail_after(Duration::from_millis(30), GatewayError::Timeout),
        ScriptedResponse::fail_after(Duration::from_millis(100), GatewayError::Timeout),
    )
    .await;

    assert!(earlier.is_err());
    assert!(later.is_err());
    assert_eq!(stored_approval(&gateway, "1", ReviewerRole::Manager).await, ApprovalStatus::Pending);
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
}

#[tokio::test]
async fn overlapping_failures_resolving_newest_first_revert_to_stored_value() {
    let (gateway, controller, earlier, later) = overlapping_changes(
        ScriptedResponse::fail_after(Duration::from_millis(100), GatewayError::Timeout),
        ScriptedResponse::fail_after(Duration::from_millis(30), GatewayError::Timeout),
    )
    .await;

    assert!(earlier.is_err());
    assert!(later.is_err());
    assert_eq!(stored_approval(&gateway, "1", ReviewerRole::Manager).await, ApprovalStatus::Pending);
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
}

#[tokio::test]
async fn older_success_is_shown_when_newer_change_fails() {
    let (gateway, controller, earlier, later) = overlapping_changes(
        ScriptedResponse::ok_after(Duration::from_millis(100)),
        ScriptedResponse::fail_after(Duration::from_millis(30), GatewayError::Timeout),
    )
    .await;

    assert!(earlier.is_ok());
    assert!(later.is_err());
    assert_eq!(stored_approval(&gateway, "1", ReviewerRole::Manager).await, ApprovalStatus::Approved);
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Approved);
}

#[tokio::test]
async fn approval_failed_during_delete_is_not_restored_with_team() {
    let (gateway, controller) = setup(vec![team("1", 0), team("2", 1)]).await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(30),
            GatewayError::Timeout,
        ))
        .await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(100),
            GatewayError::Rejected("locked".to_string()),
        ))
        .await;

    let change = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .change_approval(&TeamId::from("1"), ReviewerRole::Manager, ApprovalStatus::Approved)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let deleted = controller.delete_team(&TeamId::from("1")).await;
    let changed = change.await.unwrap();

    assert!(changed.is_err());
    assert!(matches!(deleted, Err(WorkflowError::DeleteFailed { .. })));
    assert_eq!(visible_ids(&controller), vec!["1", "2"]);
    assert_eq!(stored_approval(&gateway, "1", ReviewerRole::Manager).await, ApprovalStatus::Pending);
    assert_eq!(approval(&controller, "1", ReviewerRole::Manager), ApprovalStatus::Pending);
}

#[tokio::test]
async fn approval_failed_during_bulk_delete_is_not_restored_with_team() {
    let (gateway, controller) = setup(vec![team("1", 0), team("2", 1), team("3", 2)]).await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(30),
            GatewayError::Timeout,
        ))
        .await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(100),
            GatewayError::Timeout,
        ))
        .await;

    let change = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .change_approval(&TeamId::from("3"), ReviewerRole::Director, ApprovalStatus::Rejected)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let deleted = controller
        .bulk_delete(&[TeamId::from("1"), TeamId::from("3")])
        .await;
    let changed = change.await.unwrap();

    assert!(changed.is_err());
    assert!(deleted.is_err());
    assert_eq!(visible_ids(&controller), vec!["1", "2", "3"]);
    assert_eq!(approval(&controller, "3", ReviewerRole::Director), ApprovalStatus::Pending);
}

// ===== Ordering =====

#[tokio::test]
async fn reorder_moves_team_and_persists_full_patch() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;

    let event = controller.reorder(0, 2).await.unwrap();

    assert_eq!(
        event,
        Some(TeamEvent::Reordered {
            team_id: TeamId::from("A"),
            from: 0,
            to: 2,
        })
    );
    assert_eq!(visible_ids(&controller), vec!["B", "C", "A"]);
    assert_eq!(
        mutations(&gateway).await,
        vec![GatewayCall::PersistOrder(vec![
            OrderPatchEntry { id: TeamId::from("B"), order: 0 },
            OrderPatchEntry { id: TeamId::from("C"), order: 1 },
            OrderPatchEntry { id: TeamId::from("A"), order: 2 },
        ])]
    );
}

#[tokio::test]
async fn failed_reorder_restores_previous_order() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;
    gateway
        .push_response(ScriptedResponse::fail(GatewayError::Storage("down".to_string())))
        .await;

    let result = controller.reorder(2, 0).await;

    assert!(matches!(result, Err(WorkflowError::ReorderFailed(_))));
    assert_eq!(visible_ids(&controller), vec!["A", "B", "C"]);
    let orders: Vec<usize> = controller.view().teams.iter().map(|t| t.order()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn reorder_rollback_keeps_concurrent_approval_change() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;
    gateway
        .push_response(ScriptedResponse::fail_after(
            Duration::from_millis(100),
            GatewayError::Timeout,
        ))
        .await;

    let pending_reorder = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reorder(0, 1).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    controller
        .change_approval(&TeamId::from("A"), ReviewerRole::Manager, ApprovalStatus::Approved)
        .await
        .unwrap();

    assert!(pending_reorder.await.unwrap().is_err());
    assert_eq!(visible_ids(&controller), vec!["A", "B"]);
    assert_eq!(approval(&controller, "A", ReviewerRole::Manager), ApprovalStatus::Approved);
}

#[tokio::test]
async fn out_of_range_reorder_is_rejected_without_gateway_call() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;

    let result = controller.reorder(0, 5).await;

    assert_eq!(result, Err(WorkflowError::InvalidIndex { index: 5, len: 2 }));
    assert_eq!(visible_ids(&controller), vec!["A", "B"]);
    assert!(mutations(&gateway).await.is_empty());
}

#[tokio::test]
async fn reorder_onto_same_index_persists_nothing() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;

    assert_eq!(controller.reorder(1, 1).await, Ok(None));
    assert!(mutations(&gateway).await.is_empty());
}

#[tokio::test]
async fn second_reorder_is_rejected_while_first_is_in_flight() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;
    gateway
        .push_response(ScriptedResponse::ok_after(Duration::from_millis(100)))
        .await;

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reorder(0, 2).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(controller.reorder(0, 1).await, Err(WorkflowError::ReorderInProgress));
    assert!(first.await.unwrap().is_ok());
    assert_eq!(visible_ids(&controller), vec!["B", "C", "A"]);
}

#[tokio::test]
async fn queued_reorder_runs_against_the_resolved_sequence() {
    let config = WorkflowConfig {
        reorder_conflict: ReorderConflictPolicy::Queue,
        ..WorkflowConfig::default()
    };
    let (gateway, controller) =
        setup_with(vec![team("A", 0), team("B", 1), team("C", 2)], config).await;
    gateway
        .push_response(ScriptedResponse::ok_after(Duration::from_millis(100)))
        .await;

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reorder(0, 2).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    controller.reorder(0, 1).await.expect("queued reorder");

    assert!(first.await.unwrap().is_ok());
    assert_eq!(visible_ids(&controller), vec!["C", "B", "A"]);
}

#[tokio::test]
async fn drag_gesture_triggers_exactly_one_reorder() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;

    let gesture = DragGesture::start(0).enter(1).enter(2);
    controller.finish_drag(gesture).await.unwrap();

    assert_eq!(visible_ids(&controller), vec!["B", "C", "A"]);
    assert_eq!(mutations(&gateway).await.len(), 1);
}

#[tokio::test]
async fn drag_without_target_is_a_no_op() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;

    let result = controller.finish_drag(DragGesture::start(0)).await;

    assert_eq!(result, Ok(None));
    assert!(mutations(&gateway).await.is_empty());
}

// ===== Deletion =====

#[tokio::test]
async fn delete_removes_team_and_compacts_order() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;

    controller.delete_team(&TeamId::from("B")).await.unwrap();

    assert_eq!(visible_ids(&controller), vec!["A", "C"]);
    let orders: Vec<usize> = controller.view().teams.iter().map(|t| t.order()).collect();
    assert_eq!(orders, vec![0, 1]);
    assert_eq!(gateway.teams().await.len(), 2);
}

#[tokio::test]
async fn failed_delete_restores_team_at_original_position() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1), team("C", 2)]).await;
    gateway
        .push_response(ScriptedResponse::fail(GatewayError::Timeout))
        .await;

    let result = controller.delete_team(&TeamId::from("B")).await;

    assert!(matches!(result, Err(WorkflowError::DeleteFailed { .. })));
    assert_eq!(visible_ids(&controller), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn bulk_delete_clears_selection_on_success() {
    let (gateway, controller) =
        setup(vec![team("A", 0), team("B", 1), team("C", 2), team("D", 3)]).await;
    controller.toggle_selection(&TeamId::from("A")).await.unwrap();
    controller.toggle_selection(&TeamId::from("C")).await.unwrap();

    let events = controller.bulk_delete_selected().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(visible_ids(&controller), vec!["B", "D"]);
    assert!(controller.view().selection.is_empty());
    assert_eq!(
        mutations(&gateway).await,
        vec![GatewayCall::BulkDeleteTeams(vec![TeamId::from("A"), TeamId::from("C")])]
    );
}

#[tokio::test]
async fn failed_bulk_delete_restores_all_positions_and_keeps_selection() {
    let (gateway, controller) =
        setup(vec![team("A", 0), team("B", 1), team("C", 2), team("D", 3)]).await;
    controller.toggle_selection(&TeamId::from("B")).await.unwrap();
    controller.toggle_selection(&TeamId::from("D")).await.unwrap();
    gateway
        .push_response(ScriptedResponse::fail(GatewayError::Rejected("nope".to_string())))
        .await;

    let result = controller.bulk_delete_selected().await;

    match result {
        Err(WorkflowError::DeleteFailed { team_ids, .. }) => {
            assert_eq!(team_ids, vec![TeamId::from("B"), TeamId::from("D")])
        }
        other => panic!("expected DeleteFailed, got {:?}", other),
    }
    assert_eq!(visible_ids(&controller), vec!["A", "B", "C", "D"]);
    assert_eq!(controller.view().selection.len(), 2);
}

#[tokio::test]
async fn bulk_delete_with_unknown_id_changes_nothing() {
    let (gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;

    let result = controller
        .bulk_delete(&[TeamId::from("A"), TeamId::from("Z")])
        .await;

    assert_eq!(result, Err(WorkflowError::TeamNotFound(TeamId::from("Z"))));
    assert_eq!(visible_ids(&controller), vec!["A", "B"]);
    assert!(mutations(&gateway).await.is_empty());
}

// ===== Search & selection =====

#[tokio::test]
async fn search_by_member_email_surfaces_parent_team() {
    let (_gateway, controller) = setup(vec![
        team_named("1", 0, "Payments", "lin@pay.example"),
        team_named("2", 1, "Search", "kai@find.example"),
    ])
    .await;

    controller.set_search_filter("kai@find").await;

    assert_eq!(visible_ids(&controller), vec!["2"]);
    assert_eq!(controller.view().total, 2);
}

#[tokio::test]
async fn member_search_can_be_disabled() {
    let config = WorkflowConfig {
        member_search: false,
        ..WorkflowConfig::default()
    };
    let (_gateway, controller) =
        setup_with(vec![team_named("1", 0, "Payments", "lin@pay.example")], config).await;

    controller.set_search_filter("lin@pay").await;

    assert!(visible_ids(&controller).is_empty());
}

#[tokio::test]
async fn select_all_under_filter_only_touches_matching_teams() {
    let (_gateway, controller) = setup(vec![
        team_named("1", 0, "Payments", "a@example.com"),
        team_named("2", 1, "Payroll", "b@example.com"),
        team_named("3", 2, "Search", "c@example.com"),
    ])
    .await;
    controller.toggle_selection(&TeamId::from("3")).await.unwrap();

    controller.set_search_filter("pay").await;
    controller.toggle_select_all().await;

    let selection = controller.view().selection;
    assert_eq!(
        selection,
        vec![TeamId::from("1"), TeamId::from("2"), TeamId::from("3")]
    );

    controller.toggle_select_all().await;
    assert_eq!(controller.view().selection, vec![TeamId::from("3")]);
}

#[tokio::test]
async fn selection_survives_filter_changes_until_select_none() {
    let (_gateway, controller) = setup(vec![
        team_named("1", 0, "Payments", "a@example.com"),
        team_named("2", 1, "Search", "b@example.com"),
    ])
    .await;
    controller.toggle_selection(&TeamId::from("1")).await.unwrap();

    controller.set_search_filter("search").await;
    let view = controller.view();
    assert!(view.team(&TeamId::from("1")).is_none());
    assert!(view.is_selected(&TeamId::from("1")));

    controller.set_search_filter("").await;
    assert!(controller.view().is_selected(&TeamId::from("1")));

    controller.select_none().await;
    assert!(controller.view().selection.is_empty());
}

#[tokio::test]
async fn toggling_unknown_team_fails() {
    let (_gateway, controller) = setup(vec![team("1", 0)]).await;

    let result = controller.toggle_selection(&TeamId::from("x")).await;

    assert_eq!(result, Err(WorkflowError::TeamNotFound(TeamId::from("x"))));
}

// ===== Loading & view =====

#[tokio::test]
async fn load_sorts_by_stored_rank() {
    let (_gateway, controller) = setup(vec![team("C", 2), team("A", 0), team("B", 1)]).await;

    assert_eq!(visible_ids(&controller), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn failed_load_is_reported() {
    let gateway = Arc::new(InMemoryTeamGateway::new(vec![team("A", 0)]));
    gateway
        .push_response(ScriptedResponse::fail(GatewayError::Timeout))
        .await;
    let controller = TeamWorkflowController::new(gateway, WorkflowConfig::default());

    let result = controller.load(&TeamFilter::default()).await;

    assert_eq!(result, Err(WorkflowError::LoadFailed(GatewayError::Timeout)));
    assert!(controller.view().teams.is_empty());
}

#[tokio::test]
async fn subscribers_see_published_changes() {
    let (_gateway, controller) = setup(vec![team("A", 0), team("B", 1)]).await;
    let mut receiver = controller.subscribe();

    controller.reorder(1, 0).await.unwrap();

    assert!(receiver.has_changed().unwrap());
    let view = receiver.borrow_and_update().clone();
    let ids: Vec<&str> = view.teams.iter().map(|t| t.id().as_str()).collect();
    assert_eq!(ids, vec!["B", "A"]);
    assert_eq!(
        view.operation(OperationKind::Reorder),
        Some(&OperationState::Succeeded)
    );
}
