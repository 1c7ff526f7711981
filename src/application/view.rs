use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::team::{Team, TeamId};

/// Operations tracked in the board's in-flight/error state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    LoadTeams,
    ChangeApproval,
    Reorder,
    Delete,
    BulkDelete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationState {
    InFlight,
    Succeeded,
    Failed { message: String },
}

/// Read-only snapshot published to the UI after every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardView {
    /// Teams passing the current filter, in list order
    pub teams: Vec<Team>,
    /// Every selected id, including ones hidden by the filter
    pub selection: Vec<TeamId>,
    pub search: String,
    /// Total number of loaded teams, filtered or not
    pub total: usize,
    pub operations: BTreeMap<OperationKind, OperationState>,
}

impl BoardView {
    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id() == id)
    }

    pub fn is_selected(&self, id: &TeamId) -> bool {
        self.selection.contains(id)
    }

    pub fn operation(&self, kind: OperationKind) -> Option<&OperationState> {
        self.operations.get(&kind)
    }
}
