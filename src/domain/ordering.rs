//! Linear ordering of an organization's teams.
//!
//! The service owns the in-memory sequence and keeps every team's `order`
//! equal to its index, so loaded ranks are always a permutation of `0..N`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::team::{Team, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("Index {index} out of range for {len} teams")]
    InvalidIndex { index: usize, len: usize },
}

/// One row of a reorder patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatchEntry {
    pub id: TeamId,
    pub order: usize,
}

/// A resolved move between two list positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

/// Drag gesture state, passed around by value
///
/// Drag-start fixes the source row, every drag-enter overwrites the
/// candidate target, and drag-end resolves to at most one move.
///
/// # Example
/// ```
/// use teamboard_api::domain::ordering::{DragGesture, MoveRequest};
///
/// let gesture = DragGesture::start(0).enter(1).enter(2);
/// assert_eq!(gesture.finish(), Some(MoveRequest { from: 0, to: 2 }));
/// assert_eq!(DragGesture::start(3).finish(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragGesture {
    source: Option<usize>,
    target: Option<usize>,
}

impl DragGesture {
    pub fn start(source: usize) -> Self {
        Self {
            source: Some(source),
            target: None,
        }
    }

    /// Records the row currently under the pointer; last one wins
    pub fn enter(self, index: usize) -> Self {
        Self {
            target: Some(index),
            ..self
        }
    }

    pub fn source(&self) -> Option<usize> {
        self.source
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Resolves the gesture; `None` when it never had a source or target
    pub fn finish(self) -> Option<MoveRequest> {
        Some(MoveRequest {
            from: self.source?,
            to: self.target?,
        })
    }
}

/// Holds the ordered team sequence and computes reorder results
#[derive(Debug, Clone, Default)]
pub struct TeamOrderingService {
    teams: Vec<Team>,
}

impl TeamOrderingService {
    /// Builds the sequence from loaded teams, sorted by their stored rank
    /// and compacted to `0..N`.
    pub fn new(mut teams: Vec<Team>) -> Self {
        teams.sort_by_key(|t| t.order());
        let mut service = Self { teams };
        service.renumber();
        service
    }

    /// Removes the element at `from` and reinserts it at `to`
    ///
    /// Only the elements between the two positions shift; ranks on the
    /// returned sequence match their new indices. The input is never
    /// touched, so an out-of-range request leaves it as it was.
    pub fn move_item(sequence: &[Team], from: usize, to: usize) -> Result<Vec<Team>, OrderingError> {
        let len = sequence.len();
        for index in [from, to] {
            if index >= len {
                return Err(OrderingError::InvalidIndex { index, len });
            }
        }

        let mut moved = sequence.to_vec();
        let team = moved.remove(from);
        moved.insert(to, team);

        let (low, high) = (from.min(to), from.max(to));
        for (index, team) in moved.iter_mut().enumerate().take(high + 1).skip(low) {
            team.set_order(index);
        }

        Ok(moved)
    }

    /// Full `(id, order)` list for the sequence; always the whole list so a
    /// persisted order is either entirely new or entirely old.
    pub fn to_order_patch(sequence: &[Team]) -> Vec<OrderPatchEntry> {
        sequence
            .iter()
            .map(|team| OrderPatchEntry {
                id: team.id().clone(),
                order: team.order(),
            })
            .collect()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: &TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id() == id)
    }

    pub fn position(&self, id: &TeamId) -> Option<usize> {
        self.teams.iter().position(|t| t.id() == id)
    }

    /// Replaces the sequence with one produced by [`Self::move_item`]
    pub fn replace(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        self.renumber();
    }

    /// Current ids in list order, used to restore a sequence later
    pub fn id_order(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id().clone()).collect()
    }

    /// Puts the teams back into the order recorded by [`Self::id_order`]
    ///
    /// Only positions are restored, team contents stay as they are now.
    /// Teams missing from `ids` keep their relative order at the end.
    pub fn restore_id_order(&mut self, ids: &[TeamId]) {
        self.teams.sort_by_key(|team| {
            ids.iter()
                .position(|id| id == team.id())
                .unwrap_or(usize::MAX)
        });
        self.renumber();
    }

    /// Removes every team in `ids`, returning them with their original
    /// positions, lowest first.
    pub fn remove(&mut self, ids: &HashSet<TeamId>) -> Vec<(usize, Team)> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.teams.len());

        for (index, team) in std::mem::take(&mut self.teams).into_iter().enumerate() {
            if ids.contains(team.id()) {
                removed.push((index, team));
            } else {
                kept.push(team);
            }
        }

        self.teams = kept;
        self.renumber();
        removed
    }

    /// Undoes [`Self::remove`], putting each team back at its original index
    pub fn reinsert(&mut self, mut removed: Vec<(usize, Team)>) {
        removed.sort_by_key(|(index, _)| *index);
        for (index, team) in removed {
            let at = index.min(self.teams.len());
            self.teams.insert(at, team);
        }
        self.renumber();
    }

    fn renumber(&mut self) {
        for (index, team) in self.teams.iter_mut().enumerate() {
            team.set_order(index);
        }
    }
}
