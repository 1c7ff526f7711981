use std::collections::HashMap;

use crate::domain::team::{ApprovalStatus, ReviewerRole, TeamId};

/// Entity an approval request writes to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApprovalKey {
    pub team_id: TeamId,
    pub role: ReviewerRole,
}

#[derive(Debug, Clone, Copy)]
struct KeyState {
    latest: u64,
    latest_settled: bool,
    /// Last value the gateway acknowledged (or loaded)
    confirmed: ApprovalStatus,
    confirmed_token: u64,
}

/// Monotonic request tokens per entity, plus the last confirmed value
///
/// While the latest request for a key is unresolved, earlier responses
/// never touch the board. Once it resolves, the board shows whatever the
/// gateway last acknowledged for that key.
#[derive(Debug, Default)]
pub struct RequestTokens {
    next: u64,
    keys: HashMap<ApprovalKey, KeyState>,
}

impl RequestTokens {
    /// Issues a token for a new request
    ///
    /// `current` is the value shown before the optimistic change. It seeds
    /// the confirmed value when the key has no history yet.
    pub fn issue(&mut self, key: ApprovalKey, current: ApprovalStatus) -> u64 {
        self.next += 1;
        let token = self.next;
        let state = self.keys.entry(key).or_insert(KeyState {
            latest: token,
            latest_settled: false,
            confirmed: current,
            confirmed_token: 0,
        });
        state.latest = token;
        state.latest_settled = false;
        token
    }

    /// Records an acknowledged write; returns the value the board should
    /// now show, or `None` while a newer request is unresolved.
    pub fn succeed(
        &mut self,
        key: &ApprovalKey,
        token: u64,
        status: ApprovalStatus,
    ) -> Option<ApprovalStatus> {
        let state = self.keys.get_mut(key)?;
        if token > state.confirmed_token {
            state.confirmed = status;
            state.confirmed_token = token;
        }
        Self::settle(state, token)
    }

    /// Records a failed write; returns the value the board should now
    /// show, or `None` while a newer request is unresolved.
    pub fn fail(&mut self, key: &ApprovalKey, token: u64) -> Option<ApprovalStatus> {
        let state = self.keys.get_mut(key)?;
        Self::settle(state, token)
    }

    fn settle(state: &mut KeyState, token: u64) -> Option<ApprovalStatus> {
        if token == state.latest {
            state.latest_settled = true;
        }
        state.latest_settled.then_some(state.confirmed)
    }

    /// Confirmed value for a key with no unresolved latest request
    pub fn settled(&self, key: &ApprovalKey) -> Option<ApprovalStatus> {
        self.keys
            .get(key)
            .filter(|state| state.latest_settled)
            .map(|state| state.confirmed)
    }

    /// Replaces the confirmed value with one freshly read from the gateway
    pub fn rebase(&mut self, key: &ApprovalKey, status: ApprovalStatus) {
        if let Some(state) = self.keys.get_mut(key) {
            state.confirmed = status;
        }
    }

    /// Drops bookkeeping for teams that fail `keep`
    pub fn retain_teams<F>(&mut self, keep: F)
    where
        F: Fn(&TeamId) -> bool,
    {
        self.keys.retain(|key, _| keep(&key.team_id));
    }

    /// Drops bookkeeping for a team that is gone
    pub fn forget_team(&mut self, team_id: &TeamId) {
        self.retain_teams(|id| id != team_id);
    }
}
