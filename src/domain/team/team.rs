use super::errors::TeamError;
use super::events::TeamEvent;
use super::member::Member;
use super::value_objects::{ApprovalStatus, ReviewerRole, TeamId};
use chrono::{DateTime, Utc};

/// Team aggregate root
///
/// A team under review by a manager and a director, rendered at a fixed
/// position in its organization's list.
///
/// # Invariants
/// - Name cannot be empty
/// - At least one member at all times
/// - Both approvals start out Pending and move independently
/// - `order` is only changed by the ordering service
///
/// # Example
/// ```
/// use teamboard_api::domain::team::{Member, Team};
/// use teamboard_api::domain::team::value_objects::{ApprovalStatus, Email, ReviewerRole};
///
/// let lead = Member::new("Ada", "Lead", Email::new("ada@example.com").unwrap());
/// let (team, events) = Team::new(
///     "Platform".to_string(),
///     "Core services".to_string(),
///     "Mia".to_string(),
///     "Dan".to_string(),
///     vec![lead],
/// ).expect("valid team");
///
/// assert_eq!(team.approval(ReviewerRole::Manager), ApprovalStatus::Pending);
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: TeamId,
    name: String,
    description: String,
    manager_name: String,
    director_name: String,
    manager_approval: ApprovalStatus,
    director_approval: ApprovalStatus,
    members: Vec<Member>,
    order: usize,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Returns
    /// * `Ok((Team, Vec<TeamEvent>))` - New team and events generated
    /// * `Err(TeamError)` - If the name is empty or there are no members
    pub fn new(
        name: String,
        description: String,
        manager_name: String,
        director_name: String,
        members: Vec<Member>,
    ) -> Result<(Self, Vec<TeamEvent>), TeamError> {
        if name.trim().is_empty() {
            return Err(TeamError::EmptyName);
        }

        if members.is_empty() {
            return Err(TeamError::NoMembers);
        }

        let team = Self {
            id: TeamId::generate(),
            name,
            description,
            manager_name,
            director_name,
            manager_approval: ApprovalStatus::Pending,
            director_approval: ApprovalStatus::Pending,
            members,
            order: 0,
            created_at: Utc::now(),
        };

        let events = vec![TeamEvent::Created {
            team_id: team.id.clone(),
            name: team.name.clone(),
            created_at: team.created_at,
        }];

        Ok((team, events))
    }

    /// Sets the approval owned by `role`
    ///
    /// Any value may follow any other; the two roles never gate each other.
    pub fn set_approval(&mut self, role: ReviewerRole, status: ApprovalStatus) -> TeamEvent {
        let slot = match role {
            ReviewerRole::Manager => &mut self.manager_approval,
            ReviewerRole::Director => &mut self.director_approval,
        };
        let from = *slot;
        *slot = from.set(status);

        TeamEvent::ApprovalChanged {
            team_id: self.id.clone(),
            role,
            from,
            to: status,
        }
    }

    /// Appends a member to the roster
    pub fn add_member(&mut self, member: Member) -> TeamEvent {
        let member_id = member.id.clone();
        self.members.push(member);

        TeamEvent::MemberAdded {
            team_id: self.id.clone(),
            member_id,
        }
    }

    /// Removes a member from the roster
    ///
    /// # Business Rules
    /// - Removing the last member is rejected and the roster is left as is
    pub fn remove_member(&mut self, member_id: &str) -> Result<TeamEvent, TeamError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or_else(|| TeamError::MemberNotFound(member_id.to_string()))?;

        if self.members.len() == 1 {
            return Err(TeamError::LastMember(self.id.clone()));
        }

        self.members.remove(index);

        Ok(TeamEvent::MemberRemoved {
            team_id: self.id.clone(),
            member_id: member_id.to_string(),
        })
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    // ===== Getters =====

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn manager_name(&self) -> &str {
        &self.manager_name
    }

    pub fn director_name(&self) -> &str {
        &self.director_name
    }

    /// Returns the approval owned by `role`
    pub fn approval(&self, role: ReviewerRole) -> ApprovalStatus {
        match role {
            ReviewerRole::Manager => self.manager_approval,
            ReviewerRole::Director => self.director_approval,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns the team's rank in its organization's list
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses business rule validation since the data was validated on
    /// the way in. Only to be used by gateway implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: TeamId,
        name: String,
        description: String,
        manager_name: String,
        director_name: String,
        manager_approval: ApprovalStatus,
        director_approval: ApprovalStatus,
        members: Vec<Member>,
        order: usize,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            manager_name,
            director_name,
            manager_approval,
            director_approval,
            members,
            order,
            created_at,
        }
    }
}
