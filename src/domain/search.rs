use super::team::Team;

/// Case-insensitive substring filter over the team list
///
/// A team is visible when any of its own display fields contains the
/// query, or, with member search enabled, when any member's name, position
/// or email does. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    query: String,
    needle: String,
    include_members: bool,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>, include_members: bool) -> Self {
        let query = query.into();
        let needle = query.trim().to_lowercase();
        Self {
            query,
            needle,
            include_members,
        }
    }

    /// The query as the user typed it
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, team: &Team) -> bool {
        if self.is_empty() {
            return true;
        }

        let needle = self.needle.as_str();
        let own = [
            team.name(),
            team.description(),
            team.manager_name(),
            team.director_name(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle));

        own || (self.include_members && team.members().iter().any(|m| m.matches(needle)))
    }
}
