use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::ordering::OrderPatchEntry;
use crate::domain::repositories::{GatewayError, TeamFilter, TeamGateway};
use crate::domain::team::value_objects::Email;
use crate::domain::team::{ApprovalStatus, Member, ReviewerRole, Team, TeamId};

/// PostgreSQL implementation of TeamGateway
///
/// Scoped to a single organization. Approvals are stored as their numeric
/// wire code in `smallint` columns and decoded on the way out.
pub struct PostgresTeamGateway {
    pool: PgPool,
    organization_id: Uuid,
}

impl PostgresTeamGateway {
    /// Creates a new PostgresTeamGateway
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    /// * `organization_id` - Organization whose teams this gateway serves
    pub fn new(pool: PgPool, organization_id: Uuid) -> Self {
        Self {
            pool,
            organization_id,
        }
    }
}

fn storage(context: &str) -> impl Fn(sqlx::Error) -> GatewayError + '_ {
    move |e| GatewayError::Storage(format!("{}: {}", context, e))
}

/// Escapes `ILIKE` metacharacters so the query matches as a plain substring
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn decode_approval(code: i16) -> Result<ApprovalStatus, GatewayError> {
    ApprovalStatus::from_code(i64::from(code)).map_err(|e| GatewayError::Storage(e.to_string()))
}

fn member_from_row(row: &PgRow) -> Result<(String, Member), GatewayError> {
    let read = storage("Failed to read member row");
    let team_id: String = row.try_get("team_id").map_err(&read)?;
    let email: String = row.try_get("email").map_err(&read)?;

    let member = Member {
        id: row.try_get("id").map_err(&read)?,
        name: row.try_get("name").map_err(&read)?,
        position: row.try_get("position").map_err(&read)?,
        email: Email::new(email)
            .map_err(|e| GatewayError::Storage(format!("Invalid email from database: {}", e)))?,
    };

    Ok((team_id, member))
}

fn team_from_row(row: &PgRow, members: Vec<Member>) -> Result<Team, GatewayError> {
    let read = storage("Failed to read team row");
    let sort_order: i32 = row.try_get("sort_order").map_err(&read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(&read)?;
    let order = usize::try_from(sort_order)
        .map_err(|_| GatewayError::Storage(format!("Negative sort order: {}", sort_order)))?;

    Ok(Team::from_persistence(
        TeamId::new(row.try_get::<String, _>("id").map_err(&read)?),
        row.try_get("name").map_err(&read)?,
        row.try_get("description").map_err(&read)?,
        row.try_get("manager_name").map_err(&read)?,
        row.try_get("director_name").map_err(&read)?,
        decode_approval(row.try_get("manager_approval").map_err(&read)?)?,
        decode_approval(row.try_get("director_approval").map_err(&read)?)?,
        members,
        order,
        created_at,
    ))
}

#[async_trait]
impl TeamGateway for PostgresTeamGateway {
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>, GatewayError> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query(
            r#"
            SELECT
                id, name, description, manager_name, director_name,
                manager_approval, director_approval, sort_order, created_at
            FROM teams
            WHERE organization_id = $1
              AND (
                $2::text IS NULL
                OR name ILIKE $2 ESCAPE '\'
                OR description ILIKE $2 ESCAPE '\'
                OR manager_name ILIKE $2 ESCAPE '\'
                OR director_name ILIKE $2 ESCAPE '\'
                OR EXISTS (
                    SELECT 1 FROM team_members m
                    WHERE m.team_id = teams.id
                      AND (
                          m.name ILIKE $2 ESCAPE '\'
                          OR m.position ILIKE $2 ESCAPE '\'
                          OR m.email ILIKE $2 ESCAPE '\'
                      )
                )
              )
            ORDER BY sort_order
            "#,
        )
        .bind(self.organization_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("Failed to list teams"))?;

        let ids: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(storage("Failed to read team id"))?;

        let member_rows = sqlx::query(
            r#"
            SELECT id, team_id, name, position, email
            FROM team_members
            WHERE team_id = ANY($1)
            ORDER BY team_id, roster_index
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("Failed to list team members"))?;

        let mut rosters: HashMap<String, Vec<Member>> = HashMap::new();
        for row in &member_rows {
            let (team_id, member) = member_from_row(row)?;
            rosters.entry(team_id).or_default().push(member);
        }

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(storage("Failed to read team id"))?;
                let members = rosters.remove(&id).ok_or_else(|| {
                    tracing::warn!(team_id = %id, "Team stored without members");
                    GatewayError::Storage(format!("Team {} has no members", id))
                })?;
                team_from_row(row, members)
            })
            .collect()
    }

    async fn update_approval(
        &self,
        team_id: &TeamId,
        role: ReviewerRole,
        status: ApprovalStatus,
    ) -> Result<(), GatewayError> {
        let statement = match role {
            ReviewerRole::Manager => {
                "UPDATE teams SET manager_approval = $1 WHERE id = $2 AND organization_id = $3"
            }
            ReviewerRole::Director => {
                "UPDATE teams SET director_approval = $1 WHERE id = $2 AND organization_id = $3"
            }
        };

        let result = sqlx::query(statement)
            .bind(i16::from(status.code()))
            .bind(team_id.as_str())
            .bind(self.organization_id)
            .execute(&self.pool)
            .await
            .map_err(storage("Failed to update approval"))?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(team_id.clone()));
        }

        Ok(())
    }

    async fn persist_order(&self, patch: &[OrderPatchEntry]) -> Result<(), GatewayError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("Failed to begin transaction"))?;

        for entry in patch {
            let order = i32::try_from(entry.order)
                .map_err(|_| GatewayError::Rejected(format!("Order out of range: {}", entry.order)))?;

            let result = sqlx::query(
                "UPDATE teams SET sort_order = $1 WHERE id = $2 AND organization_id = $3",
            )
            .bind(order)
            .bind(entry.id.as_str())
            .bind(self.organization_id)
            .execute(&mut *tx)
            .await
            .map_err(storage("Failed to update sort order"))?;

            // Dropping the transaction rolls back the rows already written
            if result.rows_affected() == 0 {
                return Err(GatewayError::NotFound(entry.id.clone()));
            }
        }

        tx.commit()
            .await
            .map_err(storage("Failed to commit order"))?;

        Ok(())
    }

    async fn delete_team(&self, team_id: &TeamId) -> Result<(), GatewayError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1 AND organization_id = $2")
            .bind(team_id.as_str())
            .bind(self.organization_id)
            .execute(&self.pool)
            .await
            .map_err(storage("Failed to delete team"))?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(team_id.clone()));
        }

        Ok(())
    }

    async fn bulk_delete_teams(&self, team_ids: &[TeamId]) -> Result<(), GatewayError> {
        let ids: Vec<String> = team_ids.iter().map(|id| id.as_str().to_string()).collect();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("Failed to begin transaction"))?;

        let result = sqlx::query("DELETE FROM teams WHERE organization_id = $1 AND id = ANY($2)")
            .bind(self.organization_id)
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(storage("Failed to delete teams"))?;

        if result.rows_affected() != ids.len() as u64 {
            return Err(GatewayError::Rejected(format!(
                "Expected to delete {} teams, matched {}",
                ids.len(),
                result.rows_affected()
            )));
        }

        tx.commit()
            .await
            .map_err(storage("Failed to commit bulk delete"))?;

        Ok(())
    }
}
