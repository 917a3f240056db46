/// Project membership model
///
/// Associates users with projects, carrying the role the user plays on the
/// project plus contribution bookkeeping. The (project_id, user_id) pair is
/// the primary key, so a user holds at most one role per project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Role a user plays on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Can update and delete the project and manage its tasks
    Manager,
    Developer,
    Tester,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Manager => "manager",
            MembershipRole::Developer => "developer",
            MembershipRole::Tester => "tester",
        }
    }
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's membership in a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub project_id: Uuid,
    pub user_id: Uuid,

    /// Role on this project
    pub role: MembershipRole,

    /// Hours the user has contributed to the project
    pub contribution_hours: i32,

    /// Last time the user acted on the project
    pub last_activity: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// True when the user holds the manager role on the project
    pub async fn is_manager(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT TRUE FROM project_memberships
            WHERE project_id = $1 AND user_id = $2 AND role = 'manager'
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// Upserts a membership inside an open transaction
    ///
    /// Used when a task is created: the assignee is attached to the project
    /// with the given role, or their existing row has its role and activity
    /// timestamp refreshed. Runs in the caller's transaction so the task
    /// insert and the membership write commit or roll back together.
    pub async fn upsert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO project_memberships (project_id, user_id, role, contribution_hours, last_activity)
            VALUES ($1, $2, $3, 0, NOW())
            ON CONFLICT (project_id, user_id)
            DO UPDATE SET role = EXCLUDED.role, last_activity = NOW()
            RETURNING project_id, user_id, role, contribution_hours, last_activity, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut **tx)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(MembershipRole::Manager.as_str(), "manager");
        assert_eq!(MembershipRole::Developer.as_str(), "developer");
        assert_eq!(MembershipRole::Tester.as_str(), "tester");
    }

    #[test]
    fn test_role_serde_roundtrip() {
        let json = serde_json::to_string(&MembershipRole::Developer).unwrap();
        assert_eq!(json, r#""developer""#);

        let role: MembershipRole = serde_json::from_str(r#""manager""#).unwrap();
        assert_eq!(role, MembershipRole::Manager);
    }
}
