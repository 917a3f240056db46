/// Project model and database operations
///
/// Projects own tasks and members. Like users and tasks they are
/// soft-deleted: delete stamps `deleted_at`, restore clears it, and the
/// live queries filter on `deleted_at IS NULL`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at, deleted_at";

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker (None = live)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
}

/// Partial update for a project
///
/// Fields set to None are left untouched. Blank strings count as omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    /// Drops fields whose value is blank (empty or whitespace-only)
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.filter(|v| !v.trim().is_empty()),
            description: self.description.filter(|v| !v.trim().is_empty()),
        }
    }

    /// True when no field remains to apply
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description)
            VALUES ($1, $2)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Finds a live project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a soft-deleted project by ID
    ///
    /// Only matches trashed rows; a live project returns None. This is the
    /// lookup the restore flow uses.
    pub async fn find_trashed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NOT NULL",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all live projects, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id",
        ))
        .fetch_all(pool)
        .await
    }

    /// Applies a normalized patch to a live project
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes a project
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Restores a soft-deleted project
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_normalized() {
        let patch = ProjectPatch {
            name: Some("".to_string()),
            description: Some("Updated description".to_string()),
        };
        let normalized = patch.normalized();
        assert!(normalized.name.is_none());
        assert_eq!(
            normalized.description.as_deref(),
            Some("Updated description")
        );
        assert!(!normalized.is_empty());
    }

    #[test]
    fn test_patch_all_blank_is_empty() {
        let patch = ProjectPatch {
            name: Some("  ".to_string()),
            description: Some("\t".to_string()),
        };
        assert!(patch.normalized().is_empty());
    }
}
