/// Task model and database operations
///
/// Tasks belong to a project and are assigned to a user. They carry a
/// priority, a two-state status workflow (in-progress -> done), an optional
/// due date, and the same soft-delete scheme as users and projects.
///
/// Creating a task also attaches the assignee to the target project; the
/// two writes run in one transaction so a failed membership upsert rolls
/// the task insert back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::{Membership, MembershipRole};

const TASK_COLUMNS: &str = "id, title, description, priority, status, assign_to_user, \
     assign_to_project, due_date, notes, created_at, updated_at, deleted_at";

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Middle,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Middle => "middle",
            TaskPriority::High => "high",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task lifecycle status
///
/// Every task starts in-progress and moves to done exactly once, when the
/// assignee delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sqlx(rename = "done")]
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Task title, at most 100 characters
    pub title: String,

    /// Task description
    pub description: String,

    pub priority: TaskPriority,

    /// Current workflow status
    pub status: TaskStatus,

    /// User the task is assigned to
    pub assign_to_user: Uuid,

    /// Project the task belongs to
    pub assign_to_project: Uuid,

    /// When the task is due
    ///
    /// Overwritten with the delivery time when the task is delivered.
    pub due_date: DateTime<Utc>,

    /// Free-form notes
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker (None = live)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assign_to_user: Uuid,
    pub assign_to_project: Uuid,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial update for a task
///
/// Fields set to None are left untouched. Blank strings count as omitted.
/// Status is not patchable; it only changes through delivery.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Drops string fields whose value is blank (empty or whitespace-only)
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.filter(|v| !v.trim().is_empty()),
            description: self.description.filter(|v| !v.trim().is_empty()),
            priority: self.priority,
            due_date: self.due_date,
        }
    }

    /// True when no field remains to apply
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Conjunctive filter for listing tasks
///
/// Each present field narrows the result set. All fields arrive as raw
/// strings so a blank value can be ignored and an unknown one matches
/// nothing instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
}

impl TaskFilter {
    /// Drops blank string filters
    pub fn normalized(self) -> Self {
        Self {
            status: self.status.filter(|v| !v.trim().is_empty()),
            priority: self.priority.filter(|v| !v.trim().is_empty()),
            project_id: self.project_id.filter(|v| !v.trim().is_empty()),
            user_id: self.user_id.filter(|v| !v.trim().is_empty()),
        }
    }
}

impl Task {
    /// Creates a task and attaches the assignee to the project
    ///
    /// Both writes happen in one transaction: the task insert and the
    /// membership upsert (with the given role) commit together or not at
    /// all.
    pub async fn create_with_membership(
        pool: &PgPool,
        data: CreateTask,
        role: MembershipRole,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks
                (title, description, priority, assign_to_user, assign_to_project, due_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.assign_to_user)
        .bind(data.assign_to_project)
        .bind(data.due_date)
        .bind(data.notes)
        .fetch_one(&mut *tx)
        .await?;

        Membership::upsert_in_tx(&mut tx, task.assign_to_project, task.assign_to_user, role)
            .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a live task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a soft-deleted task by ID
    ///
    /// Only matches trashed rows; a live task returns None.
    pub async fn find_trashed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NOT NULL",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists live tasks matching the filter, newest first
    pub async fn list(pool: &PgPool, filter: TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query =
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE deleted_at IS NULL");
        let mut bind_count = 0;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status::text = ${bind_count}"));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority::text = ${bind_count}"));
        }
        if filter.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assign_to_project::text = ${bind_count}"));
        }
        if filter.user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assign_to_user::text = ${bind_count}"));
        }

        query.push_str(" ORDER BY created_at DESC, id");

        let mut q = sqlx::query_as::<_, Task>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(project_id) = filter.project_id {
            q = q.bind(project_id);
        }
        if let Some(user_id) = filter.user_id {
            q = q.bind(user_id);
        }

        q.fetch_all(pool).await
    }

    /// Lists live tasks of a project, newest first
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE assign_to_project = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id",
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Returns the most recently created live task of a project
    ///
    /// Ties on created_at break on id so the result is deterministic.
    pub async fn latest_in_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE assign_to_project = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        ))
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Returns the oldest live task of a project
    pub async fn oldest_in_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE assign_to_project = $1 AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
        ))
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Returns the most recent high-priority live task of a project
    pub async fn latest_high_priority_in_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE assign_to_project = $1 AND priority = 'high' AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        ))
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Applies a normalized patch to a live task
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                due_date = COALESCE($5, due_date),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.priority)
        .bind(patch.due_date)
        .fetch_optional(pool)
        .await
    }

    /// Marks the task delivered
    ///
    /// Sets status to done and stamps due_date with the delivery time. The
    /// status guard in the WHERE clause makes delivery idempotent-safe: a
    /// task that already left in-progress matches no rows and returns None,
    /// even under concurrent delivery attempts.
    pub async fn deliver(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = 'done', due_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'in-progress' AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes a task
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Restores a soft-deleted task
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
