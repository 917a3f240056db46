/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks` - List tasks with optional filters (public)
/// - `GET /v1/tasks/:id` - Show a task (public)
/// - `POST /v1/tasks` - Create a task (admin or project manager)
/// - `PUT /v1/tasks/:id` - Update a task (admin or project manager)
/// - `DELETE /v1/tasks/:id` - Soft-delete a task (admin)
/// - `POST /v1/tasks/:id/restore` - Restore a deleted task (admin)
/// - `POST /v1/tasks/:id/delivery` - Deliver a task (assignee)
///
/// Due dates arrive as `d-m-Y H:i` strings (e.g. "31-12-2026 17:30") and
/// are interpreted as UTC. Delivery flips the status to done and stamps
/// due_date with the delivery time.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, validate_request},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        membership::{Membership, MembershipRole},
        project::Project,
        task::{CreateTask, Task, TaskFilter, TaskPatch, TaskPriority, TaskStatus},
        user::User,
    },
};
use uuid::Uuid;

const DELETE_PERMISSION_DENIED: &str = "Can't access delete permission";

/// Task payload shape shared by every endpoint that returns tasks
///
/// The "related to" key names come from the clients and are kept as is.
#[derive(Debug, Serialize)]
pub struct TaskResource {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(rename = "related to user")]
    pub related_to_user: Uuid,
    #[serde(rename = "related to project")]
    pub related_to_project: Uuid,
    pub notes: Option<String>,
}

impl From<Task> for TaskResource {
    fn from(task: Task) -> Self {
        Self {
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            related_to_user: task.assign_to_user,
            related_to_project: task.assign_to_project,
            notes: task.notes,
        }
    }
}

/// Create task request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 100, message = "Title must be at most 100 characters"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub priority: TaskPriority,

    /// Assignee (must be a live, non-admin user)
    pub assign_to_user: Uuid,

    /// Target project
    pub assign_to_project: Uuid,

    /// Due date in `d-m-Y H:i` format
    pub due_date: String,

    pub notes: Option<String>,

    /// Role the assignee gets on the project
    pub role: MembershipRole,
}

/// Update task request
///
/// Priority is always required; the other fields are optional and blank
/// strings count as omitted.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
}

/// Parses a `d-m-Y H:i` due date string as UTC
pub(crate) fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%d-%m-%Y %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Lists tasks, optionally filtered
///
/// Supported query parameters: `status`, `priority`, `project_id`,
/// `user_id`. Present filters combine conjunctively; blank ones are
/// ignored.
///
/// # Errors
///
/// - `404 "Not Found Any Task!"`: Nothing matched
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let tasks = Task::list(&state.db, filter.normalized()).await?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound("Not Found Any Task!".to_string()));
    }

    let resources: Vec<TaskResource> = tasks.into_iter().map(TaskResource::from).collect();

    Ok(success(StatusCode::OK, "tasks", json!(resources)))
}

/// Shows a single task
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Task!".to_string()))?;

    Ok(success(
        StatusCode::OK,
        "task",
        json!(TaskResource::from(task)),
    ))
}

/// Creates a task
///
/// The assignee is attached to the target project in the same transaction
/// as the task insert.
///
/// # Errors
///
/// - `401 "This action is unauthorized."`: Actor is neither admin nor a
///   manager of the project
/// - `400 "Can't assign to this user"`: Assignee missing, deleted, or admin,
///   checked before the project lookup
/// - `404 "Not Found This Project"`: Target project missing or deleted
/// - `400 "Invalid due date format, please use d-m-Y H:i"`: Unparseable date
/// - `400 "Due date must be a future date."`: Date in the past
pub async fn store(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_request(&req)?;

    let is_manager =
        Membership::is_manager(&state.db, req.assign_to_project, actor.user_id).await?;
    policy::require_task_author(&actor, is_manager)
        .map_err(|_| ApiError::Unauthorized("This action is unauthorized.".to_string()))?;

    User::find_assignable(&state.db, req.assign_to_user)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Can't assign to this user".to_string()))?;

    Project::find_by_id(&state.db, req.assign_to_project)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Project".to_string()))?;

    let due_date = parse_due_date(&req.due_date).ok_or_else(|| {
        ApiError::BadRequest("Invalid due date format, please use d-m-Y H:i".to_string())
    })?;

    if due_date <= Utc::now() {
        return Err(ApiError::BadRequest(
            "Due date must be a future date.".to_string(),
        ));
    }

    Task::create_with_membership(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            assign_to_user: req.assign_to_user,
            assign_to_project: req.assign_to_project,
            due_date,
            notes: req.notes,
        },
        req.role,
    )
    .await?;

    Ok(success(
        StatusCode::CREATED,
        "msg",
        json!("Created task is successfully"),
    ))
}

/// Updates a task
///
/// # Errors
///
/// - `404 "Not Found This Task"`: No live task with that ID
/// - `401 "This action is unauthorized."`: Actor is neither admin nor a
///   manager of the task's project
/// - `400 "Invalid date format"`: Unparseable due date
/// - `404 "Not Found Any Data in Request"`: Patch had no usable fields
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Task".to_string()))?;

    let is_manager =
        Membership::is_manager(&state.db, task.assign_to_project, actor.user_id).await?;
    policy::require_task_author(&actor, is_manager)
        .map_err(|_| ApiError::Unauthorized("This action is unauthorized.".to_string()))?;

    let due_date = match req.due_date.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(
            parse_due_date(raw)
                .ok_or_else(|| ApiError::BadRequest("Invalid date format".to_string()))?,
        ),
    };

    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        priority: Some(req.priority),
        due_date,
    }
    .normalized();

    if patch.is_empty() {
        return Err(ApiError::NotFound(
            "Not Found Any Data in Request".to_string(),
        ));
    }

    Task::update(&state.db, id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Task".to_string()))?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Updated Task Successfully"),
    ))
}

/// Soft-deletes a task (admin only)
pub async fn destroy(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Task".to_string()))?;

    policy::require_admin(&actor)
        .map_err(|_| ApiError::BadRequest(DELETE_PERMISSION_DENIED.to_string()))?;

    Task::soft_delete(&state.db, id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Task deleted successfully"),
    ))
}

/// Restores a soft-deleted task (admin only)
///
/// # Errors
///
/// - `404 "Task not found or not soft-deleted"`: ID unknown or task is live
pub async fn restore(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Task::find_trashed(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found or not soft-deleted".to_string()))?;

    policy::require_admin(&actor)
        .map_err(|_| ApiError::BadRequest(DELETE_PERMISSION_DENIED.to_string()))?;

    Task::restore(&state.db, id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Task restored successfully"),
    ))
}

/// Delivers a task
///
/// Only the non-admin assignee of an in-progress task may deliver it.
/// Delivery sets the status to done and overwrites due_date with the
/// delivery time, which is what the clients read as "delivered at".
///
/// # Errors
///
/// - `404 "Not Found This Task"`: No live task with that ID
/// - `400 "User unAuthorization or task status not in-progress"`
/// - `400 "This task assigned to another user"`
pub async fn delivery(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Task".to_string()))?;

    policy::authorize_delivery(&actor, task.assign_to_user, task.status)
        .map_err(|denied| ApiError::BadRequest(denied.to_string()))?;

    // The UPDATE re-checks the status, so a concurrent delivery loses here
    // instead of double-applying.
    Task::deliver(&state.db, id).await?.ok_or_else(|| {
        ApiError::BadRequest(policy::DeliveryDenied::NotEligible.to_string())
    })?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Task Deliveried Successfully"),
    ))
}
