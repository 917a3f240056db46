/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - List projects with their tasks (public)
/// - `GET /v1/projects/:id` - Show a project (public)
/// - `POST /v1/projects` - Create a project (authenticated)
/// - `PUT /v1/projects/:id` - Update a project (admin manager)
/// - `DELETE /v1/projects/:id` - Soft-delete a project (admin manager)
/// - `POST /v1/projects/:id/restore` - Restore a project (admin manager)
/// - `GET /v1/projects/:id/latest-task` - Newest task (public)
/// - `GET /v1/projects/:id/oldest-task` - Oldest task (public)
/// - `GET /v1/projects/:id/high-priority-task` - Newest high-priority task (public)
///
/// Project mutations require the actor to be an admin AND hold the manager
/// role on the project; denials are 400s with the contract's wording.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, tasks::TaskResource, validate_request},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use taskdesk_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        membership::Membership,
        project::{CreateProject, Project, ProjectPatch},
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Project payload shape, with its live tasks nested
#[derive(Debug, Serialize)]
pub struct ProjectResource {
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskResource>,
}

impl ProjectResource {
    async fn load(pool: &PgPool, project: Project) -> Result<Self, sqlx::Error> {
        let tasks = Task::list_for_project(pool, project.id).await?;

        Ok(Self {
            name: project.name,
            description: project.description,
            tasks: tasks.into_iter().map(TaskResource::from).collect(),
        })
    }
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Lists all live projects with their tasks
///
/// # Errors
///
/// - `404 "Not Found Any Project"`: No live projects exist
pub async fn index(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Value>)> {
    let projects = Project::list(&state.db).await?;

    if projects.is_empty() {
        return Err(ApiError::NotFound("Not Found Any Project".to_string()));
    }

    let mut resources = Vec::with_capacity(projects.len());
    for project in projects {
        resources.push(ProjectResource::load(&state.db, project).await?);
    }

    Ok(success(StatusCode::OK, "projects", json!(resources)))
}

/// Shows a single project with its tasks
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Project".to_string()))?;

    let resource = ProjectResource::load(&state.db, project).await?;

    Ok(success(StatusCode::OK, "project", json!(resource)))
}

/// Creates a project
///
/// # Errors
///
/// - `422`: Validation failed
/// - `500 "Can't create new project. Try again"`: Insert failed
pub async fn store(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_request(&req)?;

    Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await
    .map_err(|e| {
        tracing::error!("Project creation failed: {}", e);
        ApiError::InternalError("Can't create new project. Try again".to_string())
    })?;

    Ok(success(
        StatusCode::CREATED,
        "msg",
        json!("Created project successfully"),
    ))
}

/// Updates a project (admin manager only)
///
/// # Errors
///
/// - `404 "Not Found This Project"`: No live project with that ID
/// - `400 "You don't have permission to update this project."`
/// - `404 "Not Found Any Data in Request"`: Patch had no usable fields
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Project".to_string()))?;

    let is_manager = Membership::is_manager(&state.db, id, actor.user_id).await?;
    policy::require_project_manager(&actor, is_manager).map_err(|_| {
        ApiError::BadRequest("You don't have permission to update this project.".to_string())
    })?;

    let patch = patch.normalized();
    if patch.is_empty() {
        return Err(ApiError::NotFound(
            "Not Found Any Data in Request".to_string(),
        ));
    }

    Project::update(&state.db, id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Project".to_string()))?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Updated project successfully"),
    ))
}

/// Soft-deletes a project (admin manager only)
pub async fn destroy(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This Project".to_string()))?;

    let is_manager = Membership::is_manager(&state.db, id, actor.user_id).await?;
    policy::require_project_manager(&actor, is_manager).map_err(|_| {
        ApiError::BadRequest("You don't have permission to delete this project.".to_string())
    })?;

    Project::soft_delete(&state.db, id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Deleted project successfully"),
    ))
}

/// Restores a soft-deleted project (admin manager only)
///
/// # Errors
///
/// - `404 "Project not found or not soft-deleted"`: ID unknown or live
/// - `400 "You don't have permission to restore this project."`
pub async fn restore(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_trashed(&state.db, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Project not found or not soft-deleted".to_string())
        })?;

    let is_manager = Membership::is_manager(&state.db, id, actor.user_id).await?;
    policy::require_project_manager(&actor, is_manager).map_err(|_| {
        ApiError::BadRequest("You don't have permission to restore this project.".to_string())
    })?;

    Project::restore(&state.db, id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Project restored successfully"),
    ))
}

/// Returns the most recently created task of a project
///
/// # Errors
///
/// - `404 "Project Not Found"`: No live project with that ID
/// - `404 "Not Found Any Task in This Project"`: Project has no live tasks
pub async fn latest_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project Not Found".to_string()))?;

    let task = Task::latest_in_project(&state.db, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Not Found Any Task in This Project".to_string())
        })?;

    Ok(success(
        StatusCode::OK,
        "task",
        json!(TaskResource::from(task)),
    ))
}

/// Returns the oldest task of a project
pub async fn oldest_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project Not Found".to_string()))?;

    let task = Task::oldest_in_project(&state.db, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Not Found Any Task in This Project".to_string())
        })?;

    Ok(success(
        StatusCode::OK,
        "task",
        json!(TaskResource::from(task)),
    ))
}

/// Returns the most recent high-priority task of a project
///
/// # Errors
///
/// - `404 "Project Not Found"`: No live project with that ID
/// - `404 "Not Found Any Task in This Project"`: Project has no live tasks
/// - `404 "Not Found Tasks That High Priority!"`: Tasks exist but none high
pub async fn high_priority_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project Not Found".to_string()))?;

    Task::latest_in_project(&state.db, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Not Found Any Task in This Project".to_string())
        })?;

    let task = Task::latest_high_priority_in_project(&state.db, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Not Found Tasks That High Priority!".to_string())
        })?;

    Ok(success(
        StatusCode::OK,
        "task",
        json!(TaskResource::from(task)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let req = CreateProjectRequest {
            name: "".to_string(),
            description: "something".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateProjectRequest {
            name: "Apollo".to_string(),
            description: "Launch tracking".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
