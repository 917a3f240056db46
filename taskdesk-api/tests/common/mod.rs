/// Common test utilities for integration tests
///
/// Provides shared infrastructure for the API-level tests:
/// - Database connection and migrations
/// - Test users (one admin, one regular member) with JWT tokens
/// - A test project
/// - Request helpers for calling the router
///
/// All test data carries unique names/emails so suites can run against a
/// shared database; `cleanup` removes what a context created.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::Config;
use taskdesk_shared::auth::jwt::{create_token, Claims};
use taskdesk_shared::models::membership::MembershipRole;
use taskdesk_shared::models::project::{CreateProject, Project};
use taskdesk_shared::models::task::{CreateTask, Task, TaskPriority};
use taskdesk_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub admin: User,
    pub admin_token: String,
    pub member: User,
    pub member_token: String,
    pub project: Project,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../taskdesk-shared/migrations")
            .run(&db)
            .await?;

        let admin = User::create(
            &db,
            CreateUser {
                name: "Test Admin".to_string(),
                email: format!("lead-{}@admin-test.example", Uuid::new_v4()),
                password_hash: "test-hash".to_string(),
                is_admin: true,
            },
        )
        .await?;

        let member = User::create(
            &db,
            CreateUser {
                name: "Test Member".to_string(),
                email: format!("dev-{}@company-test.example", Uuid::new_v4()),
                password_hash: "test-hash".to_string(),
                is_admin: false,
            },
        )
        .await?;

        let project = Project::create(
            &db,
            CreateProject {
                name: format!("Test Project {}", Uuid::new_v4()),
                description: "Integration test project".to_string(),
            },
        )
        .await?;

        let admin_token = create_token(&Claims::new(admin.id, true), &config.jwt.secret)?;
        let member_token = create_token(&Claims::new(member.id, false), &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            admin,
            admin_token,
            member,
            member_token,
            project,
        })
    }

    /// Returns an authorization header value for the admin user
    pub fn admin_auth(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    /// Returns an authorization header value for the regular member
    pub fn member_auth(&self) -> String {
        format!("Bearer {}", self.member_token)
    }

    /// Grants a user the manager role on the test project
    pub async fn grant_manager(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO project_memberships (project_id, user_id, role)
             VALUES ($1, $2, $3)
             ON CONFLICT (project_id, user_id) DO UPDATE SET role = EXCLUDED.role",
        )
        .bind(self.project.id)
        .bind(user_id)
        .bind(MembershipRole::Manager)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM tasks WHERE assign_to_project = $1")
            .bind(self.project.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM project_memberships WHERE project_id = $1")
            .bind(self.project.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(self.project.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1 OR id = $2")
            .bind(self.admin.id)
            .bind(self.member.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Sends a request to the router and returns status plus parsed JSON body
pub async fn send(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = ctx.app.clone().call(request).await?;
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}

/// Creates a task assigned to the given user on the test project
///
/// Due date is set a month out so the task is comfortably in the future.
pub async fn create_test_task(
    ctx: &TestContext,
    assignee: Uuid,
    priority: TaskPriority,
) -> anyhow::Result<Task> {
    let task = Task::create_with_membership(
        &ctx.db,
        CreateTask {
            title: format!("Test task {}", Uuid::new_v4()),
            description: "Integration test task".to_string(),
            priority,
            assign_to_user: assignee,
            assign_to_project: ctx.project.id,
            due_date: chrono::Utc::now() + chrono::Duration::days(30),
            notes: None,
        },
        MembershipRole::Developer,
    )
    .await?;

    Ok(task)
}
