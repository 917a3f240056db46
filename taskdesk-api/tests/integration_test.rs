/// Integration tests for the TaskDesk API
///
/// These tests require a running PostgreSQL database and exercise behavior
/// that lives in SQL guards and the full request pipeline:
/// - Authentication middleware responses
/// - Task creation precondition ordering
/// - Delivery (status guard, due_date stamping, repeat attempts)
/// - Restore applying only to soft-deleted rows, exactly once
/// - Blank patch fields and blank query filters being ignored
///
/// Environment: DATABASE_URL and JWT_SECRET must be set (a `.env` file
/// works). Run with: cargo test -p taskdesk-api --test integration_test

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use taskdesk_shared::models::task::{Task, TaskPriority, TaskStatus};
use taskdesk_shared::models::user::User;
use uuid::Uuid;

/// An admin assignee is rejected before the project is even looked at, so
/// the error stays "Can't assign to this user" even for a bogus project.
#[tokio::test]
async fn test_create_task_rejects_admin_assignee_before_project_check() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = common::send(
        &ctx,
        "POST",
        "/v1/tasks",
        Some(&ctx.admin_auth()),
        Some(json!({
            "title": "Unassignable",
            "description": "Assignee is an admin",
            "priority": "low",
            "assign_to_user": ctx.admin.id,
            "assign_to_project": Uuid::new_v4(),
            "due_date": "31-12-2099 12:00",
            "role": "developer"
        })),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["isSuccess"], json!(false));
    assert_eq!(body["error"], json!("Can't assign to this user"));

    ctx.cleanup().await.unwrap();
}

/// Delivery flips the status to done, stamps due_date with the delivery
/// time, and a second attempt bounces off the status guard.
#[tokio::test]
async fn test_delivery_sets_done_and_stamps_due_date() {
    let ctx = TestContext::new().await.unwrap();

    let task = common::create_test_task(&ctx, ctx.member.id, TaskPriority::Middle)
        .await
        .unwrap();
    let original_due = task.due_date;

    let (status, body) = common::send(
        &ctx,
        "POST",
        &format!("/v1/tasks/{}/delivery", task.id),
        Some(&ctx.member_auth()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], json!("Task Deliveried Successfully"));

    let delivered = Task::find_by_id(&ctx.db, task.id).await.unwrap().unwrap();
    assert_eq!(delivered.status, TaskStatus::Done);
    assert!(
        delivered.due_date < original_due,
        "due_date should be overwritten with the delivery time"
    );

    // A delivered task is no longer in-progress
    let (status, body) = common::send(
        &ctx,
        "POST",
        &format!("/v1/tasks/{}/delivery", task.id),
        Some(&ctx.member_auth()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("User unAuthorization or task status not in-progress")
    );

    ctx.cleanup().await.unwrap();
}

/// Admin actors are never eligible to deliver
#[tokio::test]
async fn test_delivery_rejects_admin_actor() {
    let ctx = TestContext::new().await.unwrap();

    let task = common::create_test_task(&ctx, ctx.member.id, TaskPriority::Low)
        .await
        .unwrap();

    let (status, body) = common::send(
        &ctx,
        "POST",
        &format!("/v1/tasks/{}/delivery", task.id),
        Some(&ctx.admin_auth()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("User unAuthorization or task status not in-progress")
    );

    let unchanged = Task::find_by_id(&ctx.db, task.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, TaskStatus::InProgress);

    ctx.cleanup().await.unwrap();
}

/// Restore only matches trashed rows; restoring twice fails the second time
#[tokio::test]
async fn test_task_restore_applies_exactly_once() {
    let ctx = TestContext::new().await.unwrap();

    let task = common::create_test_task(&ctx, ctx.member.id, TaskPriority::Low)
        .await
        .unwrap();
    assert!(Task::soft_delete(&ctx.db, task.id).await.unwrap());

    let (status, body) = common::send(
        &ctx,
        "POST",
        &format!("/v1/tasks/{}/restore", task.id),
        Some(&ctx.admin_auth()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], json!("Task restored successfully"));

    // The row is live again, so a second restore finds nothing to restore
    let (status, body) = common::send(
        &ctx,
        "POST",
        &format!("/v1/tasks/{}/restore", task.id),
        Some(&ctx.admin_auth()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Task not found or not soft-deleted"));

    assert!(!Task::restore(&ctx.db, task.id).await.unwrap());

    ctx.cleanup().await.unwrap();
}

/// Restoring a live user is an error, not a no-op
#[tokio::test]
async fn test_user_restore_requires_deleted_account() {
    let ctx = TestContext::new().await.unwrap();

    assert!(User::soft_delete(&ctx.db, ctx.member.id).await.unwrap());

    let (status, body) = common::send(
        &ctx,
        "POST",
        "/v1/user/restore",
        Some(&ctx.admin_auth()),
        Some(json!({ "email": ctx.member.email })),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], json!("Restored user successfully"));

    let (status, body) = common::send(
        &ctx,
        "POST",
        "/v1/user/restore",
        Some(&ctx.admin_auth()),
        Some(json!({ "email": ctx.member.email })),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("This user isn't deleted"));

    ctx.cleanup().await.unwrap();
}

/// Blank string fields in a task update count as omitted and leave the
/// stored values untouched.
#[tokio::test]
async fn test_task_update_ignores_blank_fields() {
    let ctx = TestContext::new().await.unwrap();

    let task = common::create_test_task(&ctx, ctx.member.id, TaskPriority::High)
        .await
        .unwrap();

    let (status, body) = common::send(
        &ctx,
        "PUT",
        &format!("/v1/tasks/{}", task.id),
        Some(&ctx.admin_auth()),
        Some(json!({
            "title": "   ",
            "description": "",
            "priority": "high"
        })),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], json!("Updated Task Successfully"));

    let reloaded = Task::find_by_id(&ctx.db, task.id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, task.title);
    assert_eq!(reloaded.description, task.description);
    assert_eq!(reloaded.priority, TaskPriority::High);

    ctx.cleanup().await.unwrap();
}

/// A project update with nothing but blank fields is rejected and the
/// project keeps its stored values.
#[tokio::test]
async fn test_project_update_rejects_all_blank_patch() {
    let ctx = TestContext::new().await.unwrap();
    ctx.grant_manager(ctx.admin.id).await.unwrap();

    let (status, body) = common::send(
        &ctx,
        "PUT",
        &format!("/v1/projects/{}", ctx.project.id),
        Some(&ctx.admin_auth()),
        Some(json!({ "name": "  ", "description": "" })),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not Found Any Data in Request"));

    let reloaded = taskdesk_shared::models::project::Project::find_by_id(&ctx.db, ctx.project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.name, ctx.project.name);
    assert_eq!(reloaded.description, ctx.project.description);

    ctx.cleanup().await.unwrap();
}

/// Protected routes answer missing and invalid tokens with the envelope
#[tokio::test]
async fn test_token_errors_use_envelope() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = common::send(&ctx, "POST", "/v1/auth/logout", None, None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["isSuccess"], json!(false));
    assert_eq!(body["error"], json!("A token is required"));

    let (status, body) = common::send(
        &ctx,
        "POST",
        "/v1/auth/logout",
        Some("Bearer not.a.token"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Token is invalid"));

    ctx.cleanup().await.unwrap();
}

/// Blank id filters are ignored instead of failing extraction, and a real
/// project_id filter narrows the listing.
#[tokio::test]
async fn test_task_list_filters() {
    let ctx = TestContext::new().await.unwrap();

    let task = common::create_test_task(&ctx, ctx.member.id, TaskPriority::Middle)
        .await
        .unwrap();

    // Blank filters behave like no filters at all
    let (status, body) = common::send(
        &ctx,
        "GET",
        "/v1/tasks?project_id=&user_id=&status=",
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSuccess"], json!(true));
    assert!(body["tasks"].as_array().unwrap().iter().any(|t| {
        t["title"] == json!(task.title.clone())
    }));

    // A concrete project filter matches our task
    let (status, body) = common::send(
        &ctx,
        "GET",
        &format!("/v1/tasks?project_id={}", ctx.project.id),
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    // A project nobody has tasks in yields the empty-list 404
    let (status, body) = common::send(
        &ctx,
        "GET",
        &format!("/v1/tasks?project_id={}", Uuid::new_v4()),
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not Found Any Task!"));

    ctx.cleanup().await.unwrap();
}
