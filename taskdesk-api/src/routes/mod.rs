/// Route handlers for the API
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, logout
/// - `users`: Profile and admin user management
/// - `projects`: Project CRUD, restore, and per-project task lookups
/// - `tasks`: Task CRUD, restore, and delivery
///
/// Every success response shares one envelope: `{"isSuccess": true}` plus a
/// single payload key (`msg`, `token`, `profile`, `project`, `projects`,
/// `task`, or `tasks`).

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use axum::{http::StatusCode, Json};
use serde_json::Value;
use validator::Validate;

use crate::error::{ApiError, ValidationErrorDetail};

/// Builds the success envelope
///
/// The payload key varies per endpoint, so the body is assembled from a map
/// rather than a literal.
pub(crate) fn success(status: StatusCode, key: &str, value: Value) -> (StatusCode, Json<Value>) {
    let mut body = serde_json::Map::new();
    body.insert("isSuccess".to_string(), Value::Bool(true));
    body.insert(key.to_string(), value);
    (status, Json(Value::Object(body)))
}

/// Runs derive-based validation and maps failures to a 422
pub(crate) fn validate_request(req: &impl Validate) -> Result<(), ApiError> {
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })
}
