/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get a token
/// - `POST /v1/auth/refresh` - Reissue a token from a still-valid one
/// - `POST /v1/auth/logout` - Logout (authenticated)
///
/// Registration grants the admin flag when the email contains "@admin",
/// which is how the legacy clients mint their admin accounts. Logout is a
/// stateless acknowledgement; tokens simply age out.

use crate::{
    app::AppState,
    error::{is_unique_violation, ApiError, ApiResult},
    routes::{success, validate_request},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{
        jwt::{self, Claims},
        middleware::extract_bearer,
        password,
    },
    models::user::{is_admin_email, CreateUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional confirmation; when present it must match the password
    pub password_confirmation: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new user
///
/// # Response
///
/// `201` with `{"isSuccess": true, "msg": "Created user successfully"}`
/// (the message notes "as admin" for admin emails).
///
/// # Errors
///
/// - `422`: Validation failed
/// - `500 "Duplicated email"`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_request(&req)?;

    if let Some(confirmation) = &req.password_confirmation {
        if confirmation != &req.password {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "password_confirmation".to_string(),
                    message: "Password confirmation does not match".to_string(),
                },
            ]));
        }
    }

    let is_admin = is_admin_email(&req.email);
    let password_hash = password::hash_password(&req.password)?;

    User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            is_admin,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::InternalError("Duplicated email".to_string())
        } else {
            e.into()
        }
    })?;

    let msg = if is_admin {
        "Created user successfully as admin"
    } else {
        "Created user successfully"
    };

    Ok(success(StatusCode::CREATED, "msg", json!(msg)))
}

/// Login and obtain a token
///
/// # Errors
///
/// - `401 "Username or password is incorrect"`: Unknown email or wrong
///   password (deliberately the same message for both)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_request(&req)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("Username or password is incorrect".to_string())
        })?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Username or password is incorrect".to_string(),
        ));
    }

    let claims = Claims::new(user.id, user.is_admin);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(success(StatusCode::OK, "token", json!(token)))
}

/// Reissue a token
///
/// Public route that reads the Authorization header itself so it can
/// distinguish a missing token (400) from an invalid one (401).
///
/// # Errors
///
/// - `400 "A token is required"`: No Authorization header
/// - `401 "Token is invalid"`: Presented token failed validation
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("A token is required".to_string()))?;

    let token = extract_bearer(auth_header);
    if token.is_empty() {
        return Err(ApiError::BadRequest("A token is required".to_string()));
    }

    let fresh = jwt::refresh_token(token, state.jwt_secret())
        .map_err(|_| ApiError::Unauthorized("Token is invalid".to_string()))?;

    Ok(success(StatusCode::OK, "token", json!(fresh)))
}

/// Logout
///
/// Tokens are stateless, so this only acknowledges the client's intent.
/// Reaching the handler at all means the middleware accepted the token.
pub async fn logout() -> ApiResult<(StatusCode, Json<Value>)> {
    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Logged out user successfully"),
    ))
}
