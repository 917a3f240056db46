/// Authentication middleware for Axum
///
/// Validates Bearer tokens from the Authorization header and adds an
/// `AuthContext` to request extensions so handlers know who is acting.
///
/// Error responses carry the same `{"isSuccess": false, "error": ...}`
/// envelope the rest of the API uses: a missing token is a 400 with
/// "A token is required", anything that fails validation is a 401 with
/// "Token is invalid".
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskdesk_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn protected_handler(Extension(actor): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", actor.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_jwt_middleware("your-jwt-secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::validate_token;

/// The authenticated actor, added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Whether the actor is an admin, taken from the token claims
    pub is_admin: bool,
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,

    /// Header present but the token failed validation
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::BAD_REQUEST, "A token is required"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token is invalid"),
        };

        (status, Json(json!({ "isSuccess": false, "error": message }))).into_response()
    }
}

/// Pulls the raw token out of an Authorization header value
///
/// Accepts both "Bearer <token>" and a bare token, which is what the
/// legacy clients send.
pub fn extract_bearer(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim()
}

/// JWT authentication middleware
///
/// # Errors
///
/// - 400 "A token is required" when the Authorization header is missing
/// - 401 "Token is invalid" when the token is malformed, expired, or has a
///   bad signature
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_bearer(auth_header);
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = validate_token(token, &secret).map_err(|_| AuthError::InvalidToken)?;

    let auth_context = AuthContext {
        user_id: claims.sub,
        is_admin: claims.is_admin,
    };
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a JWT authentication middleware closure
///
/// Captures the secret so the result can be handed to
/// `axum::middleware::from_fn`.
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}
