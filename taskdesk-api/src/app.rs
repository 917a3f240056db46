/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::middleware::create_jwt_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register               # Public
///     │   ├── POST /login                  # Public
///     │   ├── POST /refresh                # Public (reads Authorization itself)
///     │   └── POST /logout                 # Authenticated
///     ├── /user/
///     │   ├── GET  /profile                # Authenticated
///     │   ├── PUT  /:id/update-profile     # Authenticated (admin)
///     │   ├── DELETE /:id/delete           # Authenticated (admin)
///     │   └── POST /restore                # Authenticated (admin)
///     ├── /projects/
///     │   ├── GET  /                       # Public
///     │   ├── GET  /:id                    # Public
///     │   ├── GET  /:id/latest-task        # Public
///     │   ├── GET  /:id/oldest-task        # Public
///     │   ├── GET  /:id/high-priority-task # Public
///     │   ├── POST /                       # Authenticated
///     │   ├── PUT  /:id                    # Authenticated (admin manager)
///     │   ├── DELETE /:id                  # Authenticated (admin manager)
///     │   └── POST /:id/restore            # Authenticated (admin manager)
///     └── /tasks/
///         ├── GET  /                       # Public (filterable)
///         ├── GET  /:id                    # Public
///         ├── POST /                       # Authenticated (admin or manager)
///         ├── PUT  /:id                    # Authenticated (admin or manager)
///         ├── DELETE /:id                  # Authenticated (admin)
///         ├── POST /:id/restore            # Authenticated (admin)
///         └── POST /:id/delivery           # Authenticated (assignee)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per protected route)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Reads are public and mutations are protected on the same paths, so
    // the auth layer is attached per method router rather than per
    // subrouter.
    let auth_mw =
        axum::middleware::from_fn(create_jwt_middleware(state.jwt_secret().to_string()));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (refresh is public but reads the Authorization header
    // itself so it can return the contract's 400/401 messages)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout).layer(auth_mw.clone()));

    // User routes (all authenticated; admin checks happen in the handlers
    // so the contract's messages and codes are preserved)
    let user_routes = Router::new()
        .route("/profile", get(routes::users::profile))
        .route("/:id/update-profile", put(routes::users::update_profile))
        .route("/:id/delete", delete(routes::users::delete_user))
        .route("/restore", post(routes::users::restore_user))
        .layer(auth_mw.clone());

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::index)
                .merge(post(routes::projects::store).layer(auth_mw.clone())),
        )
        .route(
            "/:id",
            get(routes::projects::show).merge(
                put(routes::projects::update)
                    .delete(routes::projects::destroy)
                    .layer(auth_mw.clone()),
            ),
        )
        .route(
            "/:id/restore",
            post(routes::projects::restore).layer(auth_mw.clone()),
        )
        .route("/:id/latest-task", get(routes::projects::latest_task))
        .route("/:id/oldest-task", get(routes::projects::oldest_task))
        .route(
            "/:id/high-priority-task",
            get(routes::projects::high_priority_task),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::index).merge(post(routes::tasks::store).layer(auth_mw.clone())),
        )
        .route(
            "/:id",
            get(routes::tasks::show).merge(
                put(routes::tasks::update)
                    .delete(routes::tasks::destroy)
                    .layer(auth_mw.clone()),
            ),
        )
        .route(
            "/:id/restore",
            post(routes::tasks::restore).layer(auth_mw.clone()),
        )
        .route(
            "/:id/delivery",
            post(routes::tasks::delivery).layer(auth_mw),
        );

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
