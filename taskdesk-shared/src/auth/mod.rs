/// Authentication and authorization for TaskDesk
///
/// # Modules
///
/// - `password`: Argon2id password hashing
/// - `jwt`: Token creation and validation (HS256)
/// - `middleware`: Axum middleware extracting the actor from Bearer tokens
/// - `policy`: Authorization rules over the actor and project roles

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
