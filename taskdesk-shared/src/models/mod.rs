/// Database models for TaskDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with soft delete and the admin flag
/// - `project`: Projects owning tasks and members
/// - `task`: Tasks with priority, status workflow, and soft delete
/// - `membership`: Project-user association with role and contribution tracking

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
