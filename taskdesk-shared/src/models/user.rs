/// User model and database operations
///
/// Users are soft-deleted: a non-null `deleted_at` marks the row inactive,
/// and every live-row query filters on `deleted_at IS NULL`. Restore clears
/// the marker.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_admin, created_at, updated_at, deleted_at";

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Whether the user is an admin
    ///
    /// Derived at registration from the email containing "@admin".
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker (None = live)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Admin flag, resolved by the caller before insertion
    pub is_admin: bool,
}

/// Partial update for a user profile
///
/// Fields set to None are left untouched. Blank strings are treated as
/// omitted; see [`UserPatch::normalized`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
}

impl UserPatch {
    /// Drops fields whose value is blank (empty or whitespace-only)
    ///
    /// Mirrors the filtering the legacy API applied before persisting a
    /// partial update: a blank field is indistinguishable from an omitted
    /// one.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.filter(|v| !v.trim().is_empty()),
        }
    }

    /// True when no field remains to apply
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a live user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email, including soft-deleted rows
    ///
    /// Used by the restore flow, which must see deleted users.
    pub async fn find_by_email_with_deleted(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a live, non-admin user by ID
    ///
    /// Tasks may only be assigned to non-admin users, so assignment lookups
    /// go through this query.
    pub async fn find_assignable(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE id = $1 AND is_admin = FALSE AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Applies a normalized profile patch
    ///
    /// The caller is expected to have rejected empty patches already.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(patch.name)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes a user
    ///
    /// Returns true if a live row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Restores a soft-deleted user
    ///
    /// Returns true if a deleted row was restored. A second restore attempt
    /// matches no rows and returns false.
    pub async fn restore(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True when the user is currently soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Resolves the admin flag for a registration email
///
/// The legacy API grants admin to any email containing the literal
/// substring "@admin". This is trivially spoofable and preserved only for
/// compatibility; it is not a security boundary.
pub fn is_admin_email(email: &str) -> bool {
    email.contains("@admin")
}
