/*
 * Responsibility
 * - SQLx operations for the users table
 * - Takes a PgPool, returns rows; DB errors surface as RepoError
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub subject: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub async fn find_by_subject(db: &PgPool, subject: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, subject, email, full_name, is_active, created_at, updated_at
        FROM users
        WHERE subject = $1
        "#,
    )
    .bind(subject)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, subject, email, full_name, is_active, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, subject, email, full_name, is_active, created_at, updated_at
        FROM users
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Create-or-update the profile row for an identity-provider subject.
///
/// The subject is the conflict target: the first request provisions the row,
/// later requests update it. Email uniqueness is enforced by the DB and
/// surfaces as Conflict.
pub async fn upsert_by_subject(
    db: &PgPool,
    subject: &str,
    email: &str,
    full_name: &str,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (subject, email, full_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (subject) DO UPDATE
        SET email = EXCLUDED.email,
            full_name = EXCLUDED.full_name,
            updated_at = now()
        RETURNING id, subject, email, full_name, is_active, created_at, updated_at
        "#,
    )
    .bind(subject)
    .bind(email)
    .bind(full_name)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    email: Option<&str>,
    full_name: Option<&str>,
    is_active: Option<bool>,
) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            full_name = COALESCE($3, full_name),
            is_active = COALESCE($4, is_active),
            updated_at = now()
        WHERE id = $1
        RETURNING id, subject, email, full_name, is_active, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(full_name)
    .bind(is_active)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
