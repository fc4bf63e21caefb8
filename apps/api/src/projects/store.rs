//! Database access for profiles and projects.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::project::ProjectRow;

/// Creates the profile row for a user if it does not exist yet.
/// First submission wins; later submissions are no-ops.
pub async fn ensure_profile(pool: &PgPool, user_id: Uuid, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(email)
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a project and returns the stored row.
pub async fn insert_project(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    vsl_content: &str,
) -> Result<ProjectRow, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects (id, user_id, title, vsl_content, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(vsl_content)
    .fetch_one(pool)
    .await
}

pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<ProjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_projects(pool: &PgPool, user_id: Uuid) -> Result<Vec<ProjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
