//! Axum route handlers for the Projects API.
//!
//! A project is a submitted VSL script owned by a user. Scripts arrive typed
//! (JSON) or as an uploaded PDF (multipart) whose text is extracted
//! server-side. Identity is consumed as an opaque `user_id` + email; the
//! profile row is created lazily on first submission.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::projects::pdf::extract_script_from_pdf;
use crate::projects::store::{ensure_profile, get_project, insert_project, list_projects};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    pub email: String,
    pub title: String,
    #[serde(default)]
    pub vsl_content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub project: ProjectRow,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects
///
/// Creates a project from a typed script. Title and script must be non-empty
/// after trimming.
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let content = request.vsl_content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "Description or valid PDF is required".to_string(),
        ));
    }

    ensure_profile(&state.db, request.user_id, &request.email).await?;
    let project = insert_project(&state.db, request.user_id, title, content).await?;

    info!("Project {} created for user {}", project.id, project.user_id);
    Ok(Json(CreateProjectResponse { project }))
}

/// POST /api/v1/projects/upload
///
/// Creates a project from an uploaded PDF. Multipart fields: `user_id`,
/// `email`, `title`, and a `file` part containing the PDF bytes. The script
/// text is extracted server-side; an unreadable or text-free PDF is a 400.
pub async fn handle_upload_project(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateProjectResponse>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut email = String::new();
    let mut title = String::new();
    let mut pdf_bytes: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable user_id field: {e}")))?;
                user_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?,
                );
            }
            "email" => {
                email = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable email field: {e}")))?;
            }
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable title field: {e}")))?;
            }
            "file" => {
                pdf_bytes = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Unreadable file upload: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::Validation("user_id field is required".to_string()))?;
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    let pdf_bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;

    let content = extract_script_from_pdf(&pdf_bytes)?;

    ensure_profile(&state.db, user_id, &email).await?;
    let project = insert_project(&state.db, user_id, &title, &content).await?;

    info!(
        "Project {} created from PDF upload ({} bytes) for user {}",
        project.id,
        pdf_bytes.len(),
        user_id
    );
    Ok(Json(CreateProjectResponse { project }))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectRow>, AppError> {
    let project = get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    Ok(Json(project))
}

/// GET /api/v1/users/:user_id/projects
///
/// Lists a user's projects, newest first.
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = list_projects(&state.db, user_id).await?;
    Ok(Json(ProjectListResponse { projects }))
}
