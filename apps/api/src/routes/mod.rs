pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::projects::handlers as projects;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // B-roll generation
        .route(
            "/api/v1/broll/generate",
            post(generation::handle_generate_broll),
        )
        // Projects
        .route("/api/v1/projects", post(projects::handle_create_project))
        .route(
            "/api/v1/projects/upload",
            post(projects::handle_upload_project),
        )
        .route("/api/v1/projects/:id", get(projects::handle_get_project))
        .route(
            "/api/v1/users/:user_id/projects",
            get(projects::handle_list_projects),
        )
        .with_state(state)
}
