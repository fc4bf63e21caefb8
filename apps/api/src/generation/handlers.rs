//! Axum route handlers for the B-roll Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::generator::{generate_broll, ShotPrompt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateBrollRequest {
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateBrollResponse {
    pub success: bool,
    #[serde(rename = "brollPrompts")]
    pub broll_prompts: Vec<ShotPrompt>,
    #[serde(rename = "promptCount")]
    pub prompt_count: usize,
}

/// POST /api/v1/broll/generate
///
/// Runs the generation/validation loop for a script and returns the
/// validated batch. 503 when no inference credential is configured, 400 for
/// an empty script (checked before any outbound call), 500 with details
/// after retry exhaustion.
pub async fn handle_generate_broll(
    State(state): State<AppState>,
    Json(request): Json<GenerateBrollRequest>,
) -> Result<Json<GenerateBrollResponse>, AppError> {
    if state.config.huggingface_api_key.is_empty() {
        return Err(AppError::Configuration(
            "HUGGINGFACE_API_KEY is not set".to_string(),
        ));
    }

    if request.script.trim().is_empty() {
        return Err(AppError::Validation(
            "Script content is required".to_string(),
        ));
    }

    let result = generate_broll(
        state.llm.as_ref(),
        &state.config.generation,
        &request.script,
    )
    .await?;

    Ok(Json(GenerateBrollResponse {
        success: true,
        broll_prompts: result.prompts,
        prompt_count: result.prompt_count,
    }))
}
