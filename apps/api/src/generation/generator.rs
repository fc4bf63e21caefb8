//! B-roll Prompt Generation — the validated retry loop around the LLM call.
//!
//! Flow per attempt: build prompt → call generator → recover array text →
//! parse → validate. Any failure on an attempt (network, parse, validation)
//! is logged and absorbed; only exhausting every attempt surfaces an error,
//! carrying the last observed state for the caller's message.
//!
//! Attempts run strictly sequentially — each attempt's outcome decides
//! whether another is needed.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GenerationSettings;
use crate::errors::AppError;
use crate::generation::prompts::{build_broll_prompt, STOP_SEQUENCES};
use crate::generation::validator::validate_batch;
use crate::llm_client::recover::recover_array_text;
use crate::llm_client::{SamplingParams, TextGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One suggested b-roll shot: a short cinematic description plus the verbatim
/// script line that inspired it. Both fields are mandatory on the wire;
/// emptiness is rejected by validation, not by serde.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShotPrompt {
    pub prompt: String,
    #[serde(rename = "scriptReference")]
    pub script_reference: String,
}

/// A fully validated batch: exactly `prompt_count` shots, in the numbered
/// order the model was asked for.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub prompts: Vec<ShotPrompt>,
    pub prompt_count: usize,
}

/// What went wrong on a single attempt. Absorbed and logged, never returned.
#[derive(Debug)]
enum AttemptFailure {
    Call(crate::llm_client::LlmError),
    NoArrayFound,
    Parse(serde_json::Error),
    Rejected(crate::generation::validator::ValidationFailure),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Call(e) => write!(f, "inference call failed: {e}"),
            AttemptFailure::NoArrayFound => write!(f, "no JSON array found in model output"),
            AttemptFailure::Parse(e) => write!(f, "model output is not a valid prompt array: {e}"),
            AttemptFailure::Rejected(e) => write!(f, "validation rejected the batch: {e}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation loop
// ────────────────────────────────────────────────────────────────────────────

/// Generates and validates a batch of b-roll prompts for a script.
///
/// Returns exactly `settings.prompt_count` shots or, after
/// `settings.max_attempts` failed attempts, an `AppError::Generation` whose
/// details name the attempts used and the last observed prompt count.
///
/// The empty-script guard runs before any network call.
pub async fn generate_broll(
    llm: &dyn TextGenerator,
    settings: &GenerationSettings,
    script: &str,
) -> Result<GenerationResult, AppError> {
    let script = script.trim();
    if script.is_empty() {
        return Err(AppError::Validation(
            "Script content is required".to_string(),
        ));
    }

    let prompt = build_broll_prompt(script, settings.prompt_count);
    let params = SamplingParams {
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
    };

    let mut last_observed_count: Option<usize> = None;
    let mut last_failure = String::new();

    for attempt in 1..=settings.max_attempts {
        match run_attempt(llm, &prompt, &params, settings).await {
            Ok(prompts) => {
                info!(
                    "Generated {} b-roll prompts on attempt {}/{}",
                    prompts.len(),
                    attempt,
                    settings.max_attempts
                );
                return Ok(GenerationResult {
                    prompt_count: prompts.len(),
                    prompts,
                });
            }
            Err((failure, observed_count)) => {
                warn!(
                    "Generation attempt {}/{} failed: {}",
                    attempt, settings.max_attempts, failure
                );
                if observed_count.is_some() {
                    last_observed_count = observed_count;
                }
                last_failure = failure.to_string();
            }
        }
    }

    let observed = match last_observed_count {
        Some(count) => format!("last attempt produced {count} prompts"),
        None => "no attempt produced a parseable prompt array".to_string(),
    };

    Err(AppError::Generation {
        details: format!(
            "exhausted {} attempts ({}; last failure: {})",
            settings.max_attempts, observed, last_failure
        ),
    })
}

/// One attempt: call → recover → parse → validate.
/// On failure also reports the prompt count observed, when one was parseable.
async fn run_attempt(
    llm: &dyn TextGenerator,
    prompt: &str,
    params: &SamplingParams,
    settings: &GenerationSettings,
) -> Result<Vec<ShotPrompt>, (AttemptFailure, Option<usize>)> {
    let raw = llm
        .generate(prompt, params)
        .await
        .map_err(|e| (AttemptFailure::Call(e), None))?;

    let array_text =
        recover_array_text(&raw).ok_or_else(|| (AttemptFailure::NoArrayFound, None))?;

    let prompts: Vec<ShotPrompt> = serde_json::from_str(array_text)
        .map_err(|e| (AttemptFailure::Parse(e), None))?;

    let observed = prompts.len();
    validate_batch(&prompts, settings.prompt_count, settings.strict_validation).map_err(
        |failure| {
            let count = failure.observed_count(observed);
            (AttemptFailure::Rejected(failure), Some(count))
        },
    )?;

    Ok(prompts)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted generator: returns canned responses in order, repeating the
    /// last one, and counts how many calls were made.
    struct ScriptedGenerator {
        responses: Vec<Result<String, ()>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, ()>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        fn always(response: &str) -> Self {
            Self::new(vec![Ok(response.to_string())])
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _params: &SamplingParams,
        ) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let index = call.min(self.responses.len() - 1);
            match &self.responses[index] {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(LlmError::EmptyContent),
            }
        }
    }

    fn settings(prompt_count: usize) -> GenerationSettings {
        GenerationSettings {
            prompt_count,
            ..GenerationSettings::default()
        }
    }

    /// Three shots, camera language on each, three distinct categories.
    fn valid_array() -> String {
        serde_json::json!([
            {
                "prompt": "Drone shot over a city skyline at sunrise",
                "scriptReference": "Every morning feels like a battle."
            },
            {
                "prompt": "Slow-motion close-up of a smiling face",
                "scriptReference": "Until everything changed."
            },
            {
                "prompt": "Macro shot of the product bottle on a counter",
                "scriptReference": "One small habit made the difference."
            }
        ])
        .to_string()
    }

    const SCRIPT: &str = "Every morning feels like a battle.\nUntil everything changed.\nOne small habit made the difference.";

    #[tokio::test]
    async fn test_valid_response_succeeds_first_attempt() {
        let llm = ScriptedGenerator::always(&valid_array());
        let result = generate_broll(&llm, &settings(3), SCRIPT).await.unwrap();

        assert_eq!(result.prompt_count, 3);
        assert_eq!(result.prompts.len(), 3);
        // Input order preserved.
        assert!(result.prompts[0].prompt.starts_with("Drone shot"));
        assert!(result.prompts[2].prompt.starts_with("Macro shot"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_response_parses_like_bare() {
        let fenced = format!("```json\n{}\n```", valid_array());
        let llm = ScriptedGenerator::always(&fenced);
        let result = generate_broll(&llm, &settings(3), SCRIPT).await.unwrap();
        assert_eq!(result.prompt_count, 3);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_role_prefixed_response_parses_like_bare() {
        let prefixed = format!("Assistant: {}", valid_array());
        let llm = ScriptedGenerator::always(&prefixed);
        let result = generate_broll(&llm, &settings(3), SCRIPT).await.unwrap();
        assert_eq!(result.prompt_count, 3);
    }

    #[tokio::test]
    async fn test_short_array_exhausts_attempts_with_last_count() {
        // Always returns 3 prompts when 10 were demanded.
        let llm = ScriptedGenerator::always(&valid_array());
        let err = generate_broll(&llm, &settings(10), SCRIPT)
            .await
            .unwrap_err();

        assert_eq!(llm.call_count(), 3);
        match err {
            AppError::Generation { details } => {
                assert!(details.contains("3 attempts"), "details: {details}");
                assert!(
                    details.contains("produced 3 prompts"),
                    "details must mention the last observed count: {details}"
                );
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_camera_language_rejected_every_attempt() {
        let flat = serde_json::json!([
            {"prompt": "A sunset", "scriptReference": "line one"},
            {"prompt": "A mountain", "scriptReference": "line two"},
            {"prompt": "A forest trail", "scriptReference": "line three"}
        ])
        .to_string();
        let llm = ScriptedGenerator::always(&flat);
        let err = generate_broll(&llm, &settings(3), SCRIPT)
            .await
            .unwrap_err();

        assert_eq!(llm.call_count(), 3);
        assert!(matches!(err, AppError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_empty_script_makes_no_network_call() {
        let llm = ScriptedGenerator::always(&valid_array());

        let err = generate_broll(&llm, &settings(3), "   \n\t ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.call_count(), 0, "validation must precede any call");
    }

    #[tokio::test]
    async fn test_low_category_diversity_rejected() {
        // Camera language present, but only environment + emotional.
        let two_categories = serde_json::json!([
            {"prompt": "Drone shot over a city skyline", "scriptReference": "a"},
            {"prompt": "Close-up of a smiling face", "scriptReference": "b"},
            {"prompt": "Wide shot of a mountain landscape", "scriptReference": "c"}
        ])
        .to_string();
        let llm = ScriptedGenerator::always(&two_categories);
        let err = generate_broll(&llm, &settings(3), SCRIPT)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation { .. }));

        // Same shape spanning three categories passes.
        let llm = ScriptedGenerator::always(&valid_array());
        assert!(generate_broll(&llm, &settings(3), SCRIPT).await.is_ok());
    }

    #[tokio::test]
    async fn test_network_failures_consume_attempts_then_recover() {
        // Two failed calls, then a valid one — succeeds on the third attempt.
        let llm = ScriptedGenerator::new(vec![Err(()), Err(()), Ok(valid_array())]);
        let result = generate_broll(&llm, &settings(3), SCRIPT).await.unwrap();
        assert_eq!(result.prompt_count, 3);
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_output_exhausts_attempts() {
        let llm = ScriptedGenerator::always("I'm sorry, I can't produce JSON today.");
        let err = generate_broll(&llm, &settings(3), SCRIPT)
            .await
            .unwrap_err();
        assert_eq!(llm.call_count(), 3);
        match err {
            AppError::Generation { details } => {
                assert!(details.contains("no attempt produced a parseable prompt array"));
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lenient_settings_accept_uncinematic_batch() {
        let flat = serde_json::json!([
            {"prompt": "A sunset", "scriptReference": "line one"},
            {"prompt": "A mountain", "scriptReference": "line two"},
            {"prompt": "A forest trail", "scriptReference": "line three"}
        ])
        .to_string();
        let llm = ScriptedGenerator::always(&flat);
        let lenient = GenerationSettings {
            prompt_count: 3,
            strict_validation: false,
            ..GenerationSettings::default()
        };
        let result = generate_broll(&llm, &lenient, SCRIPT).await.unwrap();
        assert_eq!(result.prompt_count, 3);
    }

    #[test]
    fn test_shot_prompt_wire_names() {
        let shot = ShotPrompt {
            prompt: "Dolly zoom down the hallway".to_string(),
            script_reference: "The walls were closing in.".to_string(),
        };
        let value = serde_json::to_value(&shot).unwrap();
        assert_eq!(value["scriptReference"], "The walls were closing in.");
        assert!(value.get("script_reference").is_none());
    }

    #[test]
    fn test_shot_prompt_requires_both_fields() {
        let missing: Result<ShotPrompt, _> =
            serde_json::from_str(r#"{"prompt": "Drone shot"}"#);
        assert!(missing.is_err());
    }
}
