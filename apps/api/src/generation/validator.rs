//! Acceptance criteria for a generated batch of shot prompts.
//!
//! A batch is accepted only if it has exactly the configured count, every
//! entry carries both fields non-empty, every prompt uses recognized camera
//! language, and the batch spans at least `MIN_DISTINCT_CATEGORIES` visual
//! categories. With strict validation off, only the structural rules apply
//! (count + fields) — the shape the earliest version of this endpoint shipped.

use serde::Serialize;
use thiserror::Error;

use crate::generation::generator::ShotPrompt;

/// Minimum distinct visual categories a valid batch must span.
pub const MIN_DISTINCT_CATEGORIES: usize = 3;

/// Camera/framing vocabulary. A prompt must contain at least one of these
/// (case-insensitive substring) to count as cinematically specified.
const CAMERA_TERMS: &[&str] = &[
    "drone shot",
    "aerial",
    "close-up",
    "closeup",
    "slow-motion",
    "slow motion",
    "handheld",
    "dolly",
    "dolly zoom",
    "tracking shot",
    "crane shot",
    "wide shot",
    "wide-angle",
    "macro",
    "shallow depth of field",
    "rack focus",
    "time-lapse",
    "timelapse",
    "pan across",
    "tilt up",
    "tilt down",
    "zoom in",
    "zoom out",
    "overhead",
    "bird's eye",
    "low angle",
    "high angle",
    "pov",
    "point of view",
    "steadicam",
    "static shot",
    "over-the-shoulder",
];

/// The fixed set of visual categories prompts are classified into.
/// `Metaphor` doubles as the fallback when no keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualCategory {
    Lifestyle,
    Product,
    Emotional,
    Environment,
    ThreeD,
    Metaphor,
}

const LIFESTYLE_KEYWORDS: &[&str] = &[
    "lifestyle", "family", "friends", "morning", "coffee", "jogging", "walking", "home",
    "kitchen", "office worker", "commut", "couple", "breakfast", "workout",
];
const PRODUCT_KEYWORDS: &[&str] = &[
    "product", "packaging", "bottle", "label", "unboxing", "device", "screen", "interface",
    "logo", "table display", "showcase",
];
const EMOTIONAL_KEYWORDS: &[&str] = &[
    "face", "smile", "smiling", "tears", "crying", "laughing", "relief", "frustrat", "joy",
    "eyes", "expression", "reaction", "embrace", "sigh",
];
const ENVIRONMENT_KEYWORDS: &[&str] = &[
    "city", "skyline", "street", "forest", "ocean", "mountain", "landscape", "sunset",
    "sunrise", "interior", "warehouse", "factory", "nature", "rooftop", "rain",
];
const THREE_D_KEYWORDS: &[&str] = &[
    "3d", "render", "animation", "animated", "visualization", "graph", "chart", "particle",
    "wireframe", "hologram", "motion graphic",
];
const METAPHOR_KEYWORDS: &[&str] = &[
    "metaphor", "symboli", "abstract", "represent", "hourglass", "maze", "chess", "domino",
    "scale", "ladder", "door opening",
];

/// Why a batch was rejected. Variants carry enough state for the terminal
/// failure message to describe the last attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("expected exactly {expected} prompts, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("prompt {index} is missing a required field (prompt and scriptReference must both be non-empty)")]
    MissingField { index: usize },

    #[error("prompt {index} contains no recognized camera language: {text:?}")]
    NoCameraLanguage { index: usize, text: String },

    #[error("batch spans only {distinct} visual categories (minimum {MIN_DISTINCT_CATEGORIES})")]
    LowCategoryDiversity { distinct: usize },
}

impl ValidationFailure {
    /// Count observed on the rejected attempt, for terminal failure reporting.
    pub fn observed_count(&self, batch_len: usize) -> usize {
        match self {
            ValidationFailure::WrongCount { actual, .. } => *actual,
            _ => batch_len,
        }
    }
}

/// Returns true if the prompt text contains at least one camera term.
pub fn has_camera_language(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    CAMERA_TERMS.iter().any(|term| lower.contains(term))
}

/// Classifies a prompt into its visual category by keyword presence.
/// First match wins in a fixed precedence order; no match falls back to
/// `Metaphor`, mirroring how unclassifiable shots are briefed in practice.
pub fn classify_visual_category(prompt: &str) -> VisualCategory {
    let lower = prompt.to_lowercase();
    let groups: &[(&[&str], VisualCategory)] = &[
        (LIFESTYLE_KEYWORDS, VisualCategory::Lifestyle),
        (PRODUCT_KEYWORDS, VisualCategory::Product),
        (EMOTIONAL_KEYWORDS, VisualCategory::Emotional),
        (ENVIRONMENT_KEYWORDS, VisualCategory::Environment),
        (THREE_D_KEYWORDS, VisualCategory::ThreeD),
        (METAPHOR_KEYWORDS, VisualCategory::Metaphor),
    ];
    for (keywords, category) in groups {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    VisualCategory::Metaphor
}

/// Validates a full batch against the acceptance criteria.
///
/// Structural rules (count, non-empty fields) always run. Camera-language
/// and category-diversity rules run only when `strict` is set.
pub fn validate_batch(
    prompts: &[ShotPrompt],
    expected_count: usize,
    strict: bool,
) -> Result<(), ValidationFailure> {
    if prompts.len() != expected_count {
        return Err(ValidationFailure::WrongCount {
            expected: expected_count,
            actual: prompts.len(),
        });
    }

    for (index, shot) in prompts.iter().enumerate() {
        if shot.prompt.trim().is_empty() || shot.script_reference.trim().is_empty() {
            return Err(ValidationFailure::MissingField { index });
        }
    }

    if !strict {
        return Ok(());
    }

    for (index, shot) in prompts.iter().enumerate() {
        if !has_camera_language(&shot.prompt) {
            return Err(ValidationFailure::NoCameraLanguage {
                index,
                text: shot.prompt.chars().take(80).collect(),
            });
        }
    }

    let distinct: std::collections::HashSet<VisualCategory> = prompts
        .iter()
        .map(|s| classify_visual_category(&s.prompt))
        .collect();

    if distinct.len() < MIN_DISTINCT_CATEGORIES {
        return Err(ValidationFailure::LowCategoryDiversity {
            distinct: distinct.len(),
        });
    }

    Ok(())
}
