// Prompt constants for b-roll generation.

/// Stop sequences passed to the inference call. The model sometimes follows
/// the array with commentary or a fresh markdown section; cutting at these
/// keeps the output close to bare JSON.
pub const STOP_SEQUENCES: &[&str] = &["\n\n**", "\n\nNote:"];

/// Instruction payload template. Replace `{prompt_count}` and `{script}`
/// before sending. Single user-role message — the whole contract lives here.
const BROLL_PROMPT_TEMPLATE: &str = r#"**TASK**
You will receive a mini VSL script. Generate {prompt_count} visually stunning, cinematic-quality b-roll prompts designed to enhance emotional and persuasive impact in a Video Sales Letter, that tightly correspond to lines in the script.

**CONSTRAINTS**
- Return a strict JSON array of exactly {prompt_count} objects, in order 1-{prompt_count}. Each object has exactly two properties:

"prompt": A short description of a b-roll shot.

"scriptReference": The exact line of the script that inspired the shot.
- Each shot must work as a standalone 5-second video clip.
- Every prompt MUST use camera language: (e.g., "drone shot", "slow-motion close-up", "handheld interior", "dolly zoom", "shallow depth of field").
- Vary the visuals across lifestyle, product, emotional reaction, environment, 3D visualizations, and metaphor — cover at least three of these categories.
- Ensure direct visual or metaphorical alignment to the script line.
- Do not wrap the JSON in markdown.
- Do not include any text before or after the JSON array.

**SCRIPT**: {script}"#;

/// Builds the full instruction payload for a script.
pub fn build_broll_prompt(script: &str, prompt_count: usize) -> String {
    BROLL_PROMPT_TEMPLATE
        .replace("{prompt_count}", &prompt_count.to_string())
        .replace("{script}", script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_script_and_count() {
        let prompt = build_broll_prompt("Line one.\nLine two.", 10);
        assert!(prompt.contains("Line one.\nLine two."));
        assert!(prompt.contains("exactly 10 objects"));
        assert!(prompt.contains("order 1-10"));
        assert!(!prompt.contains("{prompt_count}"));
        assert!(!prompt.contains("{script}"));
    }

    #[test]
    fn test_prompt_demands_bare_json() {
        let prompt = build_broll_prompt("x", 5);
        assert!(prompt.contains("Do not wrap the JSON in markdown"));
        assert!(prompt.contains("scriptReference"));
    }
}
