//! Response guard — the last line of defense before text reaches a user.
//!
//! The generation model is not trustworthy to self-report "I don't know"
//! consistently, so the guard applies cheap string heuristics on top of the
//! prompt's rules. These are heuristics, not proof of grounding: a fluent
//! hallucination that avoids every marker still passes. Known limitation.

use vademecum_core::reply::{CANONICAL_REFUSAL, Reply};

use crate::prompt::ASSISTANT_MARKER;

/// Minimum length (in chars, after trimming) for a plausible answer.
const MIN_ANSWER_CHARS: usize = 3;

/// Lowercase markers that signal the model could not ground an answer.
const LOW_CONFIDENCE_MARKERS: &[&str] = &["não sei", "desculpe", "i don't know", "sorry"];

/// Validate raw generator output into a terminal state.
///
/// Refuses when the cleaned output is empty, implausibly short, or carries
/// the refusal phrase or a low-confidence marker; otherwise answers with
/// the trimmed text.
pub fn evaluate(raw: &str) -> Reply {
    let content = strip_prompt_echo(raw).trim();

    if content.chars().count() < MIN_ANSWER_CHARS {
        return Reply::Refused;
    }

    let lowered = content.to_lowercase();
    if lowered.contains(&CANONICAL_REFUSAL.to_lowercase()) {
        return Reply::Refused;
    }
    if LOW_CONFIDENCE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Reply::Refused;
    }

    Reply::Answered(content.to_string())
}

/// Keep only what follows the last assistant marker.
///
/// Endpoints configured with `return_full_text` echo the whole prompt back;
/// the answer is everything after the final `<|assistant|>` turn.
fn strip_prompt_echo(raw: &str) -> &str {
    match raw.rfind(ASSISTANT_MARKER) {
        Some(pos) => &raw[pos + ASSISTANT_MARKER.len()..],
        None => raw,
    }
}
