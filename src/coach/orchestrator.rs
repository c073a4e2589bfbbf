//! Two-phase assessment: assess and hint, then re-prompt for hints if none parsed

use super::error::InferenceError;
use super::gateway::InferenceGateway;
use super::image::CodeImage;
use super::models::GenProfile;
use super::parse::parse_hints;
use super::prompts::{
    build_assessment_prompt, build_fallback_hint_prompt, build_qa_prompt, StudentCode,
    ASSESSMENT_MARKER, HINTS_MARKER,
};
use tracing::{debug, info, warn};

/// Inputs for one assessment round-trip
#[derive(Debug, Clone, Copy)]
pub struct AssessmentRequest<'a> {
    pub problem: &'a str,
    pub image: &'a CodeImage,
    /// Already truncated to the prompt window
    pub history: &'a str,
    /// Typed revision; `None` assesses the image alone
    pub revised_code: Option<&'a str>,
}

/// Raw model output plus the hints extracted from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    /// Full first-pass output, including any `[HINTS]` section
    pub raw: String,
    pub hints: Vec<String>,
    /// Whether the hints came from the fallback re-prompt
    pub used_fallback: bool,
}

impl Assessment {
    pub fn body(&self) -> &str {
        assessment_body(&self.raw)
    }
}

/// Assess the student's code and build the hint ladder.
///
/// If the first pass yields no hints, exactly one fallback call is made with
/// the raw first-pass output as its only context. An empty result after that
/// is a valid outcome, not an error. Gateway failures propagate unchanged.
pub async fn assess_and_hint<G>(
    gateway: &G,
    request: AssessmentRequest<'_>,
) -> Result<Assessment, InferenceError>
where
    G: InferenceGateway + ?Sized,
{
    let code = match request.revised_code {
        Some(text) => StudentCode::Text(text),
        None => StudentCode::Image,
    };
    let prompt = build_assessment_prompt(request.problem, request.history, code);
    debug!(
        prompt_chars = prompt.len(),
        text_mode = request.revised_code.is_some(),
        "requesting assessment"
    );

    let raw = gateway
        .generate(&prompt, request.image, GenProfile::Assessment)
        .await?;
    let mut hints = parse_hints(&raw);
    let mut used_fallback = false;

    if hints.is_empty() {
        warn!("no hints in assessment output, re-prompting for hints");
        used_fallback = true;
        let fallback_prompt = build_fallback_hint_prompt(&raw);
        let fallback_raw = gateway
            .generate(&fallback_prompt, request.image, GenProfile::FallbackHints)
            .await?;
        hints = parse_hints(&fallback_raw);
        if hints.is_empty() {
            warn!("fallback re-prompt produced no hints");
        }
    }

    info!(hints = hints.len(), used_fallback, "assessment complete");
    Ok(Assessment {
        raw,
        hints,
        used_fallback,
    })
}

/// Answer a free-form student question, grounded in history and the image
pub async fn answer_question<G>(
    gateway: &G,
    history: &str,
    question: &str,
    image: &CodeImage,
) -> Result<String, InferenceError>
where
    G: InferenceGateway + ?Sized,
{
    let prompt = build_qa_prompt(history, question);
    let answer = gateway.generate(&prompt, image, GenProfile::Answer).await?;
    Ok(answer.trim().to_string())
}

/// Text between the last `[ASSESSMENT]` marker and the next `[HINTS]` marker.
///
/// Without an `[ASSESSMENT]` marker the whole output is the body.
pub fn assessment_body(raw: &str) -> &str {
    match raw.rfind(ASSESSMENT_MARKER) {
        Some(pos) => {
            let after = &raw[pos + ASSESSMENT_MARKER.len()..];
            let body = match after.find(HINTS_MARKER) {
                Some(end) => &after[..end],
                None => after,
            };
            body.trim()
        }
        None => raw,
    }
}
