/// Decoding parameters selected per task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenProfile {
    /// Full assessment with transcription and hint ladder
    Assessment,
    /// Re-prompt asking only for the `[HINTS]` block
    FallbackHints,
    /// Free-form answer to a student question
    Answer,
}

/// Shared sampling settings: deterministic-leaning, not greedy
const TEMPERATURE: f32 = 0.2;
const TOP_P: f32 = 0.9;

impl GenProfile {
    pub fn max_tokens(&self) -> u32 {
        match self {
            GenProfile::Assessment => 600,
            GenProfile::FallbackHints => 200,
            GenProfile::Answer => 400,
        }
    }

    pub fn temperature(&self) -> f32 {
        TEMPERATURE
    }

    pub fn top_p(&self) -> f32 {
        TOP_P
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenProfile::Assessment => "assessment",
            GenProfile::FallbackHints => "fallback_hints",
            GenProfile::Answer => "answer",
        }
    }
}
