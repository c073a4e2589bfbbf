//! Level pointer over the current hints

use super::parse::MAX_HINTS;

/// Deepest level a student can escalate to
pub const MAX_LEVEL: usize = 3;

/// Shown when the assessment produced no hints
pub const NO_HINT_MESSAGE: &str =
    "No hint available yet. Try to generalize your condition and check the loop boundaries.";

/// One-shot reply to an escalation past the last level
pub const EXHAUSTED_MESSAGE: &str =
    "If you are curious about more information, please ask questions.";

/// Hints ordered vague to specific, the level shown so far, and an optional
/// override that shadows the ladder until the next level change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintLadder {
    hints: Vec<String>,
    level: usize,
    hint_override: Option<String>,
}

impl Default for HintLadder {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl HintLadder {
    pub fn new(mut hints: Vec<String>) -> Self {
        hints.truncate(MAX_HINTS);
        Self {
            hints,
            level: 1,
            hint_override: None,
        }
    }

    /// Swap in the hints of a new assessment and start over at level 1
    pub fn replace(&mut self, hints: Vec<String>) {
        *self = Self::new(hints);
    }

    pub fn reset(&mut self) {
        self.level = 1;
        self.hint_override = None;
    }

    /// Move one level deeper and return the hint to show.
    ///
    /// At the last level the level stays put and the exhaustion message
    /// becomes the override.
    pub fn escalate(&mut self) -> String {
        if self.level < MAX_LEVEL {
            self.level += 1;
            self.hint_override = None;
            self.hint_at(self.level).to_string()
        } else {
            self.hint_override = Some(EXHAUSTED_MESSAGE.to_string());
            EXHAUSTED_MESSAGE.to_string()
        }
    }

    pub fn current(&self) -> &str {
        match &self.hint_override {
            Some(hint) => hint,
            None => self.hint_at(self.level),
        }
    }

    /// Ladder lookup at `level`, clamped to the hints available
    pub fn hint_at(&self, level: usize) -> &str {
        if self.hints.is_empty() {
            return NO_HINT_MESSAGE;
        }
        let idx = level.saturating_sub(1).min(self.hints.len() - 1);
        &self.hints[idx]
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn hint_override(&self) -> Option<&str> {
        self.hint_override.as_deref()
    }
}
