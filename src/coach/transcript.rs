//! Append-only conversation log

/// Running record of every turn in a session.
///
/// Entries are only ever appended; reads hand back a bounded suffix so
/// prompts keep the most recent turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: &str) {
        self.text.push_str(entry);
    }

    /// Last `max_chars` characters of the log (Unicode-safe).
    pub fn read(&self, max_chars: usize) -> &str {
        tail_chars(&self.text, max_chars)
    }

    pub fn full(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Keep the trailing `max_chars` characters of `s`
pub(crate) fn tail_chars(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let skip = count - max_chars;
    let byte_idx = s
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[byte_idx..]
}
