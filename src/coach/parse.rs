//! Hint extraction from free-form model output
//!
//! The model is asked for a `[HINTS]` block of numbered items, but it does not
//! always comply. Rather than look for the block, every line of the response is
//! matched against a small line grammar:
//!
//! - **numbered item**: optional bullet (`-`, `*`, `•`), optional `(`, a run of
//!   digits, optional `)` or `.`, then the content. Only indices `1`, `2`, `3`
//!   yield a hint; any other index is skipped without ending the scan.
//! - **labeled hint**: `hint` (any case) followed by `:` or `-`, then the content.
//!
//! Hints keep the order they appear in the text, not the order of their indices.

/// Maximum number of hints on the ladder
pub const MAX_HINTS: usize = 3;

const BULLETS: [char; 3] = ['-', '*', '•'];
const CLOSERS: [char; 2] = [')', '.'];
/// Every line boundary the model might emit, not only `\n` and `\r\n`
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// What a single non-blank line matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineMatch<'a> {
    Item { index: &'a str, content: &'a str },
    Labeled(&'a str),
    Unmatched,
}

/// Extract up to three hints, in scan order.
pub fn parse_hints(text: &str) -> Vec<String> {
    let mut hints = Vec::with_capacity(MAX_HINTS);

    for line in text.split(LINE_BREAKS) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match classify(line) {
            LineMatch::Item { index, content } if is_ladder_index(index) => {
                hints.push(content.to_string());
            }
            LineMatch::Labeled(content) => hints.push(content.to_string()),
            _ => {}
        }

        if hints.len() >= MAX_HINTS {
            break;
        }
    }

    hints
}

/// Numbered items take priority; the labeled rule is only tried when a line
/// is not a numbered item at all.
fn classify(line: &str) -> LineMatch<'_> {
    if let Some((index, content)) = numbered_item(line) {
        return LineMatch::Item { index, content };
    }
    match labeled_hint(line) {
        Some(content) => LineMatch::Labeled(content),
        None => LineMatch::Unmatched,
    }
}

fn numbered_item(line: &str) -> Option<(&str, &str)> {
    let rest = match line.strip_prefix(BULLETS) {
        Some(after_bullet) => after_bullet.trim_start(),
        None => line,
    };
    let rest = rest.strip_prefix('(').unwrap_or(rest).trim_start();

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let (index, after) = rest.split_at(digits_end);

    let after = after.trim_start();
    let content = after.strip_prefix(CLOSERS).unwrap_or(after).trim();
    // A bare index such as `1)` or `12` carries no hint; the closer or a
    // trailing digit is never promoted to content.
    if content.is_empty() {
        return None;
    }
    Some((index, content))
}

fn labeled_hint(line: &str) -> Option<&str> {
    let label = line.get(..4)?;
    if !label.eq_ignore_ascii_case("hint") {
        return None;
    }
    let content = line[4..].trim_start().strip_prefix([':', '-'])?.trim();
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

fn is_ladder_index(index: &str) -> bool {
    matches!(index, "1" | "2" | "3")
}
