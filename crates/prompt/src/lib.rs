//! # Prompt
//!
//! Text hygiene for everything that ends up inside a generation prompt.
//!
//! - [`sanitize`] transforms raw user text so it cannot forge prompt structure.
//! - [`validate`] is a fast pre-check that rejects input outright.
//! - [`truncate_chars`] shortens text on character boundaries for snippet display.
//!
//! Sanitization transforms; validation rejects. Both are pure.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum accepted input length, in characters.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Inputs with more non-whitespace control characters than this fail [`validate`].
pub const MAX_CONTROL_CHARS: usize = 5;

/// Appended by [`truncate_chars`] when text was shortened.
pub const ELLIPSIS: &str = "...";

fn role_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(user|system|assistant)\s*:").expect("role marker regex is valid")
    })
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank line regex is valid"))
}

/// Neutralizes prompt-injection structure in raw user text.
///
/// 1. Drops control characters other than `\n` and `\t` (NUL, ESC, DEL, ...); `\r\n` becomes `\n`.
/// 2. Wraps role markers (`User:`, `system :`, `ASSISTANT:`) as `[User]:` so they keep their
///    wording but no longer read as a turn boundary. Markers glued to a preceding word are
///    wrapped too (`SuperUser:` becomes `Super[User]:`).
/// 3. Collapses runs of three or more newlines to two.
/// 4. Trims, then truncates to [`MAX_INPUT_CHARS`] characters.
pub fn sanitize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let stripped: String = normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let bracketed = role_marker_re().replace_all(&stripped, "[$1]:");
    let collapsed = blank_lines_re().replace_all(&bracketed, "\n\n");
    let trimmed = collapsed.trim();

    match trimmed.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => trimmed[..byte_idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Returns false for input that should never reach a backend: empty (after trim), longer than
/// [`MAX_INPUT_CHARS`] characters, or carrying more than [`MAX_CONTROL_CHARS`] control
/// characters that are not whitespace.
pub fn validate(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    if text.chars().count() > MAX_INPUT_CHARS {
        return false;
    }
    let control = text
        .chars()
        .filter(|c| c.is_control() && !c.is_whitespace())
        .count();
    control <= MAX_CONTROL_CHARS
}

/// Truncates `text` to at most `max_chars` characters, appending [`ELLIPSIS`] when anything was cut.
///
/// Never splits a multi-byte character; output is at most `max_chars + ELLIPSIS.len()` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}
