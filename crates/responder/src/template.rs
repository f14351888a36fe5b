//! Prompt template and response echo cleanup.

use modbot_core::ResponseMode;
use prompt::truncate_chars;

/// Each retrieved snippet is cut to this many characters (plus an ellipsis) in the prompt.
pub const SNIPPET_MAX_CHARS: usize = 500;

/// Separates the numbered documentation block from the conversation turn.
pub const CONTEXT_SEPARATOR: &str = "---";

/// Turn markers that mean the model started writing the next turn itself. Checked in order; the
/// earliest position of any of them wins.
pub const ECHO_MARKERS: &[&str] = &["\n\nUser:", "\nUser:", "\n\nAssistant:", "\nAssistant:"];

/// Builds the generation prompt. Only [`ResponseMode::Deep`] includes the snippets, as a numbered
/// list (`[1] ...`) followed by [`CONTEXT_SEPARATOR`]. Always ends with `User: <message>\nAssistant:`.
pub fn build_prompt(mode: ResponseMode, message: &str, snippets: &[String]) -> String {
    let mut prompt = String::new();
    if mode == ResponseMode::Deep && !snippets.is_empty() {
        prompt.push_str("Relevant documentation:\n");
        for (i, snippet) in snippets.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", i + 1, truncate_chars(snippet.trim(), SNIPPET_MAX_CHARS)));
        }
        prompt.push('\n');
        prompt.push_str(CONTEXT_SEPARATOR);
        prompt.push_str("\n\n");
    }
    prompt.push_str("User: ");
    prompt.push_str(message);
    prompt.push_str("\nAssistant:");
    prompt
}

/// Cuts the raw model output at the first echoed turn marker, then trims.
pub fn clean_response(raw: &str) -> String {
    let cut = ECHO_MARKERS
        .iter()
        .filter_map(|marker| raw.find(marker))
        .min()
        .unwrap_or(raw.len());
    raw[..cut].trim().to_string()
}
