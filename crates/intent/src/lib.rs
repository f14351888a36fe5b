//! # Intent
//!
//! Pure, deterministic mapping from user text to an [`Intent`]. Decides whether retrieval runs
//! and which response mode answers.
//!
//! Checks run in a fixed priority order and the first match wins:
//!
//! 1. exact greeting/filler phrase → Conversational
//! 2. at most two words and no knowledge keyword → Conversational
//! 3. account keyword → AccountHelp
//! 4. identity keyword → Identity
//! 5. navigation keyword → Navigation
//! 6. knowledge keyword → Knowledge
//! 7. conversational pattern (substring) → Conversational
//! 8. looks like a question → Knowledge
//! 9. otherwise → Conversational
//!
//! Narrow categories are checked before the broad knowledge bucket. A query that hits several
//! lists resolves to whichever list is checked first; that order is a fixed tie-break, not a ranking.

pub use modbot_core::Intent;

/// Phrases that are conversational when they are the whole message (after trailing punctuation is stripped).
pub const GREETINGS: &[&str] = &[
    "hi",
    "hii",
    "hello",
    "hey",
    "hey there",
    "hello there",
    "yo",
    "sup",
    "test",
    "testing",
    "ping",
    "thanks",
    "thank you",
    "thx",
    "ty",
    "ok",
    "okay",
    "cool",
    "nice",
    "lol",
    "gm",
    "gn",
    "good morning",
    "good night",
    "good evening",
    "what is this",
    "what's this",
    "whats this",
    "help",
];

/// Account linking and verification vocabulary.
pub const ACCOUNT_KEYWORDS: &[&str] = &[
    "link",
    "verify",
    "verification",
    "connect",
    "account",
    "steam id",
    "steamid",
    "sync my role",
    "role sync",
];

/// Questions about the bot itself or where the user is.
pub const IDENTITY_KEYWORDS: &[&str] = &[
    "where am i",
    "who are you",
    "what are you",
    "who made you",
    "who created you",
    "your name",
    "are you a bot",
    "are you an ai",
    "what server is this",
    "which server",
    "what is this server",
];

/// Channel references and "where do I post" phrasing.
pub const NAVIGATION_KEYWORDS: &[&str] = &[
    "channel",
    "#general",
    "#support",
    "#bug-reports",
    "#suggestions",
    "#announcements",
    "#rules",
    "#faq",
    "where do i post",
    "where should i post",
    "where can i post",
    "where to post",
    "where do i report",
    "where can i report",
    "where do i ask",
];

/// Mod and technical vocabulary plus explanatory question stems.
pub const KNOWLEDGE_KEYWORDS: &[&str] = &[
    "mod",
    "metabolism",
    "calorie",
    "nutrition",
    "hunger",
    "thirst",
    "weight",
    "fatigue",
    "stamina",
    "exercise",
    "vitamin",
    "protein",
    "trait",
    "skill",
    "recipe",
    "craft",
    "item",
    "sandbox",
    "setting",
    "config",
    "install",
    "update",
    "version",
    "compatib",
    "multiplayer",
    "bug",
    "crash",
    "feature",
    "mechanic",
    "system",
    "moodle",
    "how does",
    "how do",
    "how to",
    "how can",
    "explain",
    "what does",
    "why does",
    "why is",
    "why do",
    "difference between",
];

/// Loose small-talk patterns, matched as substrings after the keyword categories.
pub const CONVERSATIONAL_PATTERNS: &[&str] = &[
    "how are you",
    "how's it going",
    "what's up",
    "whats up",
    "good morning",
    "good evening",
    "good night",
    "thank",
    "haha",
    "lol",
    "awesome",
    "see you",
    "bye",
];

/// First words that mark a question even without a `?`.
pub const QUESTION_WORDS: &[&str] = &[
    "what", "what's", "whats", "how", "why", "when", "where", "who", "which", "can", "could",
    "does", "do", "is", "are", "should", "would", "will",
];

/// Lowercases and trims.
#[inline]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Drops trailing punctuation and whitespace, for exact phrase comparison.
#[inline]
pub fn strip_trailing_punctuation(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
}

#[inline]
fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// True when `normalized` contains a `?` or starts with a question word.
pub fn looks_like_question(normalized: &str) -> bool {
    if normalized.contains('?') {
        return true;
    }
    normalized
        .split_whitespace()
        .next()
        .map(|first| QUESTION_WORDS.contains(&first))
        .unwrap_or(false)
}

/// Classifies `text`. Same input always yields the same intent.
pub fn classify(text: &str) -> Intent {
    let normalized = normalize(text);
    let bare = strip_trailing_punctuation(&normalized);

    if GREETINGS.contains(&bare) {
        return Intent::Conversational;
    }

    let has_knowledge = contains_any(&normalized, KNOWLEDGE_KEYWORDS);
    if normalized.split_whitespace().count() <= 2 && !has_knowledge {
        return Intent::Conversational;
    }

    if contains_any(&normalized, ACCOUNT_KEYWORDS) {
        return Intent::AccountHelp;
    }
    if contains_any(&normalized, IDENTITY_KEYWORDS) {
        return Intent::Identity;
    }
    if contains_any(&normalized, NAVIGATION_KEYWORDS) {
        return Intent::Navigation;
    }
    if has_knowledge {
        return Intent::Knowledge;
    }
    if contains_any(&normalized, CONVERSATIONAL_PATTERNS) {
        return Intent::Conversational;
    }
    if looks_like_question(&normalized) {
        return Intent::Knowledge;
    }
    Intent::Conversational
}
