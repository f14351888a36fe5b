//! Lightweight language hint for the system prompt.
//!
//! Non-Latin scripts are decided by character counts; Latin-script text by a stop-word vote.
//! Anything undecided is treated as English.

const ENGLISH: &[&str] = &[
    "the", "is", "are", "what", "how", "does", "do", "and", "of", "to", "in", "it", "this", "that",
    "with", "for", "my", "you", "can", "why", "where",
];
const SPANISH: &[&str] = &[
    "el", "los", "las", "que", "qué", "cómo", "por", "para", "una", "con", "del", "está", "hola",
    "pero", "porque", "funciona", "sistema", "es", "mi",
];
const FRENCH: &[&str] = &[
    "le", "les", "est", "une", "des", "comment", "pourquoi", "avec", "pour", "dans", "je", "ne",
    "pas", "mon", "c'est", "fonctionne", "bonjour", "qu'est-ce",
];
const GERMAN: &[&str] = &[
    "der", "die", "das", "und", "ist", "nicht", "wie", "warum", "mit", "für", "ich", "ein", "eine",
    "funktioniert", "hallo", "mein",
];
const PORTUGUESE: &[&str] = &[
    "não", "você", "é", "os", "uma", "com", "meu", "olá", "isso", "funciona", "sistema", "como",
    "o", "está",
];

/// Minimum stop-word hits before a Latin-script language other than English is chosen.
const MIN_VOTES: usize = 2;

#[derive(Default)]
struct ScriptCounts {
    latin: usize,
    cyrillic: usize,
    han: usize,
    kana: usize,
    hangul: usize,
    arabic: usize,
    greek: usize,
    hebrew: usize,
    thai: usize,
    devanagari: usize,
}

fn count_scripts(text: &str) -> ScriptCounts {
    let mut counts = ScriptCounts::default();
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        match c as u32 {
            0x0041..=0x024F => counts.latin += 1,
            0x0370..=0x03FF => counts.greek += 1,
            0x0400..=0x04FF => counts.cyrillic += 1,
            0x0590..=0x05FF => counts.hebrew += 1,
            0x0600..=0x06FF => counts.arabic += 1,
            0x0900..=0x097F => counts.devanagari += 1,
            0x0E00..=0x0E7F => counts.thai += 1,
            0x3040..=0x30FF => counts.kana += 1,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => counts.han += 1,
            0xAC00..=0xD7AF | 0x1100..=0x11FF => counts.hangul += 1,
            _ => {}
        }
    }
    counts
}

fn latin_vote(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();
    let score = |list: &[&str]| words.iter().filter(|w| list.contains(w)).count();

    let english = score(ENGLISH);
    let mut best: Option<(&'static str, usize)> = None;
    let mut tied = false;
    for (name, list) in [
        ("Spanish", SPANISH),
        ("French", FRENCH),
        ("German", GERMAN),
        ("Portuguese", PORTUGUESE),
    ] {
        let s = score(list);
        match best {
            Some((_, b)) if s == b => tied = true,
            Some((_, b)) if s < b => {}
            _ => {
                best = Some((name, s));
                tied = false;
            }
        }
    }
    match best {
        Some((name, s)) if !tied && s >= MIN_VOTES && s > english => Some(name),
        _ => None,
    }
}

/// Best-guess language name for `text`; `None` means English or undetermined.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let c = count_scripts(text);
    let scripts = [
        (c.kana, "Japanese"),
        (c.hangul, "Korean"),
        (c.han, "Chinese"),
        (c.cyrillic, "Russian"),
        (c.arabic, "Arabic"),
        (c.greek, "Greek"),
        (c.hebrew, "Hebrew"),
        (c.thai, "Thai"),
        (c.devanagari, "Hindi"),
    ];
    let non_latin: usize = scripts.iter().map(|(n, _)| n).sum();
    if non_latin > c.latin {
        // Kana anywhere means Japanese even when kanji dominate.
        if c.kana > 0 {
            return Some("Japanese");
        }
        return scripts
            .iter()
            .filter(|(n, _)| *n > 0)
            .max_by_key(|(n, _)| *n)
            .map(|(_, name)| *name);
    }
    latin_vote(text)
}

/// Suffix appended to the system prompt for a detected non-English language.
pub fn language_instruction(language: &str) -> String {
    format!("\n\nThe user wrote in {language}. Respond in {language}.")
}
