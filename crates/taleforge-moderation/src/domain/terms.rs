//! Term lists, already in normalised form.

pub(crate) const PROFANITY: &[&str] = &[
    "fuck", "shit", "damn", "hell", "ass", "bitch", "bastard", "crap", "piss", "dick", "cock",
    "pussy", "cunt", "fuk", "shyt", "fck", "sht", "dmn",
];

pub(crate) const SEVERE_PROFANITY: &[&str] = &["fuck", "cunt", "shit"];

pub(crate) const VIOLENCE: &[&str] = &[
    "gore",
    "dismember",
    "disembowel",
    "eviscerate",
    "mutilate",
    "torture",
    "massacre",
    "slaughter",
    "butcher",
    "carnage",
    "blood bath",
    "bloodbath",
    "decapitate",
    "behead",
];

pub(crate) const SEXUAL: &[&str] = &[
    "sex",
    "sexual",
    "porn",
    "pornography",
    "nude",
    "naked",
    "rape",
    "molest",
    "seduce",
    "erotic",
    "fetish",
];

pub(crate) const HATE_SPEECH: &[&str] = &[
    "nigger", "nigga", "chink", "spic", "kike", "wetback", "faggot", "tranny", "retard",
    "retarded",
];

/// Lowercases, drops everything but ASCII alphanumerics and whitespace, and
/// collapses whitespace runs into single spaces.
pub(crate) fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `term` occurs in normalised `text` on word boundaries.
pub(crate) fn contains_phrase(normalized: &str, term: &str) -> bool {
    let padded = format!(" {normalized} ");
    padded.contains(&format!(" {term} "))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// Replaces whole-word, case-insensitive occurrences of `term` in `text`.
pub(crate) fn redact_word(text: &str, term: &str, marker: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut search_from = 0;

    while let Some(offset) = lower[search_from..].find(term) {
        let start = search_from + offset;
        let end = start + term.len();
        let bounded_left = start == 0 || !is_word_byte(bytes[start - 1]);
        let bounded_right = end == bytes.len() || !is_word_byte(bytes[end]);
        if bounded_left && bounded_right {
            out.push_str(&text[cursor..start]);
            out.push_str(marker);
            cursor = end;
        }
        search_from = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Replaces every case-insensitive occurrence of `term` in `text`, including
/// occurrences inside longer words.
pub(crate) fn redact_substring(text: &str, term: &str, marker: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(offset) = lower[cursor..].find(term) {
        let start = cursor + offset;
        out.push_str(&text[cursor..start]);
        out.push_str(marker);
        cursor = start + term.len();
    }
    out.push_str(&text[cursor..]);
    out
}
