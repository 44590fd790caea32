//! Small text helpers shared by the dataset and chat crates.
//!
//! City names are matched case-insensitively by substring, never by exact key.

/// Case-insensitive substring test: does `haystack` contain `needle`?
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive test: does `text` contain any of `keywords`?
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
}

/// Return the first candidate, in the given order, that occurs inside `text`.
///
/// No ranking by match length or position: insertion order decides.
pub fn first_mentioned<'a>(text: &str, candidates: &'a [String]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    candidates
        .iter()
        .find(|c| !c.is_empty() && lower.contains(&c.to_lowercase()))
        .map(String::as_str)
}

/// Title-case a string: the first letter of every alphabetic run is
/// uppercased and the rest lowercased ("DKI jakarta" -> "Dki Jakarta").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}
