//! Canonical text forms used for matching.
//!
//! Two forms exist. [`decompose`] only applies Unicode canonical
//! decomposition (NFD) and keeps diacritics and case; it is the form used for
//! literal substring matching. [`normalize`] goes further and strips
//! nonspacing marks and punctuation before uppercasing; it feeds stem keys.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static MARKS_AND_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Mn}\p{P}]+").expect("mark/punctuation pattern should compile")
});

/// Unicode canonical decomposition only.
pub fn decompose(text: &str) -> String {
    text.nfd().collect()
}

/// Decompose, drop nonspacing marks and punctuation, uppercase.
///
/// Idempotent. Uppercasing can produce precomposed characters again
/// (`ΐ` → `Ϊ́`), so the strip runs a second time on the uppercased form.
pub fn normalize(text: &str) -> String {
    let stripped = strip_marks_and_punctuation(&decompose(text));
    strip_marks_and_punctuation(&decompose(&stripped.to_uppercase()))
}

fn strip_marks_and_punctuation(text: &str) -> String {
    MARKS_AND_PUNCTUATION.replace_all(text, "").into_owned()
}
