//! Candidate place-name extraction from raw question text.
//!
//! A candidate phrase is a maximal run of whitespace tokens that each start
//! with a capital letter of the configured alphabet. Every other token acts
//! as a separator and is dropped.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::services::normalize::{decompose, normalize};
use crate::services::stemmer::{stem_key, Stemmer};

/// Capital letters of the Greek alphabet.
pub const GREEK_CAPITALS: &str = "ΑΒΓΔΕΖΗΘΙΚΛΜΝΞΟΠΡΣΤΥΦΧΨΩ";

/// Characters trimmed from both ends of a text before decomposition.
const TRIMMED: [char; 3] = [' ', '«', '»'];

/// The set of letters that open a candidate token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapitalAlphabet {
    letters: HashSet<char>,
}

impl CapitalAlphabet {
    pub fn new(letters: &str) -> Self {
        Self {
            letters: letters.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    pub fn greek() -> Self {
        Self::new(GREEK_CAPITALS)
    }

    /// Whether the token's first character is one of the capitals.
    pub fn starts_capitalized(&self, token: &str) -> bool {
        token
            .chars()
            .next()
            .is_some_and(|first| self.letters.contains(&first))
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl Default for CapitalAlphabet {
    fn default() -> Self {
        Self::greek()
    }
}

/// Trim guillemets and spaces from the ends, then decompose.
pub fn prepare_text(text: &str) -> String {
    decompose(text.trim_matches(&TRIMMED[..]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InRun,
    NotInRun,
}

/// Split decomposed text into maximal runs of capitalized tokens.
pub fn candidate_phrases(decomposed: &str, alphabet: &CapitalAlphabet) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut state = ScanState::NotInRun;

    for token in decomposed.split_whitespace() {
        let capitalized = alphabet.starts_capitalized(token);
        state = match (state, capitalized) {
            (_, true) => {
                run.push(token);
                ScanState::InRun
            }
            (ScanState::InRun, false) => {
                phrases.push(run.join(" "));
                run.clear();
                ScanState::NotInRun
            }
            (ScanState::NotInRun, false) => ScanState::NotInRun,
        };
    }

    if state == ScanState::InRun {
        phrases.push(run.join(" "));
    }

    phrases
}

/// Turns document text into the distinct stem keys of its candidate phrases.
#[derive(Clone)]
pub struct MentionExtractor {
    alphabet: CapitalAlphabet,
    stemmer: Arc<dyn Stemmer>,
}

impl MentionExtractor {
    pub fn new(alphabet: CapitalAlphabet, stemmer: Arc<dyn Stemmer>) -> Self {
        Self { alphabet, stemmer }
    }

    pub fn alphabet(&self) -> &CapitalAlphabet {
        &self.alphabet
    }

    pub fn stemmer(&self) -> &dyn Stemmer {
        self.stemmer.as_ref()
    }

    /// Stem key of a phrase, computed exactly as for gazetteer names.
    pub fn phrase_key(&self, phrase: &str) -> String {
        stem_key(self.stemmer.as_ref(), &normalize(phrase))
    }

    /// Distinct, non-empty stem keys of all candidate phrases in `decomposed`.
    pub fn candidate_keys(&self, decomposed: &str) -> BTreeSet<String> {
        candidate_phrases(decomposed, &self.alphabet)
            .iter()
            .map(|phrase| self.phrase_key(phrase))
            .filter(|key| !key.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for MentionExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionExtractor")
            .field("alphabet", &self.alphabet.len())
            .field("stemmer", &self.stemmer.stemmer_id())
            .finish()
    }
}
