//! Reconciles document text against the gazetteer index.
//!
//! Two independent strategies run per document:
//! - stemmed: candidate phrase keys intersected with the index key set,
//!   emitting every record stored under a shared key;
//! - literal: every record whose canonical (decomposed) name occurs verbatim
//!   in the decomposed text.
//!
//! The result is the sorted, duplicate-free union of both.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Document, Mention};
use crate::services::extractor::{prepare_text, MentionExtractor};
use crate::services::gazetteer::GazetteerIndex;

/// Which strategies contribute to a document's mentions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Stemmed phrase keys only
    Stemmed,
    /// Literal substring only
    Literal,
    /// Union of both
    #[default]
    Both,
}

impl MatchStrategy {
    pub fn uses_stemmed(&self) -> bool {
        matches!(self, Self::Stemmed | Self::Both)
    }

    pub fn uses_literal(&self) -> bool {
        matches!(self, Self::Literal | Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stemmed => "stemmed",
            Self::Literal => "literal",
            Self::Both => "both",
        }
    }
}

/// Matches single documents against a borrowed index.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    index: &'a GazetteerIndex,
    extractor: &'a MentionExtractor,
    strategy: MatchStrategy,
}

impl<'a> Matcher<'a> {
    pub fn new(
        index: &'a GazetteerIndex,
        extractor: &'a MentionExtractor,
        strategy: MatchStrategy,
    ) -> Self {
        Self {
            index,
            extractor,
            strategy,
        }
    }

    /// Mentions found through candidate phrase keys.
    pub fn stemmed_matches(&self, document: &Document) -> Vec<Mention> {
        let decomposed = prepare_text(&document.text);
        let mut found = BTreeSet::new();
        self.collect_stemmed(&decomposed, document, &mut found);
        found.into_iter().collect()
    }

    /// Mentions found through verbatim canonical names.
    pub fn literal_matches(&self, document: &Document) -> Vec<Mention> {
        let decomposed = prepare_text(&document.text);
        let mut found = BTreeSet::new();
        self.collect_literal(&decomposed, document, &mut found);
        found.into_iter().collect()
    }

    /// Sorted union of the strategies enabled for this matcher.
    pub fn match_document(&self, document: &Document) -> Vec<Mention> {
        let decomposed = prepare_text(&document.text);
        let mut found = BTreeSet::new();

        if self.strategy.uses_stemmed() {
            self.collect_stemmed(&decomposed, document, &mut found);
        }
        if self.strategy.uses_literal() {
            self.collect_literal(&decomposed, document, &mut found);
        }

        found.into_iter().collect()
    }

    fn collect_stemmed(
        &self,
        decomposed: &str,
        document: &Document,
        found: &mut BTreeSet<Mention>,
    ) {
        for key in self.extractor.candidate_keys(decomposed) {
            if !self.index.contains_key(&key) {
                continue;
            }
            for record in self.index.get(&key) {
                found.insert(Mention::new(record.id, document.id.clone()));
            }
        }
    }

    fn collect_literal(
        &self,
        decomposed: &str,
        document: &Document,
        found: &mut BTreeSet<Mention>,
    ) {
        if decomposed.is_empty() {
            return;
        }
        for record in self.index.literal_records() {
            if decomposed.contains(&record.canonical_name) {
                found.insert(Mention::new(record.id, document.id.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::LocationRecord;
    use crate::services::extractor::CapitalAlphabet;
    use crate::services::stemmer::{IdentityStemmer, SnowballStemmer, Stemmer};

    fn setup(
        records: Vec<LocationRecord>,
        stemmer: Arc<dyn Stemmer>,
    ) -> (GazetteerIndex, MentionExtractor) {
        let index = GazetteerIndex::build(records, stemmer.as_ref()).unwrap();
        let extractor = MentionExtractor::new(CapitalAlphabet::greek(), stemmer);
        (index, extractor)
    }

    #[test]
    fn test_capital_city_scenario() {
        let (index, extractor) = setup(
            vec![LocationRecord::new(1, "Λευκωσία", 35.17, 33.36)],
            Arc::new(SnowballStemmer::greek()),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q1", "Η πρωτεύουσα είναι η Λευκωσία.");

        assert_eq!(matcher.match_document(&doc), vec![Mention::new(1, "q1")]);
        // Both strategies find it independently.
        assert_eq!(matcher.stemmed_matches(&doc), vec![Mention::new(1, "q1")]);
        assert_eq!(matcher.literal_matches(&doc), vec![Mention::new(1, "q1")]);
    }

    #[test]
    fn test_no_mention_scenario() {
        let (index, extractor) = setup(
            vec![LocationRecord::new(2, "Αμμόχωστος", 35.12, 33.94)],
            Arc::new(SnowballStemmer::greek()),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q2", "no mention here");
        assert!(matcher.match_document(&doc).is_empty());
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let (index, extractor) = setup(
            vec![
                LocationRecord::new(1, "Λευκωσία", 0.0, 0.0),
                LocationRecord::new(2, "", 0.0, 0.0),
            ],
            Arc::new(IdentityStemmer),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        assert!(matcher.match_document(&Document::new("q", "")).is_empty());
        assert!(matcher.match_document(&Document::new("q", "  \t ")).is_empty());
    }

    #[test]
    fn test_punctuation_only_name_never_matches() {
        let (index, extractor) = setup(
            vec![
                LocationRecord::new(1, "...", 0.0, 0.0),
                LocationRecord::new(2, "Λάρνακα", 0.0, 0.0),
            ],
            Arc::new(IdentityStemmer),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q", "Και μετά... η Λάρνακα...");

        assert_eq!(matcher.literal_matches(&doc), vec![Mention::new(2, "q")]);
        assert!(matcher
            .match_document(&doc)
            .iter()
            .all(|mention| mention.location_id != 1));
    }

    #[test]
    fn test_literal_fallback_when_run_is_too_wide() {
        // "Σήμερα" glues onto the run, so the phrase key is not the name's key.
        let (index, extractor) = setup(
            vec![LocationRecord::new(5, "Πάνω Λεύκαρα", 34.92, 33.30)],
            Arc::new(IdentityStemmer),
        );
        let doc = Document::new("q5", "ρωτάμε Σήμερα Πάνω Λεύκαρα για το νερό");

        let stemmed_only = Matcher::new(&index, &extractor, MatchStrategy::Stemmed);
        assert!(stemmed_only.match_document(&doc).is_empty());

        let both = Matcher::new(&index, &extractor, MatchStrategy::Both);
        assert_eq!(both.match_document(&doc), vec![Mention::new(5, "q5")]);
    }

    #[test]
    fn test_stemmed_match_without_literal() {
        // Different case and no accents: the literal pass cannot see it.
        let (index, extractor) = setup(
            vec![LocationRecord::new(1, "Λευκωσία", 0.0, 0.0)],
            Arc::new(SnowballStemmer::greek()),
        );
        let doc = Document::new("q3", "επίσκεψη στη ΛΕΥΚΩΣΙΑ σήμερα");

        let literal_only = Matcher::new(&index, &extractor, MatchStrategy::Literal);
        assert!(literal_only.match_document(&doc).is_empty());

        let both = Matcher::new(&index, &extractor, MatchStrategy::Both);
        assert_eq!(both.match_document(&doc), vec![Mention::new(1, "q3")]);
    }

    #[test]
    fn test_literal_matches_lowercase_internal_words() {
        let (index, extractor) = setup(
            vec![LocationRecord::new(9, "Άγιος Θεόδωρος της Πάφου", 0.0, 0.0)],
            Arc::new(IdentityStemmer),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q9", "στον Άγιος Θεόδωρος της Πάφου υπάρχει πρόβλημα");

        assert!(matcher.stemmed_matches(&doc).is_empty());
        assert_eq!(matcher.match_document(&doc), vec![Mention::new(9, "q9")]);
    }

    #[test]
    fn test_shared_stem_key_reports_all() {
        struct PrefixStemmer;
        impl Stemmer for PrefixStemmer {
            fn stemmer_id(&self) -> &str {
                "prefix"
            }
            fn stem(&self, token: &str) -> String {
                token.chars().take(5).collect()
            }
        }

        let (index, extractor) = setup(
            vec![
                LocationRecord::new(10, "Λεμεσός", 0.0, 0.0),
                LocationRecord::new(11, "Λεμεσού", 0.0, 0.0),
            ],
            Arc::new(PrefixStemmer),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q4", "ζητήματα στη Λεμεσό σήμερα");

        assert_eq!(
            matcher.match_document(&doc),
            vec![Mention::new(10, "q4"), Mention::new(11, "q4")]
        );
    }

    #[test]
    fn test_union_contains_each_strategy() {
        let (index, extractor) = setup(
            vec![
                LocationRecord::new(1, "Λευκωσία", 0.0, 0.0),
                LocationRecord::new(5, "Πάνω Λεύκαρα", 0.0, 0.0),
                LocationRecord::new(7, "Πάφος", 0.0, 0.0),
            ],
            Arc::new(SnowballStemmer::greek()),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new(
            "q",
            "για τη ΛΕΥΚΩΣΙΑ και ρωτάμε Σήμερα Πάνω Λεύκαρα αλλά όχι την πόλη",
        );

        let union: BTreeSet<Mention> = matcher.match_document(&doc).into_iter().collect();
        let stemmed: BTreeSet<Mention> = matcher.stemmed_matches(&doc).into_iter().collect();
        let literal: BTreeSet<Mention> = matcher.literal_matches(&doc).into_iter().collect();

        assert!(union.is_superset(&stemmed));
        assert!(union.is_superset(&literal));
        assert_eq!(union, stemmed.union(&literal).cloned().collect());
        assert_eq!(stemmed, BTreeSet::from([Mention::new(1, "q")]));
        assert_eq!(literal, BTreeSet::from([Mention::new(5, "q")]));
    }

    #[test]
    fn test_result_is_sorted_and_deduplicated() {
        let (index, extractor) = setup(
            vec![
                LocationRecord::new(3, "Πάφος", 0.0, 0.0),
                LocationRecord::new(1, "Λάρνακα", 0.0, 0.0),
            ],
            Arc::new(IdentityStemmer),
        );
        let matcher = Matcher::new(&index, &extractor, MatchStrategy::Both);
        let doc = Document::new("q", "η Πάφος και η Λάρνακα και πάλι η Πάφος");

        assert_eq!(
            matcher.match_document(&doc),
            vec![Mention::new(1, "q"), Mention::new(3, "q")]
        );
    }
}
