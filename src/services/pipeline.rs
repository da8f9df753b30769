//! Owned matching context and document fan-out.
//!
//! A `MatchContext` is built once at startup from the gazetteer records and
//! is immutable afterwards. Per-document matching has no cross-document
//! state, so a corpus can be split across blocking workers and the partial
//! mention lists concatenated before a single aggregation.

use std::sync::Arc;

use tokio::task::JoinError;

use crate::models::{Document, LocationMatches, LocationRecord, Mention};
use crate::services::aggregate::aggregate;
use crate::services::extractor::{CapitalAlphabet, MentionExtractor};
use crate::services::gazetteer::{GazetteerError, GazetteerIndex};
use crate::services::matcher::{MatchStrategy, Matcher};
use crate::services::stemmer::Stemmer;

/// Gazetteer index plus extraction settings, shared by all matching calls.
#[derive(Debug)]
pub struct MatchContext {
    index: GazetteerIndex,
    extractor: MentionExtractor,
    strategy: MatchStrategy,
}

impl MatchContext {
    pub fn new(index: GazetteerIndex, extractor: MentionExtractor, strategy: MatchStrategy) -> Self {
        Self {
            index,
            extractor,
            strategy,
        }
    }

    /// Build the index from `records` with the same stemmer the extractor uses.
    pub fn build(
        records: Vec<LocationRecord>,
        stemmer: Arc<dyn Stemmer>,
        alphabet: CapitalAlphabet,
        strategy: MatchStrategy,
    ) -> Result<Self, GazetteerError> {
        let index = GazetteerIndex::build(records, stemmer.as_ref())?;
        let extractor = MentionExtractor::new(alphabet, stemmer);
        Ok(Self::new(index, extractor, strategy))
    }

    pub fn index(&self) -> &GazetteerIndex {
        &self.index
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.index, &self.extractor, self.strategy)
    }

    pub fn match_document(&self, document: &Document) -> Vec<Mention> {
        self.matcher().match_document(document)
    }

    /// Concatenated mentions of every document, in document order.
    pub fn match_documents(&self, documents: &[Document]) -> Vec<Mention> {
        let matcher = self.matcher();
        documents
            .iter()
            .flat_map(|document| matcher.match_document(document))
            .collect()
    }

    /// Match and aggregate a whole collection.
    pub fn aggregate_documents(&self, documents: &[Document]) -> Vec<LocationMatches> {
        aggregate(self.match_documents(documents))
    }
}

/// Match documents on `workers` blocking tasks and concatenate the results.
///
/// `on_progress` is called with the size of each finished chunk. The
/// mention order differs from the sequential path, the aggregation does not.
pub async fn match_documents_parallel<F>(
    context: Arc<MatchContext>,
    mut documents: Vec<Document>,
    workers: usize,
    mut on_progress: F,
) -> Result<Vec<Mention>, JoinError>
where
    F: FnMut(usize),
{
    let workers = workers.max(1);
    let chunk_size = documents.len().div_ceil(workers).max(1);

    let mut handles = Vec::with_capacity(workers);
    while !documents.is_empty() {
        let rest = documents.split_off(chunk_size.min(documents.len()));
        let chunk = std::mem::replace(&mut documents, rest);
        let context = Arc::clone(&context);
        handles.push(tokio::task::spawn_blocking(move || {
            (chunk.len(), context.match_documents(&chunk))
        }));
    }

    tracing::debug!(
        chunks = handles.len(),
        chunk_size,
        "Dispatched documents for matching"
    );

    let mut mentions = Vec::new();
    for handle in handles {
        let (processed, partial) = handle.await?;
        on_progress(processed);
        mentions.extend(partial);
    }
    Ok(mentions)
}

/// Parallel match followed by a single aggregation.
pub async fn aggregate_documents_parallel<F>(
    context: Arc<MatchContext>,
    documents: Vec<Document>,
    workers: usize,
    on_progress: F,
) -> Result<Vec<LocationMatches>, JoinError>
where
    F: FnMut(usize),
{
    let mentions = match_documents_parallel(context, documents, workers, on_progress).await?;
    Ok(aggregate(mentions))
}
