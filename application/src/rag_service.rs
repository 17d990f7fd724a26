use domain::corpus::Corpus;
use domain::errors::RetrievalError;
use domain::models::{CitationLink, RetrievalResult};
use domain::ports::EmbeddingModel;
use infrastructure::corpus_store::CorpusStore;
use infrastructure::html::clean_html;
use infrastructure::search::SearchEngine;
use infrastructure::sentence;
use shared::utils::excerpt;
use std::sync::Arc;

/// The retrieval engine: an immutable corpus plus the model that embedded it.
///
/// Constructed once at startup and shared by reference; nothing here is
/// mutated while serving.
pub struct RagService {
    corpus: Corpus,
    model: Arc<dyn EmbeddingModel>,
}

impl RagService {
    pub fn new(corpus: Corpus, model: Arc<dyn EmbeddingModel>) -> Self {
        Self { corpus, model }
    }

    pub fn load(store: &CorpusStore, model: Arc<dyn EmbeddingModel>) -> Result<Self, RetrievalError> {
        Ok(Self::new(store.load()?, model))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn model(&self) -> &dyn EmbeddingModel {
        self.model.as_ref()
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let vector = self.model.embed(text).await?;
        if !self.corpus.is_empty() && vector.len() != self.corpus.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.corpus.dimension(),
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    pub fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        SearchEngine::top_k(query_embedding, &self.corpus, top_k)
    }

    /// Embed `query` and return the `top_k` closest chunks.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let query_embedding = self.embed_query(query).await?;
        self.retrieve(&query_embedding, top_k)
    }

    pub async fn best_sentence(
        &self,
        text: &str,
        query_embedding: &[f32],
    ) -> Result<String, RetrievalError> {
        sentence::best_sentence(text, query_embedding, self.model.as_ref()).await
    }

    /// Link for one retrieved chunk, quoting its most relevant sentence.
    pub async fn citation_for(
        &self,
        result: &RetrievalResult,
        query_embedding: &[f32],
    ) -> Result<CitationLink, RetrievalError> {
        let plain = clean_html(&result.text);
        let sentence = self.best_sentence(&plain, query_embedding).await?;
        Ok(CitationLink {
            url: result.source_url.clone(),
            text: excerpt(&sentence),
        })
    }
}
