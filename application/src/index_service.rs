use anyhow::Context;
use domain::corpus::Corpus;
use domain::models::SourceDocument;
use domain::ports::EmbeddingModel;
use infrastructure::chunker::{load_course_documents, load_discourse_documents, WordChunker};
use infrastructure::corpus_store::CorpusStore;
use infrastructure::embedder::Embedder;
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Offline job turning scraped documents into the persisted corpus bundle.
pub struct IndexService {
    chunker: WordChunker,
    embedder: Embedder,
    store: CorpusStore,
}

impl IndexService {
    pub fn new(chunker: WordChunker, model: Arc<dyn EmbeddingModel>, store: CorpusStore) -> Self {
        Self {
            chunker,
            embedder: Embedder::new(model),
            store,
        }
    }

    pub async fn build_from_files(&self, course: &Path, discourse: &Path) -> Result<Corpus> {
        let mut documents = load_course_documents(course)
            .with_context(|| format!("reading course content from {}", course.display()))?;
        let forum = load_discourse_documents(discourse)
            .with_context(|| format!("reading forum posts from {}", discourse.display()))?;
        info!(course = documents.len(), discourse = forum.len(), "documents loaded");
        documents.extend(forum);
        self.build(&documents).await
    }

    pub async fn build(&self, documents: &[SourceDocument]) -> Result<Corpus> {
        let timer = Telemetry::new();
        let inputs = self.chunker.chunk_documents(documents);
        info!(
            documents = documents.len(),
            chunks = inputs.len(),
            model = self.embedder.model_name(),
            "chunking complete"
        );

        let chunks = self
            .embedder
            .generate_embeddings(&inputs)
            .await
            .context("embedding chunks")?;
        let corpus = Corpus::from_chunks(chunks)?;
        self.store
            .save(&corpus)
            .with_context(|| format!("writing corpus to {}", self.store.path().display()))?;

        info!(
            chunks = corpus.len(),
            dimension = corpus.dimension(),
            elapsed_ms = timer.elapsed_ms() as u64,
            "indexing complete"
        );
        Ok(corpus)
    }
}
