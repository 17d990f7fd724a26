use crate::errors::RetrievalError;
use crate::models::{Chunk, ChunkMetadata};

/// The read-only set of chunks a process serves from.
///
/// Built once from the three parallel columns of the persisted bundle. All
/// embeddings share one dimension.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    chunks: Vec<Chunk>,
    dimension: usize,
}

impl Corpus {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zip the persisted columns into chunks, rejecting length or dimension disagreement.
    pub fn from_columns(
        embeddings: Vec<Vec<f32>>,
        texts: Vec<String>,
        metadata: Vec<ChunkMetadata>,
    ) -> Result<Self, RetrievalError> {
        if embeddings.len() != texts.len() || texts.len() != metadata.len() {
            return Err(RetrievalError::CorpusMismatch {
                embeddings: embeddings.len(),
                chunks: texts.len(),
                metadata: metadata.len(),
            });
        }

        let chunks = embeddings
            .into_iter()
            .zip(texts)
            .zip(metadata)
            .map(|((embedding, text), meta)| Chunk {
                text,
                source_url: meta.url,
                source: meta.source,
                embedding,
            })
            .collect();
        Self::from_chunks(chunks)
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Result<Self, RetrievalError> {
        let dimension = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != dimension) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimension,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self { chunks, dimension })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimension, 0 for an empty corpus.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Split back into the persisted column layout.
    pub fn to_columns(&self) -> (Vec<Vec<f32>>, Vec<String>, Vec<ChunkMetadata>) {
        let mut embeddings = Vec::with_capacity(self.len());
        let mut texts = Vec::with_capacity(self.len());
        let mut metadata = Vec::with_capacity(self.len());
        for chunk in &self.chunks {
            embeddings.push(chunk.embedding.clone());
            texts.push(chunk.text.clone());
            metadata.push(ChunkMetadata {
                url: chunk.source_url.clone(),
                source: chunk.source,
            });
        }
        (embeddings, texts, metadata)
    }
}
