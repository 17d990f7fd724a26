use thiserror::Error;

/// Failures of the retrieval engine: corpus or embedding model unusable.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "corpus columns disagree: {embeddings} embeddings, {chunks} chunks, {metadata} metadata records"
    )]
    CorpusMismatch {
        embeddings: usize,
        chunks: usize,
        metadata: usize,
    },

    #[error("embedding model unavailable: {0}")]
    Embedding(String),

    #[error("corpus unavailable: {0}")]
    Corpus(String),
}

#[derive(Debug, Error)]
#[error("image captioning failed: {0}")]
pub struct CaptioningError(pub String);

#[derive(Debug, Error)]
#[error("answer generation failed: {0}")]
pub struct GenerationError(pub String);

/// Request-level error surfaced by the answer orchestrator.
#[derive(Debug, Error)]
pub enum RagError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Captioning(#[from] CaptioningError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl RagError {
    /// True when the caller sent something unusable, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RagError::MalformedInput(_))
    }
}
