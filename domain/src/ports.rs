use crate::errors::{CaptioningError, GenerationError, RetrievalError};
use crate::models::{ImagePayload, PromptParts};
use async_trait::async_trait;

/// Sentence-embedding model shared by the corpus and incoming queries.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Vision collaborator turning an image into a textual description.
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn describe(&self, image: &ImagePayload) -> Result<String, CaptioningError>;
}

/// LLM collaborator producing the final answer text.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &PromptParts) -> Result<String, GenerationError>;
}
