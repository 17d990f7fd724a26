use domain::models::{Chunk, ChunkMetadata};
use domain::ports::EmbeddingModel;
use futures::stream::{self, StreamExt};
use shared::types::Result;
use std::sync::Arc;
use tracing::info;

const BATCH_SIZE: usize = 32;
const MAX_IN_FLIGHT: usize = 8;

pub struct Embedder {
    model: Arc<dyn EmbeddingModel>,
}

/// A chunk waiting for its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingInput {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Embedder {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Embed every input, preserving input order in the output.
    pub async fn generate_embeddings(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::with_capacity(inputs.len());

        for (batch_idx, batch) in inputs.chunks(BATCH_SIZE).enumerate() {
            info!(
                batch = batch_idx + 1,
                size = batch.len(),
                done = chunks.len(),
                total = inputs.len(),
                "embedding batch"
            );
            let batch_chunks = self.generate_batch_embeddings(batch).await?;
            chunks.extend(batch_chunks);
        }
        Ok(chunks)
    }

    async fn generate_batch_embeddings(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Chunk>> {
        let futures: Vec<_> = inputs
            .iter()
            .map(|input| {
                let model = &self.model;
                async move {
                    let embedding = model.embed(&input.text).await?;
                    Ok(Chunk {
                        text: input.text.clone(),
                        source_url: input.metadata.url.clone(),
                        source: input.metadata.source,
                        embedding,
                    }) as Result<Chunk>
                }
            })
            .collect();

        let results = stream::iter(futures)
            .buffered(MAX_IN_FLIGHT)
            .collect::<Vec<_>>()
            .await;

        results.into_iter().collect()
    }
}
