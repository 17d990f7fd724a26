use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSource {
    Course,
    Discourse,
}

/// Per-chunk metadata record as persisted next to the embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ChunkSource>,
}

/// A slice of a source document together with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub source_url: String,
    pub source: Option<ChunkSource>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    /// Position of the chunk in the corpus.
    pub index: usize,
    pub text: String,
    pub source_url: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationLink {
    pub url: String,
    pub text: String,
}

/// Incoming question. `image` is base64 without a data-URL header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
}

impl AnswerRequest {
    pub fn text(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub links: Vec<CitationLink>,
}

impl Answer {
    pub fn without_links(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Everything the generator needs for one completion.
#[derive(Debug, Clone)]
pub struct PromptParts {
    pub system: String,
    pub question: String,
    pub context: String,
    pub image: Option<ImagePayload>,
}

/// A normalized document handed to the corpus builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub url: String,
    pub source: ChunkSource,
}
