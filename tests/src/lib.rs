//! In-memory collaborators shared by the integration tests.

use async_trait::async_trait;
use domain::corpus::Corpus;
use domain::errors::{CaptioningError, GenerationError, RetrievalError};
use domain::models::{Chunk, ImagePayload, PromptParts};
use domain::ports::{AnswerGenerator, Captioner, EmbeddingModel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const VOCAB: [&str; 6] = ["python", "docker", "git", "deadline", "image", "chart"];

/// Bag-of-keywords vector over `VOCAB` plus a constant bias component.
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut vector: Vec<f32> = VOCAB
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect();
    vector.push(0.1);
    vector
}

/// Deterministic embedder; records every text it embeds.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingModel for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        Ok(keyword_vector(text))
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingModel for FailingEmbedder {
    fn model_name(&self) -> &str {
        "offline"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Err(RetrievalError::Embedding("connection refused".to_string()))
    }
}

/// Generator returning a fixed outcome and remembering every prompt.
pub struct RecordingGenerator {
    outcome: Result<String, String>,
    prompts: Mutex<Vec<PromptParts>>,
}

impl RecordingGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            outcome: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<PromptParts> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &PromptParts) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.outcome.clone().map_err(GenerationError)
    }
}

pub struct StaticCaptioner {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl StaticCaptioner {
    pub fn describing(description: &str) -> Self {
        Self {
            outcome: Ok(description.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Captioner for StaticCaptioner {
    async fn describe(&self, _image: &ImagePayload) -> Result<String, CaptioningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(CaptioningError)
    }
}

/// Corpus whose embeddings come from `keyword_vector`.
pub fn keyword_corpus(entries: &[(&str, &str)]) -> Corpus {
    let chunks = entries
        .iter()
        .map(|(text, url)| Chunk {
            text: text.to_string(),
            source_url: url.to_string(),
            source: None,
            embedding: keyword_vector(text),
        })
        .collect();
    Corpus::from_chunks(chunks).expect("uniform dimensions")
}

pub fn sample_corpus() -> Corpus {
    keyword_corpus(&[
        (
            "<p>Install Python 3.12 with uv. Then run <code>uv run app.py</code> to start.</p>",
            "https://tds.s-anand.net/#/python",
        ),
        (
            "Docker images are built with a Dockerfile. Push the docker image to Docker Hub.",
            "https://tds.s-anand.net/#/docker",
        ),
        (
            "The GA3 deadline is Sunday night. Late submissions get no marks.",
            "https://discourse.onlinedegree.iitm.ac.in/t/ga3/101",
        ),
    ])
}
