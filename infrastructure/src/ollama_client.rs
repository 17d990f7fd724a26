use crate::config::Config;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use domain::errors::{CaptioningError, GenerationError, RetrievalError};
use domain::models::{ImagePayload, PromptParts};
use domain::prompts::CAPTION_PROMPT;
use domain::ports::{AnswerGenerator, Captioner, EmbeddingModel};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;

const MAX_IN_FLIGHT: usize = 8;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Message,
    done: bool,
}

/// Client for a local Ollama server: embeddings, and optionally chat/vision.
#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    embedding_model: String,
    chat_model: String,
    vision_model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let embedding_model = embedding_model.into();
        Ok(Self {
            client: Arc::new(Client::builder().timeout(timeout).build()?),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_model: embedding_model.clone(),
            vision_model: embedding_model.clone(),
            embedding_model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            &config.ollama_base_url,
            &config.embedding_model,
            config.request_timeout,
        )?
        .with_chat_models(&config.chat_model, &config.vision_model))
    }

    pub fn with_chat_models(mut self, chat: impl Into<String>, vision: impl Into<String>) -> Self {
        self.chat_model = chat.into();
        self.vision_model = vision.into();
        self
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error ({status}): {body}"));
        }
        let embedding_response: EmbeddingResponse = response.json().await?;
        if embedding_response.embedding.is_empty() {
            return Err(anyhow::anyhow!(
                "Ollama returned an empty embedding for model {}",
                self.embedding_model
            ));
        }
        Ok(embedding_response.embedding)
    }

    async fn chat(&self, model: &str, messages: Vec<Message>) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("Ollama API error ({status}): {text}"));
        }
        let mut full_content = String::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(chat_resp) = serde_json::from_str::<ChatResponse>(line) {
                full_content.push_str(&chat_resp.message.content);
                if chat_resp.done {
                    break;
                }
            }
        }
        Ok(full_content)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        self.generate_embedding(text)
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, RetrievalError> {
        // `buffered` keeps results in input order.
        let requests: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        stream::iter(requests)
            .buffered(MAX_IN_FLIGHT)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }
}

#[async_trait]
impl AnswerGenerator for OllamaClient {
    async fn generate(&self, prompt: &PromptParts) -> std::result::Result<String, GenerationError> {
        let images = prompt
            .image
            .as_ref()
            .map(|img| vec![STANDARD.encode(&img.bytes)])
            .unwrap_or_default();
        let messages = vec![
            Message {
                role: "system".to_string(),
                content: prompt.system.clone(),
                images: Vec::new(),
            },
            Message {
                role: "user".to_string(),
                content: format!("{}\n\n{}", prompt.question, prompt.context_instruction()),
                images,
            },
        ];
        let answer = self
            .chat(&self.chat_model, messages)
            .await
            .map_err(|e| GenerationError(e.to_string()))?;
        if answer.trim().is_empty() {
            return Err(GenerationError("Ollama returned an empty completion".to_string()));
        }
        Ok(answer)
    }
}

#[async_trait]
impl Captioner for OllamaClient {
    async fn describe(&self, image: &ImagePayload) -> std::result::Result<String, CaptioningError> {
        let messages = vec![Message {
            role: "user".to_string(),
            content: CAPTION_PROMPT.to_string(),
            images: vec![STANDARD.encode(&image.bytes)],
        }];
        let description = self
            .chat(&self.vision_model, messages)
            .await
            .map_err(|e| CaptioningError(e.to_string()))?;
        let description = description.trim();
        if description.is_empty() {
            return Err(CaptioningError("Ollama returned an empty description".to_string()));
        }
        Ok(description.to_string())
    }
}
