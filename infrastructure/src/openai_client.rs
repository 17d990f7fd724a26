use crate::config::Config;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use domain::errors::{CaptioningError, GenerationError};
use domain::models::{ImagePayload, PromptParts};
use domain::prompts::CAPTION_PROMPT;
use domain::ports::{AnswerGenerator, Captioner};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn image_part(image: &ImagePayload) -> Value {
    json!({
        "type": "image_url",
        "image_url": {
            "url": format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.bytes)),
        }
    })
}

fn text_part(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

/// OpenAI-compatible chat completions client (OpenAI, AI Pipe, OpenRouter, ...).
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    chat_model: String,
    vision_model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let chat_model = chat_model.into();
        Ok(Self {
            client: Arc::new(Client::builder().timeout(timeout).build()?),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            vision_model: chat_model.clone(),
            chat_model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required for the openai backend"))?;
        Ok(Self::new(
            &config.openai_base_url,
            api_key,
            &config.chat_model,
            config.request_timeout,
        )?
        .with_vision_model(&config.vision_model))
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub async fn chat_completion(&self, model: &str, messages: Vec<Value>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = json!({
            "model": model,
            "messages": messages,
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!("OpenAI API error ({status}): {body}"));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API returned no completion content"))
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiClient {
    async fn generate(&self, prompt: &PromptParts) -> std::result::Result<String, GenerationError> {
        let mut content = vec![text_part(&prompt.question)];
        if let Some(image) = &prompt.image {
            content.push(image_part(image));
        }
        content.push(text_part(&prompt.context_instruction()));

        let messages = vec![
            json!({ "role": "system", "content": prompt.system }),
            json!({ "role": "user", "content": content }),
        ];
        self.chat_completion(&self.chat_model, messages)
            .await
            .map_err(|e| GenerationError(e.to_string()))
    }
}

#[async_trait]
impl Captioner for OpenAiClient {
    async fn describe(&self, image: &ImagePayload) -> std::result::Result<String, CaptioningError> {
        let messages = vec![json!({
            "role": "user",
            "content": [text_part(CAPTION_PROMPT), image_part(image)],
        })];
        self.chat_completion(&self.vision_model, messages)
            .await
            .map_err(|e| CaptioningError(e.to_string()))
    }
}
