use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Ollama,
}

impl LlmBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "aipipe" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub corpus_path: PathBuf,
    pub ollama_base_url: String,
    pub embedding_model: String,
    pub llm_backend: LlmBackend,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub vision_model: String,
    pub top_k: usize,
    pub request_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_backend = get("LLM_BACKEND")
            .and_then(|v| LlmBackend::parse(&v))
            .unwrap_or(LlmBackend::OpenAi);
        let default_chat = match llm_backend {
            LlmBackend::OpenAi => "gpt-4o-mini",
            LlmBackend::Ollama => "llama3",
        };
        let chat_model = get("CHAT_MODEL").unwrap_or_else(|| default_chat.to_string());
        Self {
            corpus_path: get("CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/embeddings/context_embeddings.json")),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            embedding_model: get("EMBEDDING_MODEL").unwrap_or_else(|| "all-minilm".to_string()),
            llm_backend,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://aipipe.org/openai/v1".to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            vision_model: get("VISION_MODEL").unwrap_or_else(|| match llm_backend {
                LlmBackend::OpenAi => chat_model.clone(),
                LlmBackend::Ollama => "llava".to_string(),
            }),
            chat_model,
            top_k: get("TOP_K")
                .and_then(|v| v.parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(3),
            request_timeout: Duration::from_secs(
                get("REQUEST_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
        }
    }
}
