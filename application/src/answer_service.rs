use crate::rag_service::RagService;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use domain::errors::RagError;
use domain::models::{Answer, AnswerRequest, ImagePayload, PromptParts};
use domain::ports::{AnswerGenerator, Captioner};
use domain::prompts::{IMAGE_QUESTION_PROMPT, SYSTEM_PROMPT};
use domain::scope_policy::ScopePolicy;
use shared::telemetry::Telemetry;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_TOP_K: usize = 3;

/// Decode the optional base64 image of a request.
///
/// An empty `image` counts as absent. A data-URL prefix is tolerated.
pub fn decode_image(request: &AnswerRequest) -> Result<Option<ImagePayload>, RagError> {
    let Some(raw) = request.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let (header_mime, data) = match raw.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, data)) => (header.strip_suffix(";base64").map(str::to_string), data),
        None => (None, raw),
    };

    let mime_type = request
        .mime_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or(header_mime)
        .ok_or_else(|| RagError::MalformedInput("mime_type is required with an image".to_string()))?;
    if !mime_type.starts_with("image/") {
        return Err(RagError::MalformedInput(format!(
            "unsupported mime type: {mime_type}"
        )));
    }

    // Encoders commonly wrap base64 at 76 columns.
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| RagError::MalformedInput(format!("invalid image data: {e}")))?;
    if bytes.is_empty() {
        return Err(RagError::MalformedInput("image data is empty".to_string()));
    }
    Ok(Some(ImagePayload { bytes, mime_type }))
}

/// Answers one question: scope check, optional captioning, retrieval,
/// generation, citations.
pub struct AnswerService {
    rag: Arc<RagService>,
    generator: Arc<dyn AnswerGenerator>,
    captioner: Option<Arc<dyn Captioner>>,
    policy: ScopePolicy,
    top_k: usize,
    system_prompt: String,
}

impl AnswerService {
    pub fn new(rag: Arc<RagService>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            rag,
            generator,
            captioner: None,
            policy: ScopePolicy::new(),
            top_k: DEFAULT_TOP_K,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_captioner(mut self, captioner: Arc<dyn Captioner>) -> Self {
        self.captioner = Some(captioner);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn rag(&self) -> &RagService {
        &self.rag
    }

    pub async fn answer(&self, request: &AnswerRequest) -> Result<Answer, RagError> {
        let timer = Telemetry::new();

        if let Some(canned) = self.policy.canned_answer(&request.question) {
            debug!("question answered by scope policy");
            return Ok(Answer::without_links(canned));
        }

        let image = decode_image(request)?;
        let question = request.question.trim();
        if question.is_empty() && image.is_none() {
            return Err(RagError::MalformedInput(
                "question is empty and no image was supplied".to_string(),
            ));
        }

        let caption = match (&image, &self.captioner) {
            (Some(image), Some(captioner)) => match captioner.describe(image).await {
                Ok(description) if description.trim().is_empty() => {
                    warn!("image caption is empty, continuing with text only");
                    None
                }
                Ok(description) => Some(description.trim().to_string()),
                Err(e) => {
                    warn!(error = %e, "image captioning failed, continuing with text only");
                    None
                }
            },
            _ => None,
        };

        let retrieval_query = match (question.is_empty(), caption) {
            (false, Some(caption)) => format!("{question}\nImage context: {caption}"),
            (false, None) => question.to_string(),
            (true, Some(caption)) => caption,
            (true, None) => IMAGE_QUESTION_PROMPT.to_string(),
        };

        let query_embedding = self.rag.embed_query(&retrieval_query).await?;
        let results = self.rag.retrieve(&query_embedding, self.top_k)?;
        debug!(
            retrieved = results.len(),
            scores = ?results.iter().map(|r| r.score).collect::<Vec<_>>(),
            "context retrieved"
        );

        let context = results
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = PromptParts {
            system: self.system_prompt.clone(),
            question: if question.is_empty() {
                IMAGE_QUESTION_PROMPT.to_string()
            } else {
                question.to_string()
            },
            context,
            image,
        };
        let answer = self.generator.generate(&prompt).await?.trim().to_string();

        let mut links = Vec::with_capacity(results.len());
        for result in &results {
            links.push(self.rag.citation_for(result, &query_embedding).await?);
        }

        info!(
            elapsed_ms = timer.elapsed_ms() as u64,
            links = links.len(),
            "question answered"
        );
        Ok(Answer { answer, links })
    }
}
