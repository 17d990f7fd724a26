use crate::models::PromptParts;

pub const SYSTEM_PROMPT: &str = "You are a Virtual Teaching Assistant (Virtual TA) for the Tools in Data Science (TDS) course at IITM. \
Your job is to help students with course content and forum discussions from Jan 1 to April 14, 2025. \
If you don't know something, say so honestly. Do not make up information.";

/// Stands in for the question when only an image was sent.
pub const IMAGE_QUESTION_PROMPT: &str = "This image contains a question. Carefully read all visible text, \
transcribe the question, and answer it in detail. If unclear, explain what you can see.";

pub const CAPTION_PROMPT: &str = "Describe this educational image in detail for student assistance.";

impl PromptParts {
    /// Context block appended after the question.
    pub fn context_instruction(&self) -> String {
        format!(
            "Use the following context to answer the question. If unsure, say so.\n\nContext:\n{}\n\nAnswer (plain text, no markdown):",
            self.context
        )
    }
}
