/// Canned answers checked before any retrieval happens.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    pub faq: Vec<(String, String)>,
    pub excluded_years: Vec<String>,
    pub out_of_scope_message: String,
}

impl ScopePolicy {
    pub fn new() -> Self {
        Self {
            faq: vec![
                (
                    "who are you".to_string(),
                    "I am the Virtual TA for the Tools in Data Science (TDS) course at IITM. I help students with course-related questions using data from Jan 1 to April 14, 2025.".to_string(),
                ),
                (
                    "what is tds".to_string(),
                    "TDS stands for Tools in Data Science, a course covering essential data science tools and concepts. It is one of the diploma level courses in the BS degree programme in Data Science and its Applications at IIT Madras.".to_string(),
                ),
                (
                    "what is your knowledge range".to_string(),
                    "I have knowledge of the TDS course and forum discussions from January 1 to April 14, 2025. I cannot answer questions outside this period.".to_string(),
                ),
            ],
            excluded_years: ["2022", "2023", "2024", "2026"]
                .into_iter()
                .map(String::from)
                .collect(),
            out_of_scope_message: "I only have knowledge of the TDS course from Jan 1 to April 14, 2025. I cannot answer questions outside this period.".to_string(),
        }
    }

    /// Returns the fixed reply for questions that never reach retrieval.
    pub fn canned_answer(&self, question: &str) -> Option<&str> {
        let normalized = question.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        for (phrase, answer) in &self.faq {
            if normalized.contains(phrase.as_str()) {
                return Some(answer);
            }
        }
        if self
            .excluded_years
            .iter()
            .any(|year| normalized.contains(year.as_str()))
        {
            return Some(&self.out_of_scope_message);
        }
        None
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::new()
    }
}
