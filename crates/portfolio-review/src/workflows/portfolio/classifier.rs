use super::domain::{ExtractedFields, FALLBACK_CATEGORY};
use super::llm::{LanguageModel, LlmError, RetryPolicy};
use super::prompts;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Category answer parsed from a classification response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: String,
    pub description: String,
    #[serde(skip)]
    pub raw: String,
}

/// Prompts a language model for a document category and, on request, structured fields.
pub struct DocumentClassifier<M> {
    model: M,
    categories: Vec<String>,
    retry: RetryPolicy,
}

impl<M: LanguageModel> DocumentClassifier<M> {
    pub fn new(model: M, categories: Vec<String>) -> Self {
        Self {
            model,
            categories,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn classify(&self, text: &str) -> Result<Classification, LlmError> {
        let categories = self.categories.iter().map(String::as_str).collect::<Vec<_>>();
        let prompt = prompts::classification_prompt(text, &categories);
        let response = self.retry.run(|| self.model.complete("classify", &prompt))?;

        let classification = parse_classification(&response);
        info!(category = %classification.category, "document classified");
        Ok(classification)
    }

    pub fn analyze(&self, text: &str, category: &str) -> Result<ExtractedFields, LlmError> {
        let prompt = prompts::analysis_prompt(text, category);
        let response = self.retry.run(|| self.model.complete("analyze", &prompt))?;

        let fields = parse_analysis(&response);
        debug!(category, structured = fields.is_structured(), "document analyzed");
        Ok(fields)
    }
}

pub fn parse_classification(response: &str) -> Classification {
    let mut category = None;
    let mut description = None;

    for line in response.lines() {
        let lowered = line.to_lowercase();
        let Some((_, value)) = line.split_once(':') else {
            continue;
        };
        if lowered.contains("категория") {
            category = Some(value.trim().to_string());
        } else if lowered.contains("описание") {
            description = Some(value.trim().to_string());
        }
    }

    let category = category
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    Classification {
        category,
        description: description.unwrap_or_default(),
        raw: response.to_string(),
    }
}

/// Parses the outermost `{...}` slice of a response; anything else is kept as raw text.
pub fn parse_analysis(response: &str) -> ExtractedFields {
    let slice = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return ExtractedFields::unstructured(response),
    };

    match serde_json::from_str::<Value>(slice) {
        Ok(Value::Object(fields)) if !fields.contains_key("raw") => {
            ExtractedFields::Structured(fields)
        }
        _ => ExtractedFields::unstructured(response),
    }
}
