use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::workflows::portfolio::domain::{DocumentClassification, ExtractedFields};
use crate::workflows::portfolio::extraction::{ExtractionError, TextExtractor};
use crate::workflows::portfolio::llm::{LanguageModel, LlmError, RetryPolicy};
use crate::workflows::portfolio::manifest::{Manifest, ManifestEntry};
use crate::workflows::portfolio::taxonomy::Taxonomy;
use crate::workflows::portfolio::{DocumentClassifier, PortfolioAnalyzer, PortfolioPipeline};

pub(super) const APPLICANT: &str = "Иванов Иван Иванович";

/// Serves canned text per file name.
#[derive(Default)]
pub(super) struct MemoryExtractor {
    texts: HashMap<String, String>,
}

impl MemoryExtractor {
    pub(super) fn with(mut self, filename: &str, text: &str) -> Self {
        self.texts.insert(filename.to_string(), text.to_string());
        self
    }
}

impl TextExtractor for MemoryExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        Ok(self.texts.get(name).cloned().unwrap_or_default())
    }
}

/// Answers prompts by looking for a marker in the prompt text.
#[derive(Default)]
pub(super) struct ScriptedModel {
    replies: Vec<(String, String, String)>,
    unavailable: bool,
    pub(super) calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(super) fn reply(mut self, tag: &str, marker: &str, response: &str) -> Self {
        self.replies
            .push((tag.to_string(), marker.to_string(), response.to_string()));
        self
    }

    pub(super) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub(super) fn calls_tagged(&self, tag: &str) -> usize {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .iter()
            .filter(|call| call.as_str() == tag)
            .count()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, tag: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(tag.to_string());

        if self.unavailable {
            return Err(LlmError::ModelUnavailable {
                model: "scripted".to_string(),
                stderr: "model not found".to_string(),
            });
        }

        Ok(self
            .replies
            .iter()
            .find(|(reply_tag, marker, _)| reply_tag == tag && prompt.contains(marker.as_str()))
            .map(|(_, _, response)| response.clone())
            .unwrap_or_default())
    }
}

/// Input directory populated with empty placeholder files.
pub(super) fn input_dir(filenames: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in filenames {
        fs::write(dir.path().join(name), b"%PDF-1.4").expect("placeholder written");
    }
    dir
}

pub(super) fn manifest(entries: &[(&str, &str)]) -> Manifest {
    Manifest {
        expected_name: APPLICANT.to_string(),
        entries: entries
            .iter()
            .map(|(filename, claimed)| ManifestEntry {
                filename: filename.to_string(),
                claimed_type: claimed.to_string(),
            })
            .collect(),
    }
}

pub(super) fn pipeline(
    extractor: MemoryExtractor,
    model: ScriptedModel,
    input: &Path,
) -> PortfolioPipeline<MemoryExtractor, ScriptedModel> {
    let categories = Taxonomy::standard()
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect();
    let classifier = DocumentClassifier::new(model, categories).with_retry(RetryPolicy::none());
    PortfolioPipeline::new(extractor, classifier, PortfolioAnalyzer::standard(), input)
}

pub(super) fn long_text(marker: &str) -> String {
    format!("{marker} {APPLICANT} {}", "текст ".repeat(60))
}

pub(super) fn classified(filename: &str, category: &str, fields: Value, text: &str) -> DocumentClassification {
    let extracted_fields = match fields {
        Value::Object(map) => ExtractedFields::Structured(map),
        Value::String(raw) => ExtractedFields::unstructured(raw),
        _ => ExtractedFields::default(),
    };
    DocumentClassification {
        filename: filename.to_string(),
        detected_category: category.to_string(),
        claimed_category: category.to_string(),
        extracted_fields,
        full_text: text.to_string(),
    }
}

pub(super) fn complete_diploma_fields() -> Value {
    json!({
        "institution": "МГУ",
        "qualification": "бакалавр",
        "issue_date": "2020-06-30",
        "reg_number": "12345"
    })
}
