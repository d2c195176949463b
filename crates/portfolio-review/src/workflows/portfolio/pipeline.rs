use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::classifier::DocumentClassifier;
use super::domain::{DocumentClassification, ExtractedFields};
use super::extraction::TextExtractor;
use super::llm::{LanguageModel, LlmError};
use super::manifest::{Manifest, ManifestEntry};
use super::names::{verify_person, PersonMatch};
use super::scoring::{PortfolioAnalyzer, PortfolioSummary};
use super::similarity::{self, MatchThresholds};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("language model unavailable: {0}")]
    Model(#[source] LlmError),
    #[error("no documents were successfully processed")]
    NothingProcessed,
}

/// Everything learned about one manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    pub filename: String,
    pub claimed: String,
    pub detected: String,
    pub description: String,
    pub similarity: f64,
    pub sequence_ratio: f64,
    pub matched: bool,
    pub person: PersonMatch,
    /// Present only when the applicant's name was found in the document.
    pub analysis: Option<ExtractedFields>,
    #[serde(skip)]
    pub text: String,
}

impl DocumentResult {
    pub fn name_matched(&self) -> bool {
        self.person.matched
    }

    pub fn classification(&self) -> DocumentClassification {
        DocumentClassification {
            filename: self.filename.clone(),
            detected_category: self.detected.clone(),
            claimed_category: self.claimed.clone(),
            extracted_fields: self.analysis.clone().unwrap_or_default(),
            full_text: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRun {
    pub expected_name: String,
    pub results: Vec<DocumentResult>,
    pub summary: PortfolioSummary,
}

/// Sequential manifest processor: extract, classify, verify, analyze, score.
pub struct PortfolioPipeline<E, M> {
    extractor: E,
    classifier: DocumentClassifier<M>,
    analyzer: PortfolioAnalyzer,
    thresholds: MatchThresholds,
    input_dir: PathBuf,
}

impl<E, M> PortfolioPipeline<E, M>
where
    E: TextExtractor,
    M: LanguageModel,
{
    pub fn new(
        extractor: E,
        classifier: DocumentClassifier<M>,
        analyzer: PortfolioAnalyzer,
        input_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extractor,
            classifier,
            analyzer,
            thresholds: MatchThresholds::default(),
            input_dir: input_dir.into(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn classifier(&self) -> &DocumentClassifier<M> {
        &self.classifier
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn run(&self, manifest: &Manifest) -> Result<PortfolioRun, PipelineError> {
        info!(
            documents = manifest.entries.len(),
            input_dir = %self.input_dir.display(),
            "processing portfolio"
        );

        let mut results = Vec::with_capacity(manifest.entries.len());
        for entry in &manifest.entries {
            if let Some(result) = self.process(entry, &manifest.expected_name)? {
                results.push(result);
            }
        }

        if results.is_empty() {
            return Err(PipelineError::NothingProcessed);
        }

        let verified = results
            .iter()
            .filter(|result| result.name_matched())
            .map(DocumentResult::classification)
            .collect::<Vec<_>>();
        let summary = self.analyzer.analyze(&verified);

        info!(
            processed = results.len(),
            verified = verified.len(),
            percent = summary.percent,
            "portfolio scored"
        );

        Ok(PortfolioRun {
            expected_name: manifest.expected_name.clone(),
            results,
            summary,
        })
    }

    /// `Ok(None)` means the entry was skipped; only fatal model errors propagate.
    fn process(
        &self,
        entry: &ManifestEntry,
        expected_name: &str,
    ) -> Result<Option<DocumentResult>, PipelineError> {
        let path = self.input_dir.join(&entry.filename);
        if !path.is_file() {
            warn!(file = %path.display(), "file not found, skipping");
            return Ok(None);
        }

        let text = match self.extractor.extract(&path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(filename = %entry.filename, "no text extracted, skipping");
                return Ok(None);
            }
            Err(err) => {
                warn!(filename = %entry.filename, error = %err, "text extraction failed, skipping");
                return Ok(None);
            }
        };

        let classification = match self.classifier.classify(&text) {
            Ok(classification) => classification,
            Err(err) if err.is_transient() => {
                warn!(filename = %entry.filename, error = %err, "classification failed, skipping");
                return Ok(None);
            }
            Err(err) => return Err(PipelineError::Model(err)),
        };

        let outcome = similarity::evaluate(&classification.category, &entry.claimed_type, self.thresholds);
        let person = verify_person(&text, expected_name);

        info!(
            filename = %entry.filename,
            category = %classification.category,
            similarity = outcome.similarity,
            matched = outcome.matched,
            name_matched = person.matched,
            "document classified"
        );

        let analysis = if person.matched {
            match self.classifier.analyze(&text, &classification.category) {
                Ok(fields) => Some(fields),
                Err(err) if err.is_transient() => {
                    warn!(filename = %entry.filename, error = %err, "deep analysis failed");
                    Some(ExtractedFields::unstructured(""))
                }
                Err(err) => return Err(PipelineError::Model(err)),
            }
        } else {
            None
        };

        Ok(Some(DocumentResult {
            filename: entry.filename.clone(),
            claimed: entry.claimed_type.clone(),
            detected: classification.category,
            description: classification.description,
            similarity: outcome.similarity,
            sequence_ratio: outcome.sequence_ratio,
            matched: outcome.matched,
            person,
            analysis,
            text,
        }))
    }
}
