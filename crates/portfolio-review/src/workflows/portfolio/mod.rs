//! Applicant portfolio review.
//!
//! The scoring core (`similarity`, `taxonomy`, `scoring`) is pure and performs no I/O.
//! Everything else in this module is orchestration around it: reading the manifest,
//! pulling text out of scanned documents, asking a language model for categories and
//! structured fields, and writing the resulting reports.

pub mod classifier;
pub mod domain;
pub mod extraction;
pub mod llm;
pub mod manifest;
pub mod names;
pub mod pipeline;
mod prompts;
pub mod report;
pub mod router;
pub mod scoring;
pub mod similarity;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use classifier::{Classification, DocumentClassifier};
pub use domain::{DocumentClassification, ExtractedFields, FALLBACK_CATEGORY};
pub use extraction::{ExtractionError, PdfTextExtractor, TextExtractor};
pub use llm::{LanguageModel, LlmError, LlmTranscript, OllamaCli, RetryPolicy};
pub use manifest::{Manifest, ManifestEntry, ManifestError};
pub use names::{verify_person, PersonMatch};
pub use pipeline::{DocumentResult, PipelineError, PortfolioPipeline, PortfolioRun};
pub use report::{write_reports, ReportError, ReportPaths};
pub use router::portfolio_router;
pub use scoring::{OverallAssessment, PortfolioAnalyzer, PortfolioSummary, SectionScore};
pub use similarity::{MatchOutcome, MatchThresholds};
pub use taxonomy::{DocumentRule, SectionScoring, SectionSpec, Taxonomy, TaxonomyError};
