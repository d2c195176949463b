use metrics_exporter_prometheus::PrometheusHandle;
use portfolio_review::config::PipelineConfig;
use portfolio_review::error::AppError;
use portfolio_review::workflows::portfolio::{
    DocumentClassifier, LlmTranscript, OllamaCli, PdfTextExtractor, PortfolioAnalyzer,
    PortfolioPipeline, Taxonomy, TextExtractor,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type LocalPipeline = PortfolioPipeline<PdfTextExtractor, OllamaCli>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_taxonomy(config: &PipelineConfig) -> Result<Taxonomy, AppError> {
    match &config.taxonomy_path {
        Some(path) => {
            let taxonomy = Taxonomy::from_path(path)?;
            info!(path = %path.display(), sections = taxonomy.sections().len(), "loaded taxonomy");
            Ok(taxonomy)
        }
        None => Ok(Taxonomy::standard()),
    }
}

/// Wires the poppler/tesseract extractor and the local ollama model into a pipeline.
pub(crate) fn build_pipeline(config: &PipelineConfig) -> Result<LocalPipeline, AppError> {
    let taxonomy = load_taxonomy(config)?;
    let categories = taxonomy
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect();

    let model = OllamaCli::new(&config.ollama_bin, &config.llm_model)
        .with_transcript(LlmTranscript::in_dir(&config.output_dir));
    let classifier = DocumentClassifier::new(model, categories).with_retry(config.retry_policy());
    let extractor = PdfTextExtractor::new(&config.tesseract_bin, &config.ocr_lang);

    Ok(
        PortfolioPipeline::new(extractor, classifier, PortfolioAnalyzer::new(taxonomy), &config.input_dir)
            .with_thresholds(config.thresholds),
    )
}

/// Extracts text for a single-document command, rejecting missing files and blank output.
pub(crate) fn read_document(pipeline: &LocalPipeline, path: &Path) -> Result<String, AppError> {
    if !path.is_file() {
        return Err(AppError::Input(format!("file not found: {}", path.display())));
    }
    let text = pipeline.extractor().extract(path)?;
    if text.trim().is_empty() {
        return Err(AppError::Input(format!(
            "no text extracted from {}",
            path.display()
        )));
    }
    Ok(text)
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use portfolio_review::workflows::portfolio::MatchThresholds;

    fn pipeline_config(taxonomy_path: Option<PathBuf>) -> PipelineConfig {
        PipelineConfig {
            input_dir: PathBuf::from("data/input"),
            output_dir: PathBuf::from("data/output"),
            llm_model: "mistral".to_string(),
            ollama_bin: "ollama".to_string(),
            ocr_lang: "rus+eng".to_string(),
            tesseract_bin: "tesseract".to_string(),
            taxonomy_path,
            thresholds: MatchThresholds::default(),
            llm_attempts: 1,
            llm_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn standard_taxonomy_is_the_default() {
        let taxonomy = load_taxonomy(&pipeline_config(None)).expect("standard taxonomy");
        assert_eq!(taxonomy.sections().len(), 8);
    }

    #[test]
    fn missing_taxonomy_file_is_an_error() {
        let result = load_taxonomy(&pipeline_config(Some(PathBuf::from("missing/taxonomy.json"))));
        assert!(matches!(result, Err(AppError::Taxonomy(_))));
    }

    #[test]
    fn single_document_commands_reject_missing_files() {
        let pipeline = build_pipeline(&pipeline_config(None)).expect("pipeline builds");
        let err = read_document(&pipeline, Path::new("missing/diploma.pdf")).expect_err("missing");
        assert!(matches!(err, AppError::Input(_)));
        assert_eq!(pipeline.classifier().categories().len(), 19);
    }
}
