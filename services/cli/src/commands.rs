use crate::infra::{build_pipeline, display_name, load_taxonomy, read_document, yes_no};
use clap::Args;
use portfolio_review::config::PipelineConfig;
use portfolio_review::error::AppError;
use portfolio_review::workflows::portfolio::manifest::DEFAULT_MANIFEST_PATH;
use portfolio_review::workflows::portfolio::report::{local_timestamp, write_reports};
use portfolio_review::workflows::portfolio::similarity::evaluate;
use portfolio_review::workflows::portfolio::{
    verify_person, DocumentClassification, Manifest, PortfolioAnalyzer, PortfolioSummary,
};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DocumentArgs {
    /// Path to the PDF document
    pub(crate) document_path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ExtractNameArgs {
    /// Path to the PDF document
    pub(crate) document_path: PathBuf,
    /// Full name expected to appear in the document
    #[arg(long, default_value = "")]
    pub(crate) expected_name: String,
}

#[derive(Args, Debug)]
pub(crate) struct CheckMatchArgs {
    /// Path to the PDF document
    pub(crate) document_path: PathBuf,
    /// Category the applicant claimed for this document
    pub(crate) claimed_category: String,
}

#[derive(Args, Debug)]
pub(crate) struct PortfolioArgs {
    /// Manifest listing the expected name and submitted files
    pub(crate) manifest_path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct BuildManifestArgs {
    /// Where to save the manifest
    #[arg(long)]
    pub(crate) output_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON array of already classified documents
    pub(crate) documents_path: PathBuf,
}

pub(crate) fn run_classify(config: &PipelineConfig, args: DocumentArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(config)?;
    let text = read_document(&pipeline, &args.document_path)?;
    let classification = pipeline.classifier().classify(&text)?;

    println!("Classification results");
    println!("  Document: {}", display_name(&args.document_path));
    println!("  Detected category: {}", classification.category);
    println!("  Description: {}", classification.description);
    println!("  Text length: {} characters", text.chars().count());
    Ok(())
}

pub(crate) fn run_analyze(config: &PipelineConfig, args: DocumentArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(config)?;
    let text = read_document(&pipeline, &args.document_path)?;
    let classification = pipeline.classifier().classify(&text)?;
    let fields = pipeline
        .classifier()
        .analyze(&text, &classification.category)?;

    println!("Deep analysis results");
    println!("  Document: {}", display_name(&args.document_path));
    println!("  Category: {}", classification.category);
    println!("  Description: {}", classification.description);
    println!("  Text length: {} characters", text.chars().count());
    println!("  Words: {}", text.split_whitespace().count());
    println!("  Structured: {}", yes_no(fields.is_structured()));
    println!("{}", pretty(&fields.to_json())?);
    Ok(())
}

pub(crate) fn run_extract_name(config: &PipelineConfig, args: ExtractNameArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(config)?;
    let text = read_document(&pipeline, &args.document_path)?;
    let person = verify_person(&text, args.expected_name.trim());

    println!("Person name check");
    println!("  Document: {}", display_name(&args.document_path));
    let found = if person.full_name.is_empty() {
        "Not found"
    } else {
        person.full_name.as_str()
    };
    println!("  Extracted name: {found}");
    if !args.expected_name.trim().is_empty() {
        println!("  Expected name: {}", args.expected_name.trim());
        println!("  Match: {}", yes_no(person.matched));
    }
    println!("  Comment: {}", person.comment);
    Ok(())
}

pub(crate) fn run_check_match(config: &PipelineConfig, args: CheckMatchArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(config)?;
    let text = read_document(&pipeline, &args.document_path)?;
    let classification = pipeline.classifier().classify(&text)?;
    let outcome = evaluate(
        &classification.category,
        &args.claimed_category,
        pipeline.thresholds(),
    );

    println!("Category match");
    println!("  Document: {}", display_name(&args.document_path));
    println!("  Claimed category: {}", args.claimed_category);
    println!("  Detected category: {}", classification.category);
    println!("  Similarity: {:.3}", outcome.similarity);
    println!("  Sequence ratio: {:.3}", outcome.sequence_ratio);
    println!("  Match: {}", yes_no(outcome.matched));
    println!("  Description: {}", classification.description);
    Ok(())
}

pub(crate) fn run_portfolio(config: &PipelineConfig, args: PortfolioArgs) -> Result<(), AppError> {
    let manifest = Manifest::from_path(&args.manifest_path)?;
    let pipeline = build_pipeline(config)?;
    let run = pipeline.run(&manifest)?;
    let paths = write_reports(&config.output_dir, &run, &local_timestamp())?;

    let verified = run.results.iter().filter(|result| result.name_matched()).count();
    println!("Portfolio analysis complete");
    println!("  Applicant: {}", run.expected_name);
    println!("  Processed documents: {}", run.results.len());
    println!("  Name verified: {verified}");
    print_summary(&run.summary);
    println!("Reports saved");
    println!("  Table: {}", paths.table.display());
    println!("  Summary: {}", paths.summary.display());
    Ok(())
}

pub(crate) fn run_build_manifest(args: BuildManifestArgs) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match Manifest::build_interactive(&mut input, &mut out)? {
        Some(manifest) => {
            let path = args
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_PATH));
            manifest.write_to(&path)?;
            println!("Manifest saved to {}", path.display());
        }
        None => println!("No files added. Manifest not saved."),
    }
    Ok(())
}

pub(crate) fn run_score(config: &PipelineConfig, args: ScoreArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.documents_path)?;
    let documents: Vec<DocumentClassification> = serde_json::from_str(&raw).map_err(|err| {
        AppError::Input(format!(
            "{} is not a list of classified documents: {err}",
            args.documents_path.display()
        ))
    })?;

    let analyzer = PortfolioAnalyzer::new(load_taxonomy(config)?);
    let summary = analyzer.analyze(&documents);
    println!("{}", pretty(&summary)?);
    Ok(())
}

fn print_summary(summary: &PortfolioSummary) {
    for entry in &summary.scores {
        println!("  {}: {}/{}", entry.section, entry.score, entry.max);
    }
    println!(
        "  Total: {}/{} ({:.1}%), {}",
        summary.total_score,
        summary.max_score,
        summary.percent,
        summary.overall_assessment.label()
    );
    for comment in &summary.comments {
        println!("  - {comment}");
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    Ok(rendered)
}
