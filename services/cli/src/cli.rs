use crate::commands::{
    run_analyze, run_build_manifest, run_check_match, run_classify, run_extract_name,
    run_portfolio, run_score, BuildManifestArgs, CheckMatchArgs, DocumentArgs, ExtractNameArgs,
    PortfolioArgs, ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use portfolio_review::config::AppConfig;
use portfolio_review::error::AppError;
use portfolio_review::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-review",
    about = "Classify, verify and score applicant portfolio documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a document and classify it
    Classify(DocumentArgs),
    /// Classify a document and extract structured fields for its category
    Analyze(DocumentArgs),
    /// Check whether the expected full name appears in a document
    ExtractName(ExtractNameArgs),
    /// Compare the detected category with the claimed one
    CheckMatch(CheckMatchArgs),
    /// Process every document in a manifest and write reports
    Portfolio(PortfolioArgs),
    /// Build a manifest interactively
    BuildManifest(BuildManifestArgs),
    /// Score already classified documents without touching the model
    Score(ScoreArgs),
    /// Start the HTTP scoring service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Classify(args) => run_classify(&config.pipeline, args),
        Command::Analyze(args) => run_analyze(&config.pipeline, args),
        Command::ExtractName(args) => run_extract_name(&config.pipeline, args),
        Command::CheckMatch(args) => run_check_match(&config.pipeline, args),
        Command::Portfolio(args) => run_portfolio(&config.pipeline, args),
        Command::BuildManifest(args) => run_build_manifest(args),
        Command::Score(args) => run_score(&config.pipeline, args),
        Command::Serve(args) => server::run(config, args).await,
    }
}
