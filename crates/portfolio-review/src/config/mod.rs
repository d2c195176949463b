use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::portfolio::llm::RetryPolicy;
use crate::workflows::portfolio::similarity::{
    MatchThresholds, DEFAULT_SEQ_THRESHOLD, DEFAULT_TFIDF_THRESHOLD,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations, external tools and thresholds used by the document pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub llm_model: String,
    pub ollama_bin: String,
    pub ocr_lang: String,
    pub tesseract_bin: String,
    pub taxonomy_path: Option<PathBuf>,
    pub thresholds: MatchThresholds,
    pub llm_attempts: u32,
    pub llm_backoff: Duration,
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let thresholds = MatchThresholds {
            tfidf: threshold("PORTFOLIO_TFIDF_THRESHOLD", DEFAULT_TFIDF_THRESHOLD)?,
            sequence: threshold("PORTFOLIO_SEQ_THRESHOLD", DEFAULT_SEQ_THRESHOLD)?,
        };

        let llm_attempts = number::<u32>("PORTFOLIO_LLM_ATTEMPTS", 2)?;
        if llm_attempts == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "PORTFOLIO_LLM_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let llm_backoff = Duration::from_millis(number::<u64>("PORTFOLIO_LLM_BACKOFF_MS", 500)?);

        let taxonomy_path = env::var("PORTFOLIO_TAXONOMY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            input_dir: PathBuf::from(var_or("PORTFOLIO_INPUT_DIR", "data/input")),
            output_dir: PathBuf::from(var_or("PORTFOLIO_OUTPUT_DIR", "data/output")),
            llm_model: var_or("PORTFOLIO_LLM_MODEL", "mistral"),
            ollama_bin: var_or("PORTFOLIO_OLLAMA_BIN", "ollama"),
            ocr_lang: var_or("PORTFOLIO_OCR_LANG", "rus+eng"),
            tesseract_bin: var_or("PORTFOLIO_TESSERACT_BIN", "tesseract"),
            taxonomy_path,
            thresholds,
            llm_attempts,
            llm_backoff,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.llm_attempts, self.llm_backoff)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(default),
    }
}

fn threshold(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = number::<f64>(key, default)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ThresholdOutOfRange { key, value })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    ThresholdOutOfRange { key: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} has an invalid value '{value}'")
            }
            ConfigError::ThresholdOutOfRange { key, value } => {
                write!(f, "{key} must lie within [0, 1], got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::ThresholdOutOfRange { .. } => None,
        }
    }
}
