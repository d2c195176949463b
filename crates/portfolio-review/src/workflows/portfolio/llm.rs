use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Text-completion backend used by the classifier.
///
/// `tag` names the call site (`classify`, `analyze`) and only feeds logging.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, tag: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to start `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("model I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("model process exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("model `{model}` is not available: {stderr}")]
    ModelUnavailable { model: String, stderr: String },
}

impl LlmError {
    /// Whether repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::ModelUnavailable { .. })
    }
}

/// Append-only log of every prompt/response exchange.
#[derive(Debug, Clone)]
pub struct LlmTranscript {
    path: PathBuf,
}

impl LlmTranscript {
    pub const FILE_NAME: &'static str = "llm_raw.log";

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, tag: &str, prompt: &str, response: &str, stderr: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        writeln!(file, "\n=== {tag} @ {stamp} ===")?;
        writeln!(file, "{prompt}\n")?;
        writeln!(file, "Ответ:\n{response}")?;
        if !stderr.is_empty() {
            writeln!(file, "Stderr:\n{stderr}")?;
        }
        writeln!(file, "=======================")
    }
}

/// Local model served through the `ollama run <model>` command.
#[derive(Debug, Clone)]
pub struct OllamaCli {
    binary: String,
    model: String,
    transcript: Option<LlmTranscript>,
}

impl OllamaCli {
    pub fn new(binary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            transcript: None,
        }
    }

    pub fn with_transcript(mut self, transcript: LlmTranscript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LanguageModel for OllamaCli {
    fn complete(&self, tag: &str, prompt: &str) -> Result<String, LlmError> {
        debug!(model = %self.model, tag, prompt_chars = prompt.chars().count(), "sending prompt");

        let mut child = Command::new(&self.binary)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LlmError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes())?;
        }
        let output = child.wait_with_output()?;

        let response = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if let Some(transcript) = &self.transcript {
            if let Err(err) = transcript.record(tag, prompt, &response, &stderr) {
                warn!(path = %transcript.path().display(), error = %err, "failed to write model transcript");
            }
        }

        let lowered = stderr.to_lowercase();
        if lowered.contains("no such model") || lowered.contains("not found") {
            return Err(LlmError::ModelUnavailable {
                model: self.model.clone(),
                stderr,
            });
        }
        if !output.status.success() {
            return Err(LlmError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(response)
    }
}

/// Bounded retry with linear backoff for transient model failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn run<T, F>(&self, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Result<T, LlmError>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "model call failed, retrying");
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn failed() -> LlmError {
        LlmError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "boom".to_string(),
        }
    }

    #[test]
    fn retries_transient_failures_until_success() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = policy.run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(failed())
            } else {
                Ok("Категория: Патент")
            }
        });

        assert_eq!(result.expect("third attempt succeeds"), "Категория: Патент");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn missing_model_is_not_retried() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let result: Result<(), _> = policy.run(|| {
            calls.set(calls.get() + 1);
            Err(LlmError::ModelUnavailable {
                model: "mistral".to_string(),
                stderr: "pull model manifest: file does not exist".to_string(),
            })
        });

        assert!(matches!(result, Err(LlmError::ModelUnavailable { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn gives_up_after_configured_attempts() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::new(2, Duration::ZERO).run(|| {
            calls.set(calls.get() + 1);
            Err(failed())
        });

        assert!(matches!(result, Err(LlmError::Failed { .. })));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn transcript_appends_exchanges() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transcript = LlmTranscript::in_dir(dir.path());

        transcript
            .record("classify", "prompt one", "Категория: Патент", "")
            .expect("first write");
        transcript
            .record("analyze", "prompt two", "{}", "warning")
            .expect("second write");

        let log = fs::read_to_string(transcript.path()).expect("log exists");
        assert!(log.contains("=== classify @"));
        assert!(log.contains("Ответ:\nКатегория: Патент"));
        assert!(log.contains("Stderr:\nwarning"));
        assert_eq!(log.matches("Stderr:").count(), 1);
    }

    #[test]
    fn missing_binary_reports_spawn_error() {
        let model = OllamaCli::new("definitely-not-an-installed-binary", "mistral");
        let err = model.complete("classify", "hello").expect_err("spawn fails");
        assert!(matches!(err, LlmError::Spawn { .. }));
        assert!(err.is_transient());
    }
}
