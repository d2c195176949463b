use serde_json::{json, Map, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location written by the interactive manifest builder.
pub const DEFAULT_MANIFEST_PATH: &str = "config/user_manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to access manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("manifest must be a non-empty JSON array")]
    Empty,
    #[error("manifest must start with an object containing 'expected_name'")]
    MissingExpectedName,
    #[error("manifest entry {index} has no 'filename'")]
    MissingFilename { index: usize },
    #[error("interactive input failed: {0}")]
    Prompt(#[source] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub filename: String,
    pub claimed_type: String,
}

/// Applicant manifest: expected full name followed by the submitted files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub expected_name: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound(path.to_path_buf())
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(raw)?;
        let items = match value {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(ManifestError::Empty),
        };

        let mut items = items.into_iter();
        let expected_name = items
            .next()
            .as_ref()
            .and_then(|head| head.get("expected_name"))
            .and_then(Value::as_str)
            .map(|name| name.trim().to_string())
            .ok_or(ManifestError::MissingExpectedName)?;

        let entries = items
            .enumerate()
            .map(|(offset, item)| {
                let index = offset + 1;
                let filename = item
                    .get("filename")
                    .and_then(Value::as_str)
                    .ok_or(ManifestError::MissingFilename { index })?;
                let claimed_type = item
                    .get("claimed_type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim();
                Ok(ManifestEntry {
                    filename: filename.to_string(),
                    claimed_type: claimed_type.to_string(),
                })
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;

        Ok(Self {
            expected_name,
            entries,
        })
    }

    pub fn to_json(&self) -> Value {
        let mut items = Vec::with_capacity(self.entries.len() + 1);
        items.push(json!({ "expected_name": self.expected_name }));
        for entry in &self.entries {
            let mut item = Map::new();
            item.insert("filename".to_string(), Value::String(entry.filename.clone()));
            item.insert(
                "claimed_type".to_string(),
                Value::String(entry.claimed_type.clone()),
            );
            items.push(Value::Object(item));
        }
        Value::Array(items)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(&self.to_json())?;
        fs::write(path, body).map_err(io_err)
    }

    /// Prompts for the expected name and then filename/claimed-type pairs until an
    /// empty filename. Returns `None` when no files were added.
    pub fn build_interactive<R, W>(input: &mut R, out: &mut W) -> Result<Option<Self>, ManifestError>
    where
        R: BufRead,
        W: Write,
    {
        let expected_name = ask(input, out, "Enter expected name (ФИО): ")?;
        if expected_name.is_empty() {
            return Err(ManifestError::MissingExpectedName);
        }

        let mut entries = Vec::new();
        loop {
            let filename = ask(input, out, "Enter filename (or leave empty to finish): ")?;
            if filename.is_empty() {
                break;
            }
            let claimed_type = ask(input, out, "Enter claimed type for this file: ")?;
            if claimed_type.is_empty() {
                writeln!(out, "Claimed type cannot be empty. Skipping this file.")
                    .map_err(ManifestError::Prompt)?;
                continue;
            }
            entries.push(ManifestEntry {
                filename,
                claimed_type,
            });
        }

        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            expected_name,
            entries,
        }))
    }
}

/// Reads one trimmed line; end of input reads as an empty answer.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<String, ManifestError> {
    write!(out, "{prompt}").map_err(ManifestError::Prompt)?;
    out.flush().map_err(ManifestError::Prompt)?;
    let mut line = String::new();
    input.read_line(&mut line).map_err(ManifestError::Prompt)?;
    Ok(line.trim().to_string())
}
