use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Source of plain text for a portfolio document.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to start `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("`{tool}` failed on {path}: {stderr}")]
    ToolFailed {
        tool: String,
        path: PathBuf,
        stderr: String,
    },
    #[error("I/O error during extraction: {0}")]
    Io(#[from] io::Error),
}

/// PDF text via poppler, with a tesseract OCR fallback for scanned documents.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    pdftotext_bin: String,
    pdftoppm_bin: String,
    tesseract_bin: String,
    ocr_lang: String,
    dpi: u32,
}

impl PdfTextExtractor {
    pub const OCR_SUFFIX: &'static str = ".ocr.txt";

    pub fn new(tesseract_bin: impl Into<String>, ocr_lang: impl Into<String>) -> Self {
        Self {
            pdftotext_bin: "pdftotext".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: tesseract_bin.into(),
            ocr_lang: ocr_lang.into(),
            dpi: 300,
        }
    }

    pub fn with_poppler(mut self, pdftotext: impl Into<String>, pdftoppm: impl Into<String>) -> Self {
        self.pdftotext_bin = pdftotext.into();
        self.pdftoppm_bin = pdftoppm.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn ocr_sidecar(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(Self::OCR_SUFFIX);
        PathBuf::from(name)
    }

    fn direct_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let output = run(
            Command::new(&self.pdftotext_bin)
                .arg("-layout")
                .arg(path)
                .arg("-"),
            &self.pdftotext_bin,
            path,
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn ocr_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let scratch = ScratchDir::create()?;
        let prefix = scratch.path().join("page");

        run(
            Command::new(&self.pdftoppm_bin)
                .arg("-r")
                .arg(self.dpi.to_string())
                .arg("-png")
                .arg(path)
                .arg(&prefix),
            &self.pdftoppm_bin,
            path,
        )?;

        let mut pages = fs::read_dir(scratch.path())?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|page| page.extension().is_some_and(|ext| ext == "png"))
            .collect::<Vec<_>>();
        pages.sort_by_key(|page| page_number(page));

        let mut text = String::new();
        for (index, page) in pages.iter().enumerate() {
            let recognized = run(
                Command::new(&self.tesseract_bin)
                    .arg(page)
                    .arg("stdout")
                    .arg("-l")
                    .arg(&self.ocr_lang)
                    .arg("--oem")
                    .arg("1")
                    .arg("--psm")
                    .arg("6"),
                &self.tesseract_bin,
                page,
            );
            match recognized {
                Ok(output) => text.push_str(&String::from_utf8_lossy(&output.stdout)),
                Err(err) => warn!(page = index + 1, file = %path.display(), error = %err, "OCR failed for page"),
            }
            text.push('\n');
        }

        let sidecar = Self::ocr_sidecar(path);
        if let Err(err) = fs::write(&sidecar, &text) {
            warn!(path = %sidecar.display(), error = %err, "failed to save OCR text");
        }

        info!(file = %path.display(), pages = pages.len(), chars = text.chars().count(), "OCR finished");
        Ok(text)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        match self.direct_text(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(file = %path.display(), "extracted embedded PDF text");
                return Ok(text);
            }
            Ok(_) => debug!(file = %path.display(), "no embedded text, falling back to OCR"),
            Err(err) => warn!(file = %path.display(), error = %err, "direct text extraction failed, falling back to OCR"),
        }
        self.ocr_text(path)
    }
}

fn run(command: &mut Command, tool: &str, path: &Path) -> Result<Output, ExtractionError> {
    let output = command.output().map_err(|source| ExtractionError::Spawn {
        tool: tool.to_string(),
        source,
    })?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(ExtractionError::ToolFailed {
            tool: tool.to_string(),
            path: path.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// `pdftoppm` names pages `<prefix>-<n>.png`, zero-padded only for larger documents.
fn page_number(page: &Path) -> u64 {
    page.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|number| number.parse().ok())
        .unwrap_or(u64::MAX)
}

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn create() -> io::Result<Self> {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = env::temp_dir().join(format!("portfolio-ocr-{}-{seq}", std::process::id()));
        fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
