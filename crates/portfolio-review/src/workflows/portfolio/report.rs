use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use thiserror::Error;

use super::pipeline::{DocumentResult, PortfolioRun};
use super::scoring::PortfolioSummary;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to prepare report directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write report table: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub table: PathBuf,
    pub summary: PathBuf,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Файл")]
    file: &'a str,
    #[serde(rename = "Заявлено")]
    claimed: &'a str,
    #[serde(rename = "Определено")]
    detected: &'a str,
    #[serde(rename = "Описание")]
    description: &'a str,
    #[serde(rename = "Сходство")]
    similarity: String,
    #[serde(rename = "Совпадает")]
    matched: &'static str,
    #[serde(rename = "ФИО")]
    full_name: &'a str,
    #[serde(rename = "ФИО совпадает")]
    name_matched: &'static str,
    #[serde(rename = "Комментарий ФИО")]
    name_comment: &'a str,
    #[serde(rename = "Анализ")]
    analysis: String,
}

impl<'a> ReportRow<'a> {
    fn from_result(result: &'a DocumentResult) -> Self {
        let analysis = match (&result.analysis, result.name_matched()) {
            (Some(fields), true) => fields.to_json().to_string(),
            _ => String::new(),
        };

        Self {
            file: &result.filename,
            claimed: &result.claimed,
            detected: &result.detected,
            description: &result.description,
            similarity: format!("{:.2}", result.similarity),
            matched: yes_no(result.matched),
            full_name: &result.person.full_name,
            name_matched: yes_no(result.name_matched()),
            name_comment: &result.person.comment,
            analysis,
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Да"
    } else {
        "Нет"
    }
}

/// Summary artifact: the scored summary plus a human-readable verdict.
#[derive(Serialize)]
struct SummaryArtifact<'a> {
    expected_name: &'a str,
    #[serde(flatten)]
    summary: &'a PortfolioSummary,
    overall_comment: &'static str,
}

pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn local_timestamp() -> String {
    timestamp(&Local::now())
}

/// Writes `portfolio_report_<stamp>.csv` and `portfolio_summary_<stamp>.json`.
pub fn write_reports(
    output_dir: &Path,
    run: &PortfolioRun,
    stamp: &str,
) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let table = output_dir.join(format!("portfolio_report_{stamp}.csv"));
    let mut writer = csv::Writer::from_path(&table)?;
    for result in &run.results {
        writer.serialize(ReportRow::from_result(result))?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: table.clone(),
        source,
    })?;

    let summary = output_dir.join(format!("portfolio_summary_{stamp}.json"));
    let artifact = SummaryArtifact {
        expected_name: &run.expected_name,
        summary: &run.summary,
        overall_comment: run.summary.overall_assessment.summary(),
    };
    let body = serde_json::to_string_pretty(&artifact)?;
    fs::write(&summary, body).map_err(|source| ReportError::Io {
        path: summary.clone(),
        source,
    })?;

    Ok(ReportPaths { table, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::portfolio::names::verify_person;
    use crate::workflows::portfolio::scoring::PortfolioAnalyzer;
    use crate::workflows::portfolio::similarity::{self, MatchThresholds};
    use chrono::Utc;
    use serde_json::Value;

    fn result(filename: &str, text: &str) -> DocumentResult {
        let person = verify_person(text, "Иванов Иван");
        DocumentResult {
            filename: filename.to_string(),
            claimed: "Патент".to_string(),
            detected: "Патент".to_string(),
            description: "Патент на изобретение".to_string(),
            similarity: 1.0,
            sequence_ratio: 1.0,
            matched: true,
            analysis: person
                .matched
                .then(|| crate::workflows::portfolio::ExtractedFields::unstructured("сырой ответ")),
            person,
            text: text.to_string(),
        }
    }

    #[test]
    fn stamp_uses_compact_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().expect("valid date");
        assert_eq!(timestamp(&at), "20240309_070501");
    }

    #[test]
    fn writes_table_and_summary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = vec![
            result("patent.pdf", "Патентообладатель: Иванов Иван"),
            result("other.pdf", "чужой документ"),
        ];
        let verified = results
            .iter()
            .filter(|r| r.name_matched())
            .map(DocumentResult::classification)
            .collect::<Vec<_>>();
        let run = PortfolioRun {
            expected_name: "Иванов Иван".to_string(),
            summary: PortfolioAnalyzer::standard().analyze(&verified),
            results,
        };

        let paths = write_reports(dir.path(), &run, "20240309_070501").expect("writes");
        assert!(paths.table.ends_with("portfolio_report_20240309_070501.csv"));

        let mut reader = csv::Reader::from_path(&paths.table).expect("csv opens");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(headers.get(0), Some("Файл"));
        assert_eq!(headers.get(9), Some("Анализ"));

        let rows = reader.records().collect::<Result<Vec<_>, _>>().expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(4), Some("1.00"));
        assert_eq!(rows[0].get(7), Some("Да"));
        assert_eq!(rows[0].get(9), Some(r#"{"raw":"сырой ответ"}"#));
        assert_eq!(rows[1].get(7), Some("Нет"));
        assert_eq!(rows[1].get(9), Some(""));

        let summary: Value =
            serde_json::from_str(&fs::read_to_string(&paths.summary).expect("json")).expect("parses");
        assert_eq!(summary["total_score"], 1);
        assert_eq!(summary["max_score"], 8);
        assert_eq!(summary["overall_comment"], "Портфолио требует доработки.");
        assert_eq!(summary["scores"]["Научно-исследовательская работа"]["score"], 1);
    }

    #[test]
    fn unrelated_categories_render_unsigned_zero_similarity() {
        let mut row = result("thesis.pdf", "чужой документ");
        let outcome = similarity::evaluate("Патент", "Тезисы доклада", MatchThresholds::default());
        row.claimed = "Тезисы доклада".to_string();
        row.similarity = outcome.similarity;
        row.sequence_ratio = outcome.sequence_ratio;
        row.matched = outcome.matched;

        let rendered = ReportRow::from_result(&row);
        assert_eq!(rendered.similarity, "0.00");
        assert_eq!(rendered.matched, "Нет");
    }
}
