use super::super::domain::{DocumentClassification, ExtractedFields};
use super::super::taxonomy::DocumentRule;
use super::rules::SectionTally;
use serde_json::{Map, Value};

pub(crate) const SHORT_TEXT_THRESHOLD: usize = 200;

pub(crate) fn section_comment(section: &str, tally: &SectionTally) -> String {
    if tally.score == 0 {
        format!("[{section}] — нет предоставленных документов.")
    } else if tally.score < tally.max {
        format!(
            "[{section}] — документы представлены частично: отсутствуют {}.",
            tally.missing.join(", ")
        )
    } else {
        format!("[{section}] — документы представлены.")
    }
}

/// Field-completeness and text-length notes for one document.
pub(crate) fn document_comments(
    doc: &DocumentClassification,
    rule: Option<&DocumentRule>,
) -> Vec<String> {
    let name = doc.filename.as_str();
    let mut notes = Vec::new();

    match &doc.extracted_fields {
        ExtractedFields::Unstructured { .. } => notes.push(format!(
            "[{name}] — структура ответа от LLM нераспознана, требуется проверка вручную."
        )),
        ExtractedFields::Structured(fields) => {
            if let Some(rule) = rule {
                notes.push(check_fields(name, fields, rule));
            }
        }
    }

    if doc.full_text.trim().chars().count() < SHORT_TEXT_THRESHOLD {
        notes.push(format!(
            "[{name}] — короткий распознанный текст (менее {SHORT_TEXT_THRESHOLD} символов)."
        ));
    }

    notes
}

fn check_fields(name: &str, fields: &Map<String, Value>, rule: &DocumentRule) -> String {
    match rule {
        DocumentRule::DiplomaFields { fields: required } => {
            let missing = required
                .iter()
                .filter(|field| is_blank(fields.get(field.as_str())))
                .map(String::as_str)
                .collect::<Vec<_>>();
            if missing.is_empty() {
                format!("[{name}] — диплом содержит все ключевые поля.")
            } else {
                format!(
                    "[{name}] — в дипломе отсутствуют поля: {}.",
                    missing.join(", ")
                )
            }
        }
        DocumentRule::CourseList { key, minimum } => match fields.get(key) {
            Some(Value::Array(courses)) if courses.len() < *minimum => {
                format!("[{name}] — обнаружено мало дисциплин ({}).", courses.len())
            }
            Some(Value::Array(courses)) => {
                format!("[{name}] — приложение содержит {} дисциплин.", courses.len())
            }
            _ => format!("[{name}] — не удалось извлечь список дисциплин."),
        },
        DocumentRule::PublicationList { key } => match fields.get(key) {
            Some(Value::Array(publications)) if publications.is_empty() => {
                format!("[{name}] — список публикаций пуст или не распознан.")
            }
            Some(Value::Array(publications)) => format!(
                "[{name}] — количество распознанных публикаций: {}.",
                publications.len()
            ),
            _ => format!("[{name}] — не удалось извлечь публикации."),
        },
    }
}

/// Absent, null, false, zero and empty values all count as missing.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}
