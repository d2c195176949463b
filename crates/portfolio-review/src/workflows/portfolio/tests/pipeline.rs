use super::common::*;

use crate::workflows::portfolio::taxonomy::{DIPLOMA, EDUCATION_SECTION};
use crate::workflows::portfolio::{ExtractedFields, PipelineError};

const DIPLOMA_REPLY: &str = "Категория: Диплом бакалавра/специалиста\nОписание: Диплом о высшем образовании";
const PATENT_REPLY: &str = "Категория: Патент\nОписание: Патент на изобретение";

#[test]
fn processes_manifest_and_scores_only_verified_documents() {
    let input = input_dir(&["diploma.pdf", "patent.pdf", "blank.pdf"]);
    let extractor = MemoryExtractor::default()
        .with("diploma.pdf", &long_text("MARK-DIPLOMA"))
        .with("patent.pdf", "MARK-PATENT Патентообладатель: Петров Пётр")
        .with("blank.pdf", "   \n");
    let model = ScriptedModel::default()
        .reply("classify", "MARK-DIPLOMA", DIPLOMA_REPLY)
        .reply("classify", "MARK-PATENT", PATENT_REPLY)
        .reply(
            "analyze",
            "MARK-DIPLOMA",
            r#"Результат: {"institution": "МГУ", "qualification": "бакалавр", "issue_date": "2020", "reg_number": "1"}"#,
        );
    let pipeline = pipeline(extractor, model, input.path());

    let run = pipeline
        .run(&manifest(&[
            ("diploma.pdf", DIPLOMA),
            ("patent.pdf", "Патент"),
            ("missing.pdf", "Патент"),
            ("blank.pdf", "Патент"),
        ]))
        .expect("two documents processed");

    assert_eq!(run.results.len(), 2);
    let diploma = &run.results[0];
    assert_eq!(diploma.detected, DIPLOMA);
    assert!(diploma.matched);
    assert!(diploma.name_matched());
    assert_eq!(
        diploma.analysis.as_ref().and_then(|fields| fields.field("institution")),
        Some(&serde_json::json!("МГУ"))
    );

    let patent = &run.results[1];
    assert_eq!(patent.detected, "Патент");
    assert!(!patent.name_matched());
    assert!(patent.analysis.is_none());
    assert_eq!(pipeline.classifier().model().calls_tagged("analyze"), 1);

    let education = run.summary.scores.get(EDUCATION_SECTION).expect("education scored");
    assert_eq!((education.score, education.max), (1, 2));
    let research = run
        .summary
        .scores
        .get("Научно-исследовательская работа")
        .expect("research scored");
    assert_eq!(research.score, 0);
    assert_eq!(run.summary.total_score, 1);
}

#[test]
fn mismatched_claim_is_flagged() {
    let input = input_dir(&["doc.pdf"]);
    let extractor = MemoryExtractor::default().with("doc.pdf", &long_text("MARK-PATENT"));
    let model = ScriptedModel::default().reply("classify", "MARK-PATENT", PATENT_REPLY);

    let run = pipeline(extractor, model, input.path())
        .run(&manifest(&[("doc.pdf", "Сертификат IELTS/TOEFL")]))
        .expect("processed");

    assert!(!run.results[0].matched);
    assert!(run.results[0].similarity < 0.65);
}

#[test]
fn unparseable_answers_fall_back_to_other() {
    let input = input_dir(&["doc.pdf"]);
    let extractor = MemoryExtractor::default().with("doc.pdf", &long_text("MARK-ODD"));
    let model = ScriptedModel::default()
        .reply("classify", "MARK-ODD", "не знаю")
        .reply("analyze", "MARK-ODD", "просто текст без JSON");

    let run = pipeline(extractor, model, input.path())
        .run(&manifest(&[("doc.pdf", "")]))
        .expect("processed");

    let result = &run.results[0];
    assert_eq!(result.detected, "Иное");
    assert_eq!(
        result.analysis,
        Some(ExtractedFields::unstructured("просто текст без JSON"))
    );
    assert!(run
        .summary
        .comments
        .iter()
        .any(|comment| comment.contains("структура ответа от LLM нераспознана")));
}

#[test]
fn empty_run_is_an_error() {
    let input = input_dir(&[]);
    let result = pipeline(MemoryExtractor::default(), ScriptedModel::default(), input.path())
        .run(&manifest(&[("missing.pdf", "Патент")]));
    assert!(matches!(result, Err(PipelineError::NothingProcessed)));
}

#[test]
fn unavailable_model_aborts_the_run() {
    let input = input_dir(&["doc.pdf", "second.pdf"]);
    let extractor = MemoryExtractor::default()
        .with("doc.pdf", &long_text("MARK-A"))
        .with("second.pdf", &long_text("MARK-B"));
    let pipeline = pipeline(extractor, ScriptedModel::unavailable(), input.path());

    let result = pipeline.run(&manifest(&[("doc.pdf", "Патент"), ("second.pdf", "Патент")]));

    assert!(matches!(result, Err(PipelineError::Model(_))));
    assert_eq!(pipeline.classifier().model().calls_tagged("classify"), 1);
}
