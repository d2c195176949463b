use super::taxonomy::{DIPLOMA, DIPLOMA_APPENDIX, PUBLICATION_LIST};

/// Characters of document text forwarded to the model.
pub(crate) const TEXT_PREVIEW_CHARS: usize = 2000;

pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(TEXT_PREVIEW_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

pub(crate) fn classification_prompt(text: &str, categories: &[&str]) -> String {
    let listing = categories
        .iter()
        .map(|category| format!("- {category}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Ты — помощник приёмной комиссии. Определи, к какой категории относится текст документа.\n\
         Ответь строго в формате:\n\
         Категория: <одна из категорий>\n\
         Описание: <одно предложение>\n\
         \n\
         Категории:\n\
         {listing}\n\
         \n\
         Пример ответа:\n\
         Категория: Патент\n\
         Описание: Патент на полезную модель, выданный Роспатентом.\n\
         \n\
         Текст документа (первые {TEXT_PREVIEW_CHARS} символов):\n\
         {}",
        preview(text)
    )
}

pub(crate) fn analysis_prompt(text: &str, category: &str) -> String {
    let body = match category {
        DIPLOMA => DIPLOMA_PROMPT.to_string(),
        DIPLOMA_APPENDIX => APPENDIX_PROMPT.to_string(),
        PUBLICATION_LIST => PUBLICATIONS_PROMPT.to_string(),
        "Подтверждение индексации публикаций" => INDEXING_PROMPT.to_string(),
        "Сертификат участника конференции" => CONFERENCE_PROMPT.to_string(),
        "Тезисы доклада" => THESES_PROMPT.to_string(),
        "Диплом победителя олимпиад/конкурсов" => OLYMPIAD_PROMPT.to_string(),
        "Сертификат о прохождении курса/стажировки" => COURSE_PROMPT.to_string(),
        "Сертификат IELTS/TOEFL" => LANGUAGE_TEST_PROMPT.to_string(),
        "Патент" | "Акт о внедрении" | "Подтверждение участия в гранте" => {
            RESEARCH_PROMPT.to_string()
        }
        "Справка о педагогическом стаже" | "Рабочая программа курса" | "Учебное пособие" => {
            TEACHING_PROMPT.to_string()
        }
        "Грамота / благодарность" | "Диплом спортивного соревнования" => {
            ACTIVITY_PROMPT.to_string()
        }
        "Заявление темы магистерской диссертации" => THESIS_TOPIC_PROMPT.to_string(),
        other => format!(
            "Документ отнесён к категории \"{other}\".\n\
             Кратко проанализируй содержимое: выдели ключевые элементы и важные поля, \
             прокомментируй формат и полноту информации.\n\
             Верни JSON:\n\
             {{\n  \"summary\": \"\",\n  \"comment\": \"\"\n}}"
        ),
    };

    format!(
        "{body}\n\nТекст документа (до {TEXT_PREVIEW_CHARS} символов):\n{}",
        preview(text)
    )
}

const DIPLOMA_PROMPT: &str = r#"Документ считается дипломом бакалавра/специалиста.
Извлеки поля: ФИО выпускника, учебное заведение, квалификацию, направление подготовки,
дату выдачи, регистрационный номер и упоминание государственной аттестационной комиссии.
Верни JSON:
{
  "name": "",
  "institution": "",
  "qualification": "",
  "major": "",
  "issue_date": "",
  "reg_number": "",
  "has_gak": false,
  "comment": ""
}
Ненайденные поля оставь пустой строкой или false. В "comment" оцени полноту диплома."#;

const APPENDIX_PROMPT: &str = r#"Документ считается приложением к диплому.
Извлеки дисциплины с оценками, их количество, сведения об итоговой работе и объём зачётных единиц.
Верни JSON:
{
  "courses": [{"discipline": "", "grade": ""}],
  "total_courses": 0,
  "has_final_work": false,
  "total_credits": "",
  "comment": ""
}
Отсутствующие поля оставь пустыми или false."#;

const PUBLICATIONS_PROMPT: &str = r#"Документ считается списком научных публикаций.
Для каждой публикации извлеки название, журнал или конференцию, год и DOI/URL.
Верни JSON:
{
  "publications": [{"title": "", "venue": "", "year": "", "doi": ""}],
  "total_publications": 0,
  "comment": ""
}"#;

const INDEXING_PROMPT: &str = r#"Документ считается подтверждением индексации публикаций (Scopus, WoS и т.п.).
Извлеки журналы или статьи с квартилем и общее число проиндексированных статей.
Верни JSON:
{
  "indexed_items": [{"title": "", "journal": "", "index_rank": ""}],
  "total_indexed": 0,
  "comment": ""
}"#;

const CONFERENCE_PROMPT: &str = r#"Документ считается сертификатом участника конференции.
Извлеки название конференции, дату, роль участника и тему доклада.
Верни JSON:
{
  "conference": "",
  "date": "",
  "role": "",
  "talk_title": "",
  "comment": ""
}"#;

const THESES_PROMPT: &str = r#"Документ считается тезисами доклада.
Извлеки название доклада, конференцию или сборник, год и ключевые слова.
Верни JSON:
{
  "title": "",
  "venue": "",
  "year": "",
  "keywords": [],
  "comment": ""
}"#;

const OLYMPIAD_PROMPT: &str = r#"Документ считается дипломом победителя или призёра олимпиады/конкурса.
Извлеки название мероприятия, дату, занятое место и уровень мероприятия.
Верни JSON:
{
  "event": "",
  "date": "",
  "place": "",
  "level": "",
  "comment": ""
}"#;

const COURSE_PROMPT: &str = r#"Документ считается сертификатом о прохождении курса или стажировки.
Извлеки название курса, организатора, даты начала и окончания и объём.
Верни JSON:
{
  "course": "",
  "provider": "",
  "start_date": "",
  "end_date": "",
  "duration": "",
  "comment": ""
}"#;

const LANGUAGE_TEST_PROMPT: &str = r#"Документ считается сертификатом IELTS или TOEFL.
Извлеки тип теста, баллы по секциям и дату тестирования.
Верни JSON:
{
  "test_type": "",
  "scores": {"listening": "", "reading": "", "writing": "", "speaking": ""},
  "date": "",
  "comment": ""
}"#;

const RESEARCH_PROMPT: &str = r#"Документ относится к научно-исследовательской работе (патент, акт о внедрении, грант).
Для патента извлеки название, номер, дату и заявителя; для акта о внедрении организацию,
описание и дату; для гранта название, роль заявителя и период.
Верни JSON:
{
  "info": {},
  "comment": ""
}"#;

const TEACHING_PROMPT: &str = r#"Документ относится к педагогической деятельности.
Для справки о стаже извлеки организацию, период и должность; для рабочей программы название,
цели и объём курса; для учебного пособия название, ISBN и авторов.
Верни JSON:
{
  "info": {},
  "comment": ""
}"#;

const ACTIVITY_PROMPT: &str = r#"Документ относится к общественной или спортивной деятельности.
Извлеки мероприятие или организацию, повод, дату и роль либо достижение.
Верни JSON:
{
  "info": {},
  "comment": ""
}"#;

const THESIS_TOPIC_PROMPT: &str = r#"Документ является заявлением темы магистерской диссертации.
Извлеки ФИО студента, тему, научного руководителя и дату подачи.
Верни JSON:
{
  "student_name": "",
  "thesis_topic": "",
  "supervisor": "",
  "date": "",
  "comment": ""
}"#;
