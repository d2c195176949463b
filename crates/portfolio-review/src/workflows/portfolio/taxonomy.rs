use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const EDUCATION_SECTION: &str = "Документы об образовании";
pub const OTHER_SECTION: &str = "Прочее";

pub const DIPLOMA: &str = "Диплом бакалавра/специалиста";
pub const DIPLOMA_APPENDIX: &str = "Приложение к диплому";
pub const PUBLICATION_LIST: &str = "Список научных публикаций";

/// How a section converts the documents it received into points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionScoring {
    /// One point when any document landed in the section.
    Presence,
    /// One point per required category present.
    RequiredItems { items: Vec<RequiredItem> },
}

impl Default for SectionScoring {
    fn default() -> Self {
        Self::Presence
    }
}

/// A category that must be present for a section to earn its full score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredItem {
    pub category: String,
    /// Name used in comments when the item is missing.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub scoring: SectionScoring,
}

impl SectionSpec {
    /// Points available once the section holds at least one document.
    pub fn full_score(&self) -> u32 {
        match &self.scoring {
            SectionScoring::Presence => 1,
            SectionScoring::RequiredItems { items } => items.len() as u32,
        }
    }

    /// Denominator contribution: an empty section still counts one point.
    pub fn max_score(&self, document_count: usize) -> u32 {
        if document_count == 0 {
            1
        } else {
            self.full_score()
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|known| known == category)
    }
}

/// Field-completeness check applied to structured extraction results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentRule {
    DiplomaFields { fields: Vec<String> },
    CourseList { key: String, minimum: usize },
    PublicationList { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub check: DocumentRule,
}

/// Immutable category-to-section table injected into the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyFile")]
pub struct Taxonomy {
    sections: Vec<SectionSpec>,
    fallback_section: String,
    document_rules: Vec<CategoryRule>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    fallback_index: usize,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    sections: Vec<SectionSpec>,
    fallback_section: String,
    #[serde(default)]
    document_rules: Vec<CategoryRule>,
}

impl TryFrom<TaxonomyFile> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(file: TaxonomyFile) -> Result<Self, Self::Error> {
        Taxonomy::new(file.sections, file.fallback_section, file.document_rules)
    }
}

impl Taxonomy {
    pub fn new(
        sections: Vec<SectionSpec>,
        fallback_section: impl Into<String>,
        document_rules: Vec<CategoryRule>,
    ) -> Result<Self, TaxonomyError> {
        let fallback_section = fallback_section.into();
        if sections.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut names = HashSet::new();
        let mut index = HashMap::new();
        for (position, section) in sections.iter().enumerate() {
            if !names.insert(section.name.as_str()) {
                return Err(TaxonomyError::DuplicateSection(section.name.clone()));
            }
            for category in &section.categories {
                if let Some(previous) = index.insert(category.clone(), position) {
                    return Err(TaxonomyError::DuplicateCategory {
                        category: category.clone(),
                        first: sections[previous].name.clone(),
                        second: section.name.clone(),
                    });
                }
            }
            if let SectionScoring::RequiredItems { items } = &section.scoring {
                if items.is_empty() {
                    return Err(TaxonomyError::NoRequiredItems(section.name.clone()));
                }
                if let Some(item) = items.iter().find(|item| !section.contains(&item.category)) {
                    return Err(TaxonomyError::RequiredItemOutsideSection {
                        section: section.name.clone(),
                        category: item.category.clone(),
                    });
                }
                if let Some(category) = section
                    .categories
                    .iter()
                    .find(|category| !items.iter().any(|item| &item.category == *category))
                {
                    return Err(TaxonomyError::UnscoredCategory {
                        section: section.name.clone(),
                        category: category.clone(),
                    });
                }
            }
        }

        let fallback_index = sections
            .iter()
            .position(|section| section.name == fallback_section)
            .ok_or_else(|| TaxonomyError::MissingFallback(fallback_section.clone()))?;

        Ok(Self {
            sections,
            fallback_section,
            document_rules,
            index,
            fallback_index,
        })
    }

    /// The eight-section admissions table.
    pub fn standard() -> Self {
        let presence = |name: &str, categories: &[&str]| SectionSpec {
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            scoring: SectionScoring::Presence,
        };

        let sections = vec![
            SectionSpec {
                name: EDUCATION_SECTION.to_string(),
                categories: vec![DIPLOMA.to_string(), DIPLOMA_APPENDIX.to_string()],
                scoring: SectionScoring::RequiredItems {
                    items: vec![
                        RequiredItem {
                            category: DIPLOMA.to_string(),
                            label: "диплом".to_string(),
                        },
                        RequiredItem {
                            category: DIPLOMA_APPENDIX.to_string(),
                            label: "приложение к диплому".to_string(),
                        },
                    ],
                },
            },
            presence(
                "Научные публикации",
                &[PUBLICATION_LIST, "Подтверждение индексации публикаций"],
            ),
            presence(
                "Участие в конференциях",
                &["Сертификат участника конференции", "Тезисы доклада"],
            ),
            presence(
                "Олимпиады, конкурсы, доп. образование",
                &[
                    "Диплом победителя олимпиад/конкурсов",
                    "Сертификат о прохождении курса/стажировки",
                    "Сертификат IELTS/TOEFL",
                ],
            ),
            presence(
                "Научно-исследовательская работа",
                &["Патент", "Акт о внедрении", "Подтверждение участия в гранте"],
            ),
            presence(
                "Педагогическая деятельность",
                &[
                    "Справка о педагогическом стаже",
                    "Рабочая программа курса",
                    "Учебное пособие",
                ],
            ),
            presence(
                "Общественная и спортивная деятельность",
                &["Грамота / благодарность", "Диплом спортивного соревнования"],
            ),
            presence(
                OTHER_SECTION,
                &["Заявление темы магистерской диссертации", "Иное"],
            ),
        ];

        let document_rules = vec![
            CategoryRule {
                category: DIPLOMA.to_string(),
                check: DocumentRule::DiplomaFields {
                    fields: ["institution", "qualification", "issue_date", "reg_number"]
                        .iter()
                        .map(|f| f.to_string())
                        .collect(),
                },
            },
            CategoryRule {
                category: DIPLOMA_APPENDIX.to_string(),
                check: DocumentRule::CourseList {
                    key: "courses".to_string(),
                    minimum: 3,
                },
            },
            CategoryRule {
                category: PUBLICATION_LIST.to_string(),
                check: DocumentRule::PublicationList {
                    key: "publications".to_string(),
                },
            },
        ];

        Self::new(sections, OTHER_SECTION, document_rules)
            .unwrap_or_else(|err| unreachable!("standard taxonomy is valid: {err}"))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyError> {
        serde_json::from_str(raw).map_err(TaxonomyError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn fallback_section(&self) -> &str {
        &self.fallback_section
    }

    /// Index of the section a category belongs to, or the fallback section.
    pub fn section_index(&self, category: &str) -> usize {
        self.index
            .get(category)
            .copied()
            .unwrap_or(self.fallback_index)
    }

    pub fn section_for(&self, category: &str) -> &SectionSpec {
        &self.sections[self.section_index(category)]
    }

    /// Every known category label in declaration order.
    pub fn categories(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|section| section.categories.iter().map(String::as_str))
            .collect()
    }

    pub fn rule_for(&self, category: &str) -> Option<&DocumentRule> {
        self.document_rules
            .iter()
            .find(|rule| rule.category == category)
            .map(|rule| &rule.check)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("taxonomy must declare at least one section")]
    Empty,
    #[error("section '{0}' is declared more than once")]
    DuplicateSection(String),
    #[error("category '{category}' is listed in both '{first}' and '{second}'")]
    DuplicateCategory {
        category: String,
        first: String,
        second: String,
    },
    #[error("section '{0}' uses required-item scoring without any items")]
    NoRequiredItems(String),
    #[error("required category '{category}' is not listed in section '{section}'")]
    RequiredItemOutsideSection { section: String, category: String },
    #[error("category '{category}' in section '{section}' is not one of its required items")]
    UnscoredCategory { section: String, category: String },
    #[error("fallback section '{0}' is not declared")]
    MissingFallback(String),
    #[error("unable to read taxonomy {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid taxonomy definition: {0}")]
    Parse(serde_json::Error),
}
