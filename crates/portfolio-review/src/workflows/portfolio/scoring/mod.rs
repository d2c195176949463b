mod assessment;
mod comments;
mod rules;

pub use assessment::OverallAssessment;

use super::domain::DocumentClassification;
use super::taxonomy::Taxonomy;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Stateless analyzer that applies a taxonomy to a batch of classified documents.
#[derive(Debug, Clone)]
pub struct PortfolioAnalyzer {
    taxonomy: Taxonomy,
}

impl PortfolioAnalyzer {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn standard() -> Self {
        Self::new(Taxonomy::standard())
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn analyze(&self, documents: &[DocumentClassification]) -> PortfolioSummary {
        let buckets = rules::bucket_documents(&self.taxonomy, documents);

        let mut scores = Vec::with_capacity(buckets.len());
        let mut notes = Vec::new();
        let mut total_score = 0;
        let mut max_score = 0;

        for (section, docs) in self.taxonomy.sections().iter().zip(&buckets) {
            let tally = rules::score_section(section, docs);
            total_score += tally.score;
            max_score += tally.max;

            notes.push(comments::section_comment(&section.name, &tally));
            for doc in docs {
                let rule = self.taxonomy.rule_for(&doc.detected_category);
                notes.extend(comments::document_comments(doc, rule));
            }

            scores.push(SectionScore {
                section: section.name.clone(),
                score: tally.score,
                max: tally.max,
            });
        }

        let percent = percent_of(total_score, max_score);

        PortfolioSummary {
            scores: SectionScores(scores),
            total_score,
            max_score,
            percent,
            overall_assessment: OverallAssessment::from_percent(percent),
            comments: notes,
        }
    }
}

impl Default for PortfolioAnalyzer {
    fn default() -> Self {
        Self::standard()
    }
}

fn percent_of(total: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    let raw = f64::from(total) / f64::from(max) * 100.0;
    (raw * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionScore {
    pub section: String,
    pub score: u32,
    pub max: u32,
}

/// Section scores in taxonomy order, serialized as `{ "<section>": {score, max} }`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionScores(Vec<SectionScore>);

impl SectionScores {
    pub fn iter(&self) -> std::slice::Iter<'_, SectionScore> {
        self.0.iter()
    }

    pub fn get(&self, section: &str) -> Option<&SectionScore> {
        self.0.iter().find(|entry| entry.section == section)
    }
}

impl<'a> IntoIterator for &'a SectionScores {
    type Item = &'a SectionScore;
    type IntoIter = std::slice::Iter<'a, SectionScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Serialize)]
struct ScoreEntry {
    score: u32,
    max: u32,
}

impl Serialize for SectionScores {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(
                &entry.section,
                &ScoreEntry {
                    score: entry.score,
                    max: entry.max,
                },
            )?;
        }
        map.end()
    }
}

/// Aggregate result of a portfolio analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub scores: SectionScores,
    pub total_score: u32,
    pub max_score: u32,
    pub percent: f64,
    pub overall_assessment: OverallAssessment,
    pub comments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(2, 3), 66.7);
        assert_eq!(percent_of(8, 8), 100.0);
    }

    #[test]
    fn percent_guards_zero_denominator() {
        assert_eq!(percent_of(0, 0), 0.0);
    }

    #[test]
    fn section_scores_serialize_in_taxonomy_order() {
        let scores = SectionScores(vec![
            SectionScore {
                section: "B".to_string(),
                score: 1,
                max: 1,
            },
            SectionScore {
                section: "A".to_string(),
                score: 0,
                max: 2,
            },
        ]);

        let raw = serde_json::to_string(&scores).expect("serializes");
        assert_eq!(
            raw,
            r#"{"B":{"score":1,"max":1},"A":{"score":0,"max":2}}"#
        );
    }
}
