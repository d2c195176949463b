use super::super::domain::DocumentClassification;
use super::super::taxonomy::{SectionScoring, SectionSpec, Taxonomy};

pub(crate) struct SectionTally {
    pub score: u32,
    pub max: u32,
    pub missing: Vec<String>,
}

/// Groups documents by section, preserving input order inside each bucket.
pub(crate) fn bucket_documents<'a>(
    taxonomy: &Taxonomy,
    documents: &'a [DocumentClassification],
) -> Vec<Vec<&'a DocumentClassification>> {
    let mut buckets = vec![Vec::new(); taxonomy.sections().len()];
    for doc in documents {
        let index = taxonomy.section_index(&doc.detected_category);
        buckets[index].push(doc);
    }
    buckets
}

pub(crate) fn score_section(
    section: &SectionSpec,
    documents: &[&DocumentClassification],
) -> SectionTally {
    let max = section.max_score(documents.len());

    match &section.scoring {
        SectionScoring::Presence => SectionTally {
            score: u32::from(!documents.is_empty()),
            max,
            missing: Vec::new(),
        },
        SectionScoring::RequiredItems { items } => {
            let mut score = 0;
            let mut missing = Vec::new();
            for item in items {
                let present = documents
                    .iter()
                    .any(|doc| doc.detected_category == item.category);
                if present {
                    score += 1;
                } else {
                    missing.push(item.label.clone());
                }
            }
            SectionTally {
                score,
                max,
                missing,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::portfolio::domain::ExtractedFields;
    use crate::workflows::portfolio::taxonomy::{
        DIPLOMA, DIPLOMA_APPENDIX, EDUCATION_SECTION, OTHER_SECTION,
    };

    fn doc(category: &str) -> DocumentClassification {
        DocumentClassification {
            filename: format!("{category}.pdf"),
            detected_category: category.to_string(),
            claimed_category: String::new(),
            extracted_fields: ExtractedFields::default(),
            full_text: String::new(),
        }
    }

    #[test]
    fn unmatched_categories_land_in_fallback_bucket() {
        let taxonomy = Taxonomy::standard();
        let docs = vec![doc("Паспорт"), doc(DIPLOMA)];

        let buckets = bucket_documents(&taxonomy, &docs);
        let other = taxonomy
            .sections()
            .iter()
            .position(|s| s.name == OTHER_SECTION)
            .expect("fallback present");

        assert_eq!(buckets[0].len(), 1);
        assert_eq!(buckets[other][0].detected_category, "Паспорт");
        assert_eq!(buckets.iter().map(Vec::len).sum::<usize>(), 2);
    }

    #[test]
    fn education_scores_each_required_item() {
        let taxonomy = Taxonomy::standard();
        let education = taxonomy.section_for(DIPLOMA);
        assert_eq!(education.name, EDUCATION_SECTION);

        let diploma = doc(DIPLOMA);
        let appendix = doc(DIPLOMA_APPENDIX);

        let empty = score_section(education, &[]);
        assert_eq!((empty.score, empty.max), (0, 1));

        let partial = score_section(education, &[&diploma]);
        assert_eq!((partial.score, partial.max), (1, 2));
        assert_eq!(partial.missing, vec!["приложение к диплому".to_string()]);

        let only_appendix = score_section(education, &[&appendix, &appendix]);
        assert_eq!(only_appendix.score, 1);
        assert_eq!(only_appendix.missing, vec!["диплом".to_string()]);

        let full = score_section(education, &[&appendix, &diploma]);
        assert_eq!((full.score, full.max), (2, 2));
        assert!(full.missing.is_empty());
    }

    #[test]
    fn presence_sections_are_binary() {
        let taxonomy = Taxonomy::standard();
        let research = taxonomy.section_for("Патент");
        let patent = doc("Патент");
        let grant = doc("Подтверждение участия в гранте");

        let tally = score_section(research, &[&patent, &grant, &patent]);
        assert_eq!((tally.score, tally.max), (1, 1));
        assert_eq!(score_section(research, &[]).score, 0);
    }
}
