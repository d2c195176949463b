use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TFIDF_THRESHOLD: f64 = 0.65;
pub const DEFAULT_SEQ_THRESHOLD: f64 = 0.70;

/// Gates for deciding whether a detected category agrees with the claimed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub tfidf: f64,
    pub sequence: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            tfidf: DEFAULT_TFIDF_THRESHOLD,
            sequence: DEFAULT_SEQ_THRESHOLD,
        }
    }
}

/// Both similarity measures plus the resulting decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub similarity: f64,
    pub sequence_ratio: f64,
    pub matched: bool,
}

/// Trim, lowercase and collapse inner whitespace.
pub fn normalize_label(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// TF-IDF cosine similarity of two labels treated as a two-document corpus.
///
/// Returns 0.0 when either label is empty after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_label(a);
    let b = normalize_label(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    tfidf_cosine(&a, &b)
}

/// Character-level matching ratio `2*M / (|a| + |b|)` over normalized labels.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a = normalize_label(a).chars().collect::<Vec<_>>();
    let b = normalize_label(b).chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

pub fn is_match(detected: &str, claimed: &str) -> bool {
    evaluate(detected, claimed, MatchThresholds::default()).matched
}

pub fn evaluate(detected: &str, claimed: &str, thresholds: MatchThresholds) -> MatchOutcome {
    if normalize_label(detected).is_empty() && normalize_label(claimed).is_empty() {
        return MatchOutcome {
            similarity: 0.0,
            sequence_ratio: 1.0,
            matched: true,
        };
    }

    let similarity = similarity(detected, claimed);
    let sequence_ratio = sequence_ratio(detected, claimed);
    MatchOutcome {
        similarity,
        sequence_ratio,
        matched: similarity >= thresholds.tfidf || sequence_ratio >= thresholds.sequence,
    }
}

fn tokenize(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if token.chars().count() >= 2 {
            *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn tfidf_cosine(a: &str, b: &str) -> f64 {
    let terms_a = tokenize(a);
    let terms_b = tokenize(b);
    if terms_a.is_empty() || terms_b.is_empty() {
        return 0.0;
    }

    // smoothed idf over the two-document corpus
    let idf = |term: &str| {
        let df = [&terms_a, &terms_b]
            .iter()
            .filter(|terms| terms.contains_key(term))
            .count() as f64;
        (3.0 / (1.0 + df)).ln() + 1.0
    };

    let weights_a: BTreeMap<&str, f64> = terms_a
        .iter()
        .map(|(term, tf)| (term.as_str(), tf * idf(term)))
        .collect();
    let weights_b: BTreeMap<&str, f64> = terms_b
        .iter()
        .map(|(term, tf)| (term.as_str(), tf * idf(term)))
        .collect();

    let norm_a = weights_a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = weights_b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f64 = weights_a
        .iter()
        .filter_map(|(term, wa)| weights_b.get(term).map(|wb| wa * wb))
        .sum();
    // an empty f64 sum is -0.0
    if dot <= 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Ratcliff/Obershelp block matching, without a junk predicate.
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= 200 {
            let popular = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular);
        }

        Self { a, b, b2j }
    }

    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let run = match j.checked_sub(1) {
                        Some(prev) => j2len.get(&prev).copied().unwrap_or(0),
                        None => 0,
                    };
                    let k = run + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_labels_are_fully_similar() {
        assert!(similarity("Диплом", "Диплом") >= 0.9);
        assert!(is_match("Диплом", "Диплом"));
    }

    #[test]
    fn unrelated_labels_do_not_match() {
        assert!(similarity("Диплом", "Аттестат") < 0.5);
        assert!(!is_match("Диплом", "Аттестат"));
    }

    #[test]
    fn empty_inputs_have_zero_similarity() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("Патент", "   "), 0.0);
    }

    #[test]
    fn both_empty_counts_as_match() {
        assert!(is_match("", ""));
        assert!(is_match("  ", "\t"));
        assert!(!is_match("Диплом", ""));
    }

    #[test]
    fn case_and_whitespace_are_ignored() {
        assert!(is_match("  ПАТЕНТ ", "патент"));
        assert!((similarity("Тезисы   доклада", "тезисы доклада") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_label_overlap_passes_tfidf_gate() {
        let score = similarity("Диплом бакалавра/специалиста", "Диплом бакалавра");
        assert!(score > 0.65 && score < 1.0, "got {score}");
        assert!(is_match("Диплом бакалавра/специалиста", "Диплом бакалавра"));
    }

    #[test]
    fn sequence_gate_rescues_single_token_typos() {
        // no shared tokens, so only the character ratio can match
        assert_eq!(similarity("Патент", "Патенты"), 0.0);
        assert!(sequence_ratio("Патент", "Патенты") >= 0.7);
        assert!(is_match("Патент", "Патенты"));
    }

    #[test]
    fn thresholds_are_independent_gates() {
        let strict = MatchThresholds {
            tfidf: 1.1,
            sequence: 1.1,
        };
        assert!(!evaluate("Патент", "Патенты", strict).matched);

        let loose_sequence = MatchThresholds {
            tfidf: 1.1,
            sequence: 0.5,
        };
        assert!(evaluate("Патент", "Патенты", loose_sequence).matched);
    }

    #[test]
    fn sequence_ratio_matches_reference_values() {
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_labels_report_positive_zero() {
        let score = similarity("Патент", "Тезисы доклада");
        assert_eq!(score, 0.0);
        assert!(!score.is_sign_negative());

        let outcome = evaluate("Патент", "Сертификат IELTS/TOEFL", MatchThresholds::default());
        assert!(!outcome.similarity.is_sign_negative());
        let raw = serde_json::to_string(&outcome).expect("serializes");
        assert!(raw.starts_with(r#"{"similarity":0.0,"#), "got {raw}");
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        assert_eq!(similarity("1 2", "1 2"), 0.0);
    }
}
