use serde::{Deserialize, Serialize};

const STRONG_THRESHOLD: f64 = 80.0;
const AVERAGE_THRESHOLD: f64 = 50.0;

/// Qualitative band derived from the portfolio percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallAssessment {
    Strong,
    Average,
    NeedsImprovement,
}

impl OverallAssessment {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= STRONG_THRESHOLD {
            Self::Strong
        } else if percent >= AVERAGE_THRESHOLD {
            Self::Average
        } else {
            Self::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }

    /// Sentence used in human-facing reports.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Strong => "Портфолио оценивается как сильное.",
            Self::Average => "Портфолио оценивается как среднее.",
            Self::NeedsImprovement => "Портфолио требует доработки.",
        }
    }
}
