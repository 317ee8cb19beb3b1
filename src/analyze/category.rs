use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment bucket for a single article.
///
/// Half-open intervals: `(-inf, -2)`, `[-2, 0)`, `[0, 2)`, `[2, +inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentCategory {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 4] = [
        SentimentCategory::VeryNegative,
        SentimentCategory::Negative,
        SentimentCategory::Positive,
        SentimentCategory::VeryPositive,
    ];

    pub fn from_score(score: f64) -> Self {
        if score < -2.0 {
            SentimentCategory::VeryNegative
        } else if score < 0.0 {
            SentimentCategory::Negative
        } else if score < 2.0 {
            SentimentCategory::Positive
        } else {
            SentimentCategory::VeryPositive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SentimentCategory::VeryNegative => "Very Negative",
            SentimentCategory::Negative => "Negative",
            SentimentCategory::Positive => "Positive",
            SentimentCategory::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::SentimentCategory::*;
    use super::*;

    #[test]
    fn boundaries_are_half_open() {
        assert_eq!(SentimentCategory::from_score(-2.0), Negative);
        assert_eq!(SentimentCategory::from_score(-2.0000001), VeryNegative);
        assert_eq!(SentimentCategory::from_score(-0.0001), Negative);
        assert_eq!(SentimentCategory::from_score(0.0), Positive);
        assert_eq!(SentimentCategory::from_score(-0.0), Positive);
        assert_eq!(SentimentCategory::from_score(1.9999), Positive);
        assert_eq!(SentimentCategory::from_score(2.0), VeryPositive);
        assert_eq!(SentimentCategory::from_score(-9.0), VeryNegative);
    }

    #[test]
    fn labels_and_order() {
        let labels: Vec<String> = SentimentCategory::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            ["Very Negative", "Negative", "Positive", "Very Positive"]
        );
        assert!(VeryNegative < Negative && Positive < VeryPositive);
        assert_eq!(
            serde_json::to_string(&VeryPositive).unwrap(),
            "\"Very Positive\""
        );
    }
}
