// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! VADER sentiment scoring for journal text
//!
//! `compound` is the normalized valence in [-1, 1]; the other three fields
//! are the positive/neutral/negative proportions of the text.

use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Sentiment scores for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SentimentScores {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Score a piece of text
pub fn analyze(text: &str) -> SentimentScores {
    if !text.chars().any(char::is_alphanumeric) {
        return SentimentScores::default();
    }

    let analyzer = SentimentIntensityAnalyzer::new();
    let scores = analyzer.polarity_scores(text);
    let score = |key: &str| scores.get(key).copied().filter(|v| v.is_finite()).unwrap_or(0.0);

    SentimentScores {
        compound: round4(score("compound")),
        positive: round3(score("pos")),
        neutral: round3(score("neu")),
        negative: round3(score("neg")),
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(analyze(""), SentimentScores::default());
        assert_eq!(analyze("   ...  "), SentimentScores::default());
    }

    #[test]
    fn test_neutral_text() {
        let s = analyze("I went to the office and came home");
        assert_eq!(s.compound, 0.0);
        assert_eq!(s.neutral, 1.0);
        assert_eq!(s.positive, 0.0);
    }

    #[test]
    fn test_reference_scores() {
        let s = analyze("The book was good.");
        assert_eq!(s.compound, 0.4404);
        assert_eq!(s.positive, 0.492);
        assert_eq!(s.neutral, 0.508);
        assert_eq!(s.negative, 0.0);

        assert_eq!(analyze("good").compound, 0.4404);
        assert_eq!(analyze("I feel sad").compound, -0.4767);
    }

    #[test]
    fn test_positive_and_negative() {
        let happy = analyze("Today was a wonderful day and I feel happy and grateful");
        assert!(happy.compound > 0.5, "{:?}", happy);
        assert!(happy.positive > happy.negative);

        let sad = analyze("I feel sad, exhausted and hopeless");
        assert!(sad.compound < -0.5, "{:?}", sad);
        assert!(sad.negative > sad.positive);
    }

    #[test]
    fn test_common_journal_words() {
        let s = analyze("I struggle with depression and anxiety");
        assert!(s.compound < -0.3, "{:?}", s);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        assert!(analyze("I was happy and now I am sad").compound > 0.0);
        assert!(analyze("I was happy but now I am sad").compound < 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(analyze("not good").compound < 0.0);
        assert!(analyze("I don't feel happy").compound < 0.0);
    }

    #[test]
    fn test_booster_increases_magnitude() {
        let plain = analyze("good");
        let boosted = analyze("very good");
        assert!(boosted.compound > plain.compound);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let s = analyze("Work was stressful but dinner with friends was great");
        let total = s.positive + s.neutral + s.negative;
        assert!((total - 1.0).abs() < 0.01, "{:?}", s);
    }

    #[test]
    fn test_compound_is_bounded() {
        let text = "amazing ".repeat(200);
        let s = analyze(&text);
        assert!(s.compound <= 1.0 && s.compound > 0.99);
    }
}
