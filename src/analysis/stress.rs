// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rule-based stress prediction

use serde::{Deserialize, Serialize};

use crate::journal::JournalEntry;
use crate::wearable::ProcessedWearable;

const BASE_STRESS: f64 = 5.0;

const GENERAL_RECOMMENDATIONS: [&str; 2] = [
    "Practice regular deep breathing throughout the day.",
    "Take short breaks from screens and work to reset your mind.",
];

/// A factor that moved the prediction, with a short impact label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub factor: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressPrediction {
    pub predicted_stress_level: u8,
    pub contributing_factors: Vec<ContributingFactor>,
    pub recommendations: Vec<String>,
}

#[derive(Default)]
struct Prediction {
    level: f64,
    factors: Vec<ContributingFactor>,
    recommendations: Vec<String>,
}

impl Prediction {
    fn apply(&mut self, delta: f64, factor: &str, impact: &str) {
        self.level += delta;
        self.factors.push(ContributingFactor {
            factor: factor.to_string(),
            impact: impact.to_string(),
        });
    }

    fn recommend(&mut self, text: &str) {
        self.recommendations.push(text.to_string());
    }

    fn wearable(&mut self, data: &ProcessedWearable) {
        let m = &data.metrics;

        if m.sleep_hours < 6.0 {
            self.apply(1.5, "Low sleep (less than 6 hours)", "High impact");
            self.recommend("Prioritize improving your sleep duration. Aim for 7-8 hours.");
        } else if m.sleep_hours > 8.0 {
            self.apply(-1.0, "Good sleep duration", "Positive factor");
        } else {
            self.apply(-0.5, "Adequate sleep", "Slight positive");
        }

        if m.avg_heart_rate > 80.0 {
            self.apply(1.0, "Elevated heart rate", "Moderate impact");
            self.recommend("Try deep breathing exercises to help lower your heart rate.");
        } else if m.avg_heart_rate < 65.0 {
            self.apply(-0.5, "Low resting heart rate", "Positive factor");
        }

        if m.steps < 3000 {
            self.apply(0.5, "Low physical activity", "Slight negative");
            self.recommend(
                "Try to incorporate more walking into your day. Even short walks can help reduce stress.",
            );
        } else if m.steps > 8000 {
            self.apply(-1.0, "Good physical activity", "Positive factor");
        }
    }

    fn journal(&mut self, entry: &JournalEntry) {
        let compound = entry.sentiment.compound;
        if compound < -0.3 {
            self.apply(1.5, "Negative journal sentiment", "High impact");
            self.recommend(
                "Your journal entries show negative patterns. Consider mindfulness practices to help shift perspective.",
            );
        } else if compound > 0.3 {
            self.apply(-1.0, "Positive outlook", "Positive factor");
        }

        let activities = &entry.activities;
        if activities.exercise {
            self.apply(-0.5, "Recent exercise", "Positive factor");
        }
        if activities.meditation {
            self.apply(-1.0, "Meditation practice", "Significant positive");
        }
        if activities.outdoor_time {
            self.apply(-0.5, "Time outdoors", "Positive factor");
        }
        if !activities.social_interaction {
            self.apply(0.5, "Limited social interaction", "Slight negative");
            self.recommend("Consider connecting with friends or family, even briefly.");
        }
    }
}

/// Predict a 1-10 stress level from the latest journal entry and wearable record
pub fn predict_stress_level(
    latest_journal: Option<&JournalEntry>,
    latest_wearable: Option<&ProcessedWearable>,
) -> StressPrediction {
    let mut p = Prediction {
        level: BASE_STRESS,
        ..Default::default()
    };

    if let Some(data) = latest_wearable {
        p.wearable(data);
    }
    if let Some(entry) = latest_journal {
        p.journal(entry);
    }

    if p.recommendations.len() < 2 {
        p.recommendations
            .extend(GENERAL_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }

    let predicted = p.level.round_ties_even().clamp(1.0, 10.0) as u8;
    tracing::debug!(
        "Predicted stress {} from {} factors",
        predicted,
        p.factors.len()
    );

    StressPrediction {
        predicted_stress_level: predicted,
        contributing_factors: p.factors,
        recommendations: p.recommendations,
    }
}
