// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Aggregate wellness score from wearable metrics

use crate::wearable::ProcessedWearable;

const SLEEP_WEIGHT: f64 = 0.3;
const ACTIVITY_WEIGHT: f64 = 0.2;
const HEART_WEIGHT: f64 = 0.3;
const STRESS_WEIGHT: f64 = 0.2;

const OPTIMAL_SLEEP_HOURS: f64 = 8.0;
const STEP_GOAL: f64 = 10_000.0;
const ACTIVITY_MINUTES_GOAL: f64 = 30.0;

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x > 0.0)
}

/// Sleep component: stage efficiency blended with distance from eight hours
fn sleep_component(data: &ProcessedWearable) -> Option<f64> {
    if data.sleep_efficiency <= 0.0 {
        return None;
    }
    let efficiency = data.sleep_efficiency.min(100.0);
    let duration = 100.0
        - ((data.metrics.sleep_hours - OPTIMAL_SLEEP_HOURS).abs() / OPTIMAL_SLEEP_HOURS * 100.0);
    Some(efficiency * 0.7 + duration.max(0.0) * 0.3)
}

fn activity_component(data: &ProcessedWearable) -> Option<f64> {
    if data.metrics.steps == 0 {
        return None;
    }
    let steps = (data.metrics.steps as f64 / STEP_GOAL * 100.0).min(100.0);
    let minutes = (data.metrics.activity_minutes / ACTIVITY_MINUTES_GOAL * 100.0).min(100.0);
    Some(steps * 0.6 + minutes * 0.4)
}

fn resting_heart_rate_score(rhr: f64) -> f64 {
    if rhr < 50.0 {
        80.0
    } else if rhr < 60.0 {
        90.0
    } else if rhr <= 70.0 {
        100.0
    } else if rhr <= 80.0 {
        80.0
    } else if rhr <= 90.0 {
        60.0
    } else {
        40.0
    }
}

fn blood_oxygen_score(spo2: f64) -> f64 {
    if spo2 >= 95.0 {
        100.0
    } else if spo2 >= 90.0 {
        80.0
    } else {
        50.0
    }
}

/// Heart component: mean of whichever cardiovascular sub-scores are available
fn heart_component(data: &ProcessedWearable) -> Option<f64> {
    let m = &data.metrics;
    let scores: Vec<f64> = [
        positive(Some(m.resting_heart_rate)).map(resting_heart_rate_score),
        positive(Some(m.heart_rate_variability)).map(|hrv| hrv.clamp(0.0, 100.0)),
        positive(m.vo2_max).map(|vo2| (vo2 / 60.0 * 100.0).clamp(0.0, 100.0)),
        positive(m.blood_oxygen).map(blood_oxygen_score),
    ]
    .into_iter()
    .flatten()
    .collect();

    super::mean(&scores)
}

/// Stress component: device stress score (inverted), else body battery, else recovery
fn stress_component(data: &ProcessedWearable) -> Option<f64> {
    let m = &data.metrics;
    positive(m.stress_score)
        .map(|s| 100.0 - s)
        .or_else(|| positive(m.body_battery))
        .or_else(|| positive(m.recovery_score))
}

/// Weighted 0-100 wellness score over the available components.
///
/// Weights are renormalized over the components present. Returns 0 when
/// the record carries nothing to score.
pub fn calculate_wellness_score(data: &ProcessedWearable) -> u8 {
    let components = [
        (sleep_component(data), SLEEP_WEIGHT),
        (activity_component(data), ACTIVITY_WEIGHT),
        (heart_component(data), HEART_WEIGHT),
        (stress_component(data), STRESS_WEIGHT),
    ];

    let (weighted_sum, total_weight) = components
        .iter()
        .filter_map(|(score, weight)| score.map(|s| (s * weight, *weight)))
        .fold((0.0, 0.0), |(sum, total), (s, w)| (sum + s, total + w));

    if total_weight <= 0.0 {
        return 0;
    }

    (weighted_sum / total_weight).round_ties_even().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wearable::{process_wearable_data, WearableSample};
    use chrono::NaiveDate;

    fn processed(json: serde_json::Value) -> ProcessedWearable {
        let sample: WearableSample = serde_json::from_value(json).unwrap();
        process_wearable_data(sample, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
    }

    #[test]
    fn test_no_components() {
        assert_eq!(calculate_wellness_score(&processed(serde_json::json!({}))), 0);
    }

    #[test]
    fn test_all_components() {
        let data = processed(serde_json::json!({
            "sleep_hours": 8.0,
            "deep_sleep_percentage": 20,
            "rem_sleep_percentage": 25,
            "steps": 10000,
            "activity_minutes": 30,
            "resting_heart_rate": 65,
            "heart_rate_variability": 50,
            "stress_score": 40
        }));
        // sleep 61.5, activity 100, heart 75, stress 60
        assert_eq!(calculate_wellness_score(&data), 73);
        assert_eq!(data.wellness_score, Some(73));
    }

    #[test]
    fn test_weights_renormalized() {
        let data = processed(serde_json::json!({ "steps": 5000, "activity_minutes": 15 }));
        assert_eq!(calculate_wellness_score(&data), 50);
    }

    #[test]
    fn test_stress_fallback_order() {
        let battery = processed(serde_json::json!({ "body_battery": 70, "recovery_score": 20 }));
        assert_eq!(calculate_wellness_score(&battery), 70);

        let recovery = processed(serde_json::json!({ "recovery_score": 20 }));
        assert_eq!(calculate_wellness_score(&recovery), 20);

        let stress = processed(serde_json::json!({ "stress_score": 10, "body_battery": 70 }));
        assert_eq!(calculate_wellness_score(&stress), 90);
    }

    #[test]
    fn test_heart_bands() {
        let low_spo2 = processed(serde_json::json!({ "blood_oxygen": 88 }));
        assert_eq!(calculate_wellness_score(&low_spo2), 50);

        let mixed = processed(serde_json::json!({ "resting_heart_rate": 95, "vo2_max": 60 }));
        assert_eq!(calculate_wellness_score(&mixed), 70);
    }

    #[test]
    fn test_score_is_clamped() {
        let over = processed(serde_json::json!({ "body_battery": 250 }));
        assert_eq!(calculate_wellness_score(&over), 100);

        let under = processed(serde_json::json!({ "stress_score": 150 }));
        assert_eq!(calculate_wellness_score(&under), 0);
    }

    #[test]
    fn test_oversleep_penalized() {
        let eight = processed(serde_json::json!({
            "sleep_hours": 8.0, "deep_sleep_percentage": 25, "rem_sleep_percentage": 25
        }));
        let twelve = processed(serde_json::json!({
            "sleep_hours": 12.0, "deep_sleep_percentage": 25, "rem_sleep_percentage": 25
        }));
        assert!(calculate_wellness_score(&eight) > calculate_wellness_score(&twelve));
    }
}
