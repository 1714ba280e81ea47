// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Wearable data processing

pub mod devices;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::calculate_wellness_score;

/// Metrics reported by a wearable for a single day.
///
/// Base metrics default to zero when the device does not report them;
/// extended metrics are only present for devices that support them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WearableMetrics {
    #[serde(default)]
    pub avg_heart_rate: f64,
    #[serde(default)]
    pub resting_heart_rate: f64,
    #[serde(default)]
    pub heart_rate_variability: f64,
    #[serde(default)]
    pub sleep_hours: f64,
    #[serde(default)]
    pub deep_sleep_percentage: f64,
    #[serde(default)]
    pub rem_sleep_percentage: f64,
    #[serde(default)]
    pub sleep_disruptions: u32,
    #[serde(default)]
    pub steps: u32,
    #[serde(default)]
    pub active_calories: f64,
    #[serde(default)]
    pub activity_minutes: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_oxygen: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecg_normal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_battery: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vo2_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mindful_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors_climbed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_zone_minutes: Option<f64>,
}

/// Raw sample as imported from a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WearableSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub metrics: WearableMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartRateRange {
    Low,
    #[serde(rename = "Low-Normal")]
    LowNormal,
    Normal,
    #[serde(rename = "High-Normal")]
    HighNormal,
    High,
}

impl HeartRateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeartRateRange::Low => "Low",
            HeartRateRange::LowNormal => "Low-Normal",
            HeartRateRange::Normal => "Normal",
            HeartRateRange::HighNormal => "High-Normal",
            HeartRateRange::High => "High",
        }
    }
}

/// Processed wearable record with derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedWearable {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: WearableMetrics,
    pub sleep_efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_range: Option<HeartRateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wellness_score: Option<u8>,
}

/// Categorize an average heart rate
pub fn categorize_heart_rate(avg_heart_rate: f64) -> HeartRateRange {
    if avg_heart_rate < 60.0 {
        HeartRateRange::Low
    } else if avg_heart_rate < 70.0 {
        HeartRateRange::LowNormal
    } else if avg_heart_rate < 80.0 {
        HeartRateRange::Normal
    } else if avg_heart_rate < 90.0 {
        HeartRateRange::HighNormal
    } else {
        HeartRateRange::High
    }
}

/// Share of sleep spent in deep and REM stages, as a percentage
pub fn sleep_efficiency(metrics: &WearableMetrics) -> f64 {
    if metrics.sleep_hours <= 0.0 {
        return 0.0;
    }
    let deep = metrics.sleep_hours * (metrics.deep_sleep_percentage / 100.0);
    let rem = metrics.sleep_hours * (metrics.rem_sleep_percentage / 100.0);
    (deep + rem) / metrics.sleep_hours * 100.0
}

/// Derive efficiency, heart-rate range and wellness score from a raw sample
pub fn process_wearable_data(sample: WearableSample, today: NaiveDate) -> ProcessedWearable {
    let metrics = sample.metrics;
    let heart_rate_range = (metrics.avg_heart_rate > 0.0)
        .then(|| categorize_heart_rate(metrics.avg_heart_rate));

    let mut processed = ProcessedWearable {
        date: sample.date.unwrap_or(today),
        sleep_efficiency: sleep_efficiency(&metrics),
        metrics,
        heart_rate_range,
        wellness_score: None,
    };

    let score = calculate_wellness_score(&processed);
    if score > 0 {
        processed.wellness_score = Some(score);
    }

    processed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_heart_rate_categories() {
        assert_eq!(categorize_heart_rate(55.0), HeartRateRange::Low);
        assert_eq!(categorize_heart_rate(60.0), HeartRateRange::LowNormal);
        assert_eq!(categorize_heart_rate(79.9), HeartRateRange::Normal);
        assert_eq!(categorize_heart_rate(85.0), HeartRateRange::HighNormal);
        assert_eq!(categorize_heart_rate(90.0), HeartRateRange::High);
    }

    #[test]
    fn test_empty_sample() {
        let processed = process_wearable_data(WearableSample::default(), today());
        assert_eq!(processed.date, today());
        assert_eq!(processed.sleep_efficiency, 0.0);
        assert_eq!(processed.heart_rate_range, None);
        assert_eq!(processed.wellness_score, None);
    }

    #[test]
    fn test_derived_metrics() {
        let sample: WearableSample = serde_json::from_value(serde_json::json!({
            "date": "2024-03-09",
            "avg_heart_rate": 72,
            "sleep_hours": 8.0,
            "deep_sleep_percentage": 20,
            "rem_sleep_percentage": 25,
            "steps": 10000,
            "activity_minutes": 30,
            "blood_oxygen": 98
        }))
        .unwrap();

        let processed = process_wearable_data(sample, today());
        assert_eq!(processed.date.to_string(), "2024-03-09");
        assert!((processed.sleep_efficiency - 45.0).abs() < 1e-9);
        assert_eq!(processed.heart_rate_range, Some(HeartRateRange::Normal));
        assert_eq!(processed.metrics.blood_oxygen, Some(98.0));
        assert!(processed.wellness_score.is_some());
    }

    #[test]
    fn test_serialization_omits_absent_extended_metrics() {
        let processed = process_wearable_data(WearableSample::default(), today());
        let json = serde_json::to_value(&processed).unwrap();
        assert!(json.get("blood_oxygen").is_none());
        assert_eq!(json["steps"], 0);
        assert_eq!(json["date"], "2024-03-10");
    }
}
