// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Simulated wearable platforms
//!
//! No real device APIs are contacted. Data is generated from plausible
//! ranges so the dashboard and heuristics have something to work with.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{WearableMetrics, WearableSample};

/// Max heart rate assumed for zone calculation (220 - age 30)
const MAX_HEART_RATE: f64 = 190.0;

const DEVICES: &[&str] = &[
    "Apple Watch",
    "Fitbit",
    "Garmin",
    "Samsung Galaxy Watch",
    "Oura Ring",
    "Whoop",
    "Google Pixel Watch",
    "Apple HealthKit",
    "Google Fit",
    "Other",
];

const COMMON_METRICS: &[&str] = &["Heart Rate", "Sleep Data", "Steps", "Active Calories", "Activity Minutes"];

const TRAINING_STATUSES: &[&str] = &["Productive", "Maintaining", "Recovery", "Detraining", "Peaking"];

/// Supported wearable platforms
pub fn device_list() -> Vec<&'static str> {
    DEVICES.to_vec()
}

fn device_metrics(device: &str) -> &'static [&'static str] {
    match device {
        "Apple Watch" => &[
            "Heart Rate Variability", "ECG", "Blood Oxygen", "Respiratory Rate",
            "Cardio Fitness", "Walking Steadiness",
        ],
        "Apple HealthKit" => &[
            "Heart Rate Variability", "ECG", "Blood Oxygen", "Respiratory Rate",
            "Cardio Fitness", "Walking Steadiness", "Mindful Minutes",
        ],
        "Fitbit" => &["Resting Heart Rate", "Sleep Stages", "Floors Climbed", "Active Zone Minutes", "Skin Temperature"],
        "Garmin" => &["Stress Level", "Body Battery", "Training Status", "VO2 Max", "Sleep Tracking", "Respiration"],
        "Samsung Galaxy Watch" => &["Blood Pressure", "ECG", "Body Composition", "Stress Level", "Sleep Tracking"],
        "Oura Ring" => &["Readiness Score", "Sleep Quality", "Body Temperature", "Respiratory Rate", "HRV Balance"],
        "Whoop" => &["Recovery Score", "Strain Score", "Sleep Performance", "Respiratory Rate", "HRV"],
        "Google Pixel Watch" => &["Cardio Load", "Daily Readiness", "Activity Goals", "Stress Tracking"],
        "Google Fit" => &["Move Minutes", "Heart Points", "Distance", "Pace", "Calories"],
        _ => &[],
    }
}

/// Data types a platform can export
pub fn available_data_types(device: &str) -> Vec<&'static str> {
    COMMON_METRICS
        .iter()
        .chain(device_metrics(device))
        .copied()
        .collect()
}

/// Pretend to authenticate with a platform
pub fn connect(device: &str) -> (bool, String) {
    tracing::info!("Simulated connection to {}", device);
    (true, format!("Successfully connected to {}. Ready to import data.", device))
}

fn has(metrics: &[&str], name: &str) -> bool {
    metrics.iter().any(|m| m.eq_ignore_ascii_case(name))
}

fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

fn fill_sleep<R: Rng + ?Sized>(m: &mut WearableMetrics, rng: &mut R) {
    m.sleep_hours = round_to(rng.gen_range(5.5..=8.5), 2);
    m.deep_sleep_percentage = rng.gen_range(15..=30) as f64;
    m.rem_sleep_percentage = rng.gen_range(20..=30) as f64;
}

/// Generate a day of simulated data for the requested metrics
pub fn mock_wearable_data<R: Rng + ?Sized>(date: NaiveDate, metrics: &[&str], rng: &mut R) -> WearableSample {
    let mut m = WearableMetrics::default();

    if has(metrics, "Heart Rate") {
        m.avg_heart_rate = rng.gen_range(65..=85) as f64;
        m.resting_heart_rate = rng.gen_range(55..=75) as f64;
    }
    if has(metrics, "Heart Rate Variability") {
        m.heart_rate_variability = rng.gen_range(25..=65) as f64;
    }
    if has(metrics, "Sleep Data") {
        fill_sleep(&mut m, rng);
        m.sleep_disruptions = rng.gen_range(0..=5);
    }
    if has(metrics, "Steps") {
        m.steps = rng.gen_range(3000..=12000);
    }
    if has(metrics, "Active Calories") {
        m.active_calories = rng.gen_range(100..=500) as f64;
    }
    if has(metrics, "Activity Minutes") {
        m.activity_minutes = rng.gen_range(10..=120) as f64;
    }
    if has(metrics, "Blood Oxygen") {
        m.blood_oxygen = Some(rng.gen_range(95..=100) as f64);
    }
    if has(metrics, "Respiratory Rate") {
        m.respiratory_rate = Some(rng.gen_range(12..=20) as f64);
    }
    if has(metrics, "ECG") {
        m.ecg_normal = Some(rng.gen_bool(0.9));
    }
    if has(metrics, "Stress Level") || has(metrics, "Stress Score") {
        m.stress_score = Some(rng.gen_range(1..=100) as f64);
    }
    if has(metrics, "Body Battery") {
        m.body_battery = Some(rng.gen_range(5..=100) as f64);
    }
    if has(metrics, "VO2 Max") || has(metrics, "Cardio Fitness") {
        m.vo2_max = Some(rng.gen_range(30..=60) as f64);
    }
    if has(metrics, "Training Status") {
        m.training_status = TRAINING_STATUSES.choose(rng).map(|s| s.to_string());
    }
    if has(metrics, "Sleep Quality") || has(metrics, "Sleep Tracking") || has(metrics, "Sleep Stages") {
        if m.sleep_hours == 0.0 {
            fill_sleep(&mut m, rng);
        }
        m.sleep_quality_score = Some(rng.gen_range(1..=100) as f64);
    }
    if has(metrics, "Body Temperature") || has(metrics, "Skin Temperature") {
        m.body_temp = Some(round_to(rng.gen_range(36.1..=37.0), 1));
    }
    if has(metrics, "Recovery Score") || has(metrics, "Readiness Score") {
        m.recovery_score = Some(rng.gen_range(1..=100) as f64);
    }
    if has(metrics, "Strain Score") {
        // WHOOP strain uses a 1-21 scale
        m.strain_score = Some(rng.gen_range(1..=21) as f64);
    }
    if has(metrics, "Blood Pressure") {
        m.systolic = Some(rng.gen_range(100..=140) as f64);
        m.diastolic = Some(rng.gen_range(60..=90) as f64);
    }
    if has(metrics, "Body Composition") {
        m.body_fat_percentage = Some(round_to(rng.gen_range(10.0..=30.0), 1));
        m.muscle_mass = Some(round_to(rng.gen_range(25.0..=45.0), 1));
    }
    if has(metrics, "Mindful Minutes") {
        m.mindful_minutes = Some(rng.gen_range(0..=60) as f64);
    }
    if has(metrics, "Floors Climbed") {
        m.floors_climbed = Some(rng.gen_range(0..=30) as f64);
    }
    if has(metrics, "Distance") {
        m.distance_km = Some(round_to(rng.gen_range(0.5..=10.0), 2));
    }
    if has(metrics, "Active Zone Minutes") || has(metrics, "Heart Points") {
        m.active_zone_minutes = Some(rng.gen_range(0..=90) as f64);
    }

    // Weekends: more sleep, more activity
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        if m.sleep_hours > 0.0 {
            m.sleep_hours += rng.gen_range(0.5..=1.0);
        }
        if m.steps > 0 {
            m.steps += rng.gen_range(1000..=3000);
        }
        if m.activity_minutes > 0.0 {
            m.activity_minutes += rng.gen_range(20..=45) as f64;
        }
        if let Some(mindful) = m.mindful_minutes.as_mut() {
            *mindful += rng.gen_range(10..=20) as f64;
        }
    }

    WearableSample { date: Some(date), metrics: m }
}

/// Snapshot of live device readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealTimeMetrics {
    pub timestamp: NaiveDateTime,
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_zone: Option<HeartRateZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_oxygen: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_category: Option<StressCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_calories: Option<u32>,
}

/// Metrics most devices stream live, plus device-specific extras
pub fn default_real_time_metrics(device: &str) -> Vec<&'static str> {
    let mut metrics = vec!["Heart Rate", "Steps"];
    if matches!(device, "Apple Watch" | "Garmin" | "Whoop") {
        metrics.push("Heart Rate Variability");
    }
    if matches!(device, "Apple Watch" | "Fitbit" | "Samsung Galaxy Watch") {
        metrics.push("Blood Oxygen");
    }
    if matches!(device, "Garmin" | "Whoop") {
        metrics.push("Stress Level");
    }
    metrics
}

/// Scale a daily total by how far through the active day (08:00-20:00) we are
fn accumulated<R: Rng + ?Sized>(now: NaiveDateTime, daily: std::ops::RangeInclusive<u32>, night_max: u32, rng: &mut R) -> u32 {
    let hour = now.hour();
    if (8..=20).contains(&hour) {
        let expected = rng.gen_range(daily) as f64;
        let progress = ((hour as f64 - 8.0) / 12.0).clamp(0.0, 1.0);
        (expected * progress) as u32
    } else {
        rng.gen_range(0..=night_max)
    }
}

/// Simulated live readings from a device
pub fn real_time_metrics<R: Rng + ?Sized>(
    device: &str,
    metrics: Option<&[&str]>,
    now: NaiveDateTime,
    rng: &mut R,
) -> RealTimeMetrics {
    let defaults = default_real_time_metrics(device);
    let metrics = metrics.unwrap_or(defaults.as_slice());

    let mut data = RealTimeMetrics {
        timestamp: now,
        device: device.to_string(),
        heart_rate: None,
        heart_rate_zone: None,
        hrv: None,
        blood_oxygen: None,
        steps: None,
        stress_level: None,
        stress_category: None,
        respiratory_rate: None,
        active_calories: None,
    };

    if has(metrics, "Heart Rate") {
        let hr = rng.gen_range(65..=85);
        data.heart_rate = Some(hr);
        data.heart_rate_zone = Some(heart_rate_zone(hr as f64));
    }
    if has(metrics, "Heart Rate Variability") {
        data.hrv = Some(rng.gen_range(25..=65));
    }
    if has(metrics, "Blood Oxygen") {
        data.blood_oxygen = Some(rng.gen_range(95..=100));
    }
    if has(metrics, "Steps") {
        data.steps = Some(accumulated(now, 7000..=10000, 500, rng));
    }
    if has(metrics, "Stress Level") {
        let level = rng.gen_range(1..=100);
        data.stress_level = Some(level);
        data.stress_category = Some(stress_category(level as f64));
    }
    if has(metrics, "Respiratory Rate") {
        data.respiratory_rate = Some(rng.gen_range(12..=20));
    }
    if has(metrics, "Calories") || has(metrics, "Active Calories") {
        data.active_calories = Some(accumulated(now, 300..=600, 50, rng));
    }

    data
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartRateZone {
    Rest,
    #[serde(rename = "Very Light")]
    VeryLight,
    Light,
    Moderate,
    Hard,
    Maximum,
}

/// Training zone from percent of max heart rate
pub fn heart_rate_zone(heart_rate: f64) -> HeartRateZone {
    let percent = heart_rate / MAX_HEART_RATE * 100.0;
    if percent < 50.0 {
        HeartRateZone::Rest
    } else if percent < 60.0 {
        HeartRateZone::VeryLight
    } else if percent < 70.0 {
        HeartRateZone::Light
    } else if percent < 80.0 {
        HeartRateZone::Moderate
    } else if percent < 90.0 {
        HeartRateZone::Hard
    } else {
        HeartRateZone::Maximum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressCategory {
    Low,
    Normal,
    Elevated,
    High,
}

/// Describe a 1-100 device stress score
pub fn stress_category(score: f64) -> StressCategory {
    if score < 25.0 {
        StressCategory::Low
    } else if score < 50.0 {
        StressCategory::Normal
    } else if score < 75.0 {
        StressCategory::Elevated
    } else {
        StressCategory::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_data_types_include_common_and_device_specific() {
        let garmin = available_data_types("Garmin");
        assert!(garmin.contains(&"Steps"));
        assert!(garmin.contains(&"Body Battery"));

        let other = available_data_types("Other");
        assert_eq!(other.len(), COMMON_METRICS.len());
    }

    #[test]
    fn test_mock_data_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        // A Wednesday: no weekend adjustments
        let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let types = available_data_types("Garmin");

        for _ in 0..50 {
            let sample = mock_wearable_data(date, &types, &mut rng);
            let m = &sample.metrics;
            assert_eq!(sample.date, Some(date));
            assert!((65.0..=85.0).contains(&m.avg_heart_rate));
            assert!((5.5..=8.5).contains(&m.sleep_hours));
            assert!((3000..=12000).contains(&m.steps));
            assert!(m.body_battery.is_some());
            assert!(m.training_status.is_some());
            assert!(m.blood_oxygen.is_none());
        }
    }

    #[test]
    fn test_weekend_boost() {
        let mut rng = StdRng::seed_from_u64(1);
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        for _ in 0..50 {
            let sample = mock_wearable_data(saturday, &["Steps", "Sleep Data"], &mut rng);
            assert!(sample.metrics.steps >= 4000);
            assert!(sample.metrics.sleep_hours >= 6.0);
        }
    }

    #[test]
    fn test_real_time_defaults_per_device() {
        let mut rng = StdRng::seed_from_u64(3);
        let night = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap().and_hms_opt(2, 0, 0).unwrap();

        let whoop = real_time_metrics("Whoop", None, night, &mut rng);
        assert!(whoop.hrv.is_some());
        assert!(whoop.stress_category.is_some());
        assert!(whoop.blood_oxygen.is_none());
        assert!(whoop.steps.unwrap() <= 500);

        let fitbit = real_time_metrics("Fitbit", None, night, &mut rng);
        assert!(fitbit.blood_oxygen.is_some());
        assert!(fitbit.hrv.is_none());
    }

    #[test]
    fn test_zones_and_categories() {
        assert_eq!(heart_rate_zone(70.0), HeartRateZone::Rest);
        assert_eq!(heart_rate_zone(100.0), HeartRateZone::VeryLight);
        assert_eq!(heart_rate_zone(171.0), HeartRateZone::Maximum);
        assert_eq!(stress_category(10.0), StressCategory::Low);
        assert_eq!(stress_category(50.0), StressCategory::Elevated);
        assert_eq!(stress_category(99.0), StressCategory::High);
    }
}
