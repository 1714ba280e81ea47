// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Correlations between journal entries and wearable data

use super::{correlation, mean};
use crate::journal::JournalEntry;
use crate::wearable::ProcessedWearable;

const MIN_RECORDS: usize = 3;
const MOOD_THRESHOLD: f64 = 0.4;
const HEART_RATE_THRESHOLD: f64 = 0.3;

pub const NOT_ENOUGH_DATA: &str = "Not enough data to generate reliable insights yet. Keep logging entries and syncing your wearable device.";

const GENERAL_INSIGHTS: [&str; 2] = [
    "Continue tracking your mood and activities to receive more personalized insights.",
    "Consider maintaining consistent sleep and exercise routines, as these typically have positive effects on mental health.",
];

fn correlation_insight(
    r: f64,
    threshold: f64,
    positive: &str,
    negative: &str,
) -> Option<String> {
    if r.abs() <= threshold {
        return None;
    }
    Some(if r > 0.0 { positive } else { negative }.to_string())
}

/// Mean of `value` over pairs where `flag` is set vs. not set, when both groups exist
fn split_means<F, V>(pairs: &[(&JournalEntry, &ProcessedWearable)], flag: F, value: V) -> Option<(f64, f64)>
where
    F: Fn(&JournalEntry) -> bool,
    V: Fn(&JournalEntry) -> f64,
{
    let (with, without): (Vec<_>, Vec<_>) = pairs.iter().partition(|(entry, _)| flag(*entry));
    let values = |group: Vec<&(&JournalEntry, &ProcessedWearable)>| -> Vec<f64> {
        group.iter().map(|(entry, _)| value(*entry)).collect()
    };
    Some((mean(&values(with))?, mean(&values(without))?))
}

/// Generate plain-language insights relating mood and stress to wearable data
pub fn analyze_mood_patterns(
    journal_entries: &[JournalEntry],
    wearable_data: &[ProcessedWearable],
) -> Vec<String> {
    if journal_entries.len() < MIN_RECORDS || wearable_data.len() < MIN_RECORDS {
        return vec![NOT_ENOUGH_DATA.to_string()];
    }

    let pairs: Vec<(&JournalEntry, &ProcessedWearable)> = journal_entries
        .iter()
        .filter_map(|entry| {
            wearable_data
                .iter()
                .find(|w| w.date == entry.date)
                .map(|w| (entry, w))
        })
        .collect();

    tracing::debug!("Matched {} journal/wearable pairs", pairs.len());

    let mut insights = Vec::new();

    if pairs.len() >= MIN_RECORDS {
        let mood: Vec<f64> = pairs.iter().map(|(e, _)| e.mood_score as f64).collect();
        let stress: Vec<f64> = pairs.iter().map(|(e, _)| e.stress_level as f64).collect();
        let sleep: Vec<f64> = pairs.iter().map(|(_, w)| w.metrics.sleep_hours).collect();
        let steps: Vec<f64> = pairs.iter().map(|(_, w)| w.metrics.steps as f64).collect();
        let heart: Vec<f64> = pairs.iter().map(|(_, w)| w.metrics.avg_heart_rate).collect();

        insights.extend(correlation_insight(
            correlation(&sleep, &mood),
            MOOD_THRESHOLD,
            "Analysis shows that your mood tends to be better on days when you get more sleep.",
            "Interestingly, there seems to be a negative correlation between sleep hours and mood in your data.",
        ));

        insights.extend(correlation_insight(
            correlation(&steps, &mood),
            MOOD_THRESHOLD,
            "You tend to report better moods on days with more physical activity.",
            "Your data suggests physical activity might not be improving your mood as expected.",
        ));

        insights.extend(correlation_insight(
            correlation(&heart, &stress),
            HEART_RATE_THRESHOLD,
            "Your average heart rate tends to be higher on days when you report more stress.",
            "Despite reporting stress, your heart rate doesn't show typical elevation patterns.",
        ));

        if let Some((with, without)) =
            split_means(&pairs, |e| e.activities.exercise, |e| e.mood_score as f64)
        {
            if with > without + 1.0 {
                let diff = ((with - without) * 10.0).round_ties_even() / 10.0;
                insights.push(format!(
                    "On days when you exercise, your mood score is significantly higher (about {:.1} points).",
                    diff
                ));
            }
        }

        if let Some((with, without)) =
            split_means(&pairs, |e| e.activities.meditation, |e| e.stress_level as f64)
        {
            if without > with + 1.0 {
                insights.push(
                    "Meditation appears to be effective for you - your stress levels are lower on days when you meditate."
                        .to_string(),
                );
            }
        }
    }

    if insights.len() < 2 {
        insights.extend(GENERAL_INSIGHTS.iter().map(|s| s.to_string()));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::process_journal_entry;
    use crate::journal::tests::input;
    use crate::wearable::{process_wearable_data, WearableSample};
    use chrono::NaiveDate;

    fn entry(date: &str, mood: u8, stress: u8, exercise: bool, meditation: bool) -> JournalEntry {
        let mut i = input(date, "Ordinary day at work", mood, stress);
        i.activities.exercise = exercise;
        i.activities.meditation = meditation;
        process_journal_entry(i).unwrap()
    }

    fn wearable(date: &str, sleep: f64, steps: u32, hr: f64) -> ProcessedWearable {
        let mut sample = WearableSample {
            date: Some(date.parse().unwrap()),
            ..Default::default()
        };
        sample.metrics.sleep_hours = sleep;
        sample.metrics.steps = steps;
        sample.metrics.avg_heart_rate = hr;
        process_wearable_data(sample, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
    }

    #[test]
    fn test_not_enough_data() {
        let journal = vec![entry("2024-03-01", 5, 5, false, false)];
        let wearables = vec![
            wearable("2024-03-01", 7.0, 5000, 70.0),
            wearable("2024-03-02", 7.0, 5000, 70.0),
            wearable("2024-03-03", 7.0, 5000, 70.0),
        ];
        assert_eq!(analyze_mood_patterns(&journal, &wearables), [NOT_ENOUGH_DATA]);
    }

    #[test]
    fn test_unmatched_dates_give_general_insights() {
        let journal = vec![
            entry("2024-03-01", 5, 5, false, false),
            entry("2024-03-02", 6, 5, false, false),
            entry("2024-03-03", 7, 5, false, false),
        ];
        let wearables = vec![
            wearable("2024-04-01", 6.0, 5000, 70.0),
            wearable("2024-04-02", 7.0, 5000, 70.0),
            wearable("2024-04-03", 8.0, 5000, 70.0),
        ];
        assert_eq!(analyze_mood_patterns(&journal, &wearables), GENERAL_INSIGHTS);
    }

    #[test]
    fn test_correlated_patterns() {
        let journal = vec![
            entry("2024-03-01", 3, 8, false, false),
            entry("2024-03-02", 5, 6, false, true),
            entry("2024-03-03", 8, 3, true, true),
            entry("2024-03-04", 9, 2, true, true),
        ];
        let wearables = vec![
            wearable("2024-03-01", 5.0, 2000, 88.0),
            wearable("2024-03-02", 6.5, 5000, 80.0),
            wearable("2024-03-03", 8.0, 9000, 66.0),
            wearable("2024-03-04", 8.5, 12000, 62.0),
        ];

        let insights = analyze_mood_patterns(&journal, &wearables);
        assert!(insights[0].contains("more sleep"));
        assert!(insights[1].contains("more physical activity"));
        assert!(insights[2].contains("heart rate tends to be higher"));
        // exercise days average 8.5 vs 4.0
        assert!(insights[3].contains("about 4.5 points"), "{}", insights[3]);
        // no-meditation stress 8 vs 11/3 with meditation
        assert!(insights[4].starts_with("Meditation appears to be effective"));
        assert_eq!(insights.len(), 5);
    }

    #[test]
    fn test_negative_correlation_wording() {
        let journal = vec![
            entry("2024-03-01", 9, 5, false, false),
            entry("2024-03-02", 6, 5, false, false),
            entry("2024-03-03", 3, 5, false, false),
        ];
        let wearables = vec![
            wearable("2024-03-01", 5.0, 5000, 70.0),
            wearable("2024-03-02", 7.0, 5000, 70.0),
            wearable("2024-03-03", 9.0, 5000, 70.0),
        ];
        let insights = analyze_mood_patterns(&journal, &wearables);
        assert!(insights[0].starts_with("Interestingly"));
        // a single specific insight is topped up with both general ones
        assert_eq!(insights.len(), 3);
    }
}
