// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use neurosync::analysis::{calculate_wellness_score, predict_stress_level};
use neurosync::journal::{process_journal_entry, JournalInput};
use neurosync::wearable::{process_wearable_data, WearableSample};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    journal_json: &'a str,
    wearable_json: &'a str,
    content: &'a str,
    mood: u8,
    stress: u8,
    sleep: u8,
}

fuzz_target!(|input: Input<'_>| {
    let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap_or_default();

    let direct = JournalInput {
        date: today,
        title: String::new(),
        content: input.content.to_string(),
        mood_score: input.mood,
        stress_level: input.stress,
        sleep_quality: input.sleep,
        activities: Default::default(),
    };
    let entry = process_journal_entry(direct).ok();

    let parsed = serde_json::from_str::<JournalInput>(input.journal_json)
        .ok()
        .and_then(|j| process_journal_entry(j).ok());

    let wearable = serde_json::from_str::<WearableSample>(input.wearable_json)
        .ok()
        .map(|s| process_wearable_data(s, today));

    if let Some(record) = &wearable {
        assert!(calculate_wellness_score(record) <= 100);
    }

    let prediction = predict_stress_level(entry.as_ref().or(parsed.as_ref()), wearable.as_ref());
    assert!((1..=10).contains(&prediction.predicted_stress_level));
});
