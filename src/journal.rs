// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Journal entry processing

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sentiment::{self, SentimentScores};
use crate::{NeuroSyncError, Result};

/// Self-reported activities for the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activities {
    #[serde(default)]
    pub exercise: bool,
    #[serde(default)]
    pub meditation: bool,
    #[serde(default)]
    pub social_interaction: bool,
    #[serde(default)]
    pub outdoor_time: bool,
}

impl Activities {
    /// Names of the activities that were done
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.exercise, "exercise"),
            (self.meditation, "meditation"),
            (self.social_interaction, "social interaction"),
            (self.outdoor_time, "time outdoors"),
        ]
        .into_iter()
        .filter_map(|(done, name)| done.then_some(name))
        .collect()
    }

    /// Human-readable list, e.g. "exercise, time outdoors"
    pub fn describe(&self) -> String {
        let names = self.names();
        if names.is_empty() {
            "No specific activities recorded".to_string()
        } else {
            names.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Anxious,
    Angry,
    Tired,
    Calm,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Anxious,
        Emotion::Angry,
        Emotion::Tired,
        Emotion::Calm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Anxious => "anxious",
            Emotion::Angry => "angry",
            Emotion::Tired => "tired",
            Emotion::Calm => "calm",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Happy => &["happy", "joy", "excited", "glad", "wonderful", "great"],
            Emotion::Sad => &["sad", "unhappy", "depressed", "down", "miserable", "upset"],
            Emotion::Anxious => &["anxious", "nervous", "worried", "stress", "fear", "panic"],
            Emotion::Angry => &["angry", "mad", "frustrated", "annoyed", "irritated"],
            Emotion::Tired => &["tired", "exhausted", "fatigue", "sleepy", "drained"],
            Emotion::Calm => &["calm", "peaceful", "relaxed", "tranquil", "serene"],
        }
    }
}

/// Journal entry as submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    pub content: String,
    pub mood_score: u8,
    pub stress_level: u8,
    pub sleep_quality: u8,
    #[serde(default)]
    pub activities: Activities,
}

/// A processed journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub mood_score: u8,
    pub stress_level: u8,
    pub sleep_quality: u8,
    pub activities: Activities,
    pub sentiment: SentimentScores,
    pub detected_emotions: BTreeMap<Emotion, u32>,
    pub word_count: usize,
}

fn check_rating(name: &str, value: u8) -> Result<()> {
    if (1..=10).contains(&value) {
        Ok(())
    } else {
        Err(NeuroSyncError::Validation(format!(
            "{} must be between 1 and 10, got {}",
            name, value
        )))
    }
}

/// Count emotion keywords. A word counts once per emotion if it contains any keyword.
pub fn detect_emotions(content: &str) -> BTreeMap<Emotion, u32> {
    let lowered = content.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    Emotion::ALL
        .iter()
        .filter_map(|emotion| {
            let count = words
                .iter()
                .filter(|word| emotion.keywords().iter().any(|k| word.contains(k)))
                .count() as u32;
            (count > 0).then_some((*emotion, count))
        })
        .collect()
}

/// Validate a journal submission and derive sentiment and emotion metrics
pub fn process_journal_entry(input: JournalInput) -> Result<JournalEntry> {
    check_rating("mood_score", input.mood_score)?;
    check_rating("stress_level", input.stress_level)?;
    check_rating("sleep_quality", input.sleep_quality)?;

    let sentiment = sentiment::analyze(&input.content);
    let detected_emotions = detect_emotions(&input.content);
    let word_count = input.content.split_whitespace().count();

    tracing::debug!(
        "Processed journal entry for {}: compound={:.3}, words={}",
        input.date,
        sentiment.compound,
        word_count
    );

    Ok(JournalEntry {
        id: uuid::Uuid::new_v4().to_string(),
        date: input.date,
        title: input.title,
        content: input.content,
        mood_score: input.mood_score,
        stress_level: input.stress_level,
        sleep_quality: input.sleep_quality,
        activities: input.activities,
        sentiment,
        detected_emotions,
        word_count,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn input(date: &str, content: &str, mood: u8, stress: u8) -> JournalInput {
        JournalInput {
            date: date.parse().unwrap(),
            title: "Entry".to_string(),
            content: content.to_string(),
            mood_score: mood,
            stress_level: stress,
            sleep_quality: 6,
            activities: Activities::default(),
        }
    }

    #[test]
    fn test_process_entry() {
        let entry = process_journal_entry(input(
            "2024-03-01",
            "Had a great walk, feeling calm and relaxed. A bit tired though.",
            8,
            3,
        ))
        .unwrap();

        assert_eq!(entry.word_count, 12);
        assert_eq!(entry.detected_emotions.get(&Emotion::Happy), Some(&1));
        assert_eq!(entry.detected_emotions.get(&Emotion::Calm), Some(&2));
        assert_eq!(entry.detected_emotions.get(&Emotion::Tired), Some(&1));
        assert!(!entry.detected_emotions.contains_key(&Emotion::Angry));
        assert!(entry.sentiment.compound > 0.0);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_keyword_substring_matching() {
        // "stressed" contains "stress"; "downtown" contains "down"
        let emotions = detect_emotions("Stressed out downtown");
        assert_eq!(emotions.get(&Emotion::Anxious), Some(&1));
        assert_eq!(emotions.get(&Emotion::Sad), Some(&1));
    }

    #[test]
    fn test_rating_out_of_range() {
        let err = process_journal_entry(input("2024-03-01", "ok", 0, 5)).unwrap_err();
        assert!(matches!(err, NeuroSyncError::Validation(_)));

        let err = process_journal_entry(input("2024-03-01", "ok", 5, 11)).unwrap_err();
        assert!(err.to_string().contains("stress_level"));
    }

    #[test]
    fn test_describe_activities() {
        assert_eq!(Activities::default().describe(), "No specific activities recorded");
        let a = Activities { exercise: true, outdoor_time: true, ..Default::default() };
        assert_eq!(a.describe(), "exercise, time outdoors");
    }
}
