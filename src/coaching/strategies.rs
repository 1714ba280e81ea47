// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Coping strategies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Snapshot;

pub(crate) const SYSTEM_PROMPT: &str = "You are a compassionate mental health expert specializing in personalized coping strategies. \
    Based on the data provided, suggest practical, evidence-based coping strategies. \
    Be warm, supportive, and focus on achievable actions. \
    Format your response with markdown headers, bullet points, and concise explanations.";

/// A saved set of strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopingStrategy {
    pub date: NaiveDate,
    pub focus_areas: Vec<String>,
    /// Markdown text
    pub strategy: String,
}

impl CopingStrategy {
    /// The getting-started note every new user receives
    pub fn welcome(today: NaiveDate) -> Self {
        Self {
            date: today,
            focus_areas: vec!["Getting Started".to_string()],
            strategy: "# Welcome to NeuroSync!\n\n\
                ## Start Your Mental Health Journey\n\n\
                **Steps:**\n\
                1. Begin by adding a journal entry to track your mood\n\
                2. Connect a wearable device to import health data\n\
                3. Explore the dashboard to see your mental health patterns\n\
                4. Generate personalized coping strategies based on your data\n\n\
                **Benefits:** Building self-awareness is the first step toward better mental health.\n\n\
                **Remember:** Consistency is key. Regular check-ins will help you notice patterns and make positive changes.\n"
                .to_string(),
        }
    }
}

/// What the user asked strategies for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub focus_areas: Vec<String>,
    #[serde(default = "default_time_available")]
    pub time_available: u32,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_time_available() -> u32 { 15 }
fn default_environment() -> String { "Home".to_string() }

struct Canned {
    text: &'static str,
    keywords: &'static [&'static str],
}

// Matched in order; "relaxation" resolves to breathing before muscle work.
static CANNED: [Canned; 5] = [
    Canned {
        text: "### Deep Breathing Exercise\n- Take 5 minutes to practice deep, diaphragmatic breathing\n- Inhale for 4 counts, hold for 2, exhale for 6\n- Focus on the sensation of your breath",
        keywords: &["breathing", "relaxation"],
    },
    Canned {
        text: "### Mindful Observation\n- Choose an object in your environment and observe it closely for 3 minutes\n- Notice its colors, textures, and details\n- This practice helps anchor you to the present moment",
        keywords: &["mindfulness", "present"],
    },
    Canned {
        text: "### Brief Physical Movement\n- Stand up and stretch your body gently\n- Roll your shoulders, neck, and wrists\n- Even brief movement can help reduce tension and improve mood",
        keywords: &["physical", "movement", "exercise"],
    },
    Canned {
        text: "### Gratitude Practice\n- Take a moment to identify three things you're grateful for today\n- They can be simple everyday things\n- This helps shift perspective toward positive aspects of life",
        keywords: &["gratitude", "positive", "perspective"],
    },
    Canned {
        text: "### Progressive Muscle Relaxation\n- Tense and then release each muscle group in your body\n- Work from toes to head\n- Notice the difference between tension and relaxation",
        keywords: &["muscle", "tension", "relaxation"],
    },
];

const MAX_MATCHED: usize = 3;
const MIN_STRATEGIES: usize = 2;

fn matches(canned: &Canned, area: &str) -> bool {
    let area = area.to_lowercase();
    canned.keywords.contains(&area.as_str())
        || area.split_whitespace().any(|word| canned.keywords.contains(&word))
}

/// Generic strategies used when no language model is available.
///
/// Strategies that need five minutes are dropped when less time is available.
pub fn fallback_strategies(focus_areas: &[String], time_available: u32, environment: &str) -> String {
    let available: Vec<&Canned> = CANNED
        .iter()
        .filter(|c| time_available >= 5 || !c.text.contains("5 minutes"))
        .collect();

    let mut chosen: Vec<&Canned> = Vec::new();
    for area in focus_areas {
        if chosen.len() >= MAX_MATCHED {
            break;
        }
        if let Some(canned) = available.iter().find(|c| matches(c, area)) {
            if !chosen.iter().any(|c| std::ptr::eq(*c, *canned)) {
                chosen.push(*canned);
            }
        }
    }

    for canned in &available {
        if chosen.len() >= MIN_STRATEGIES {
            break;
        }
        if !chosen.iter().any(|c| std::ptr::eq(*c, *canned)) {
            chosen.push(*canned);
        }
    }

    let mut response = format!(
        "# Coping Strategies\n\n**Note:** These are general evidence-based strategies that can be helpful for many people. \
         They're designed to be used in a {} environment and take {} minutes or less.\n\n",
        environment, time_available
    );
    for canned in chosen {
        response.push('\n');
        response.push_str(canned.text);
        response.push('\n');
    }
    response
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

pub(crate) fn strategy_prompt(snapshot: Snapshot<'_>, request: &StrategyRequest) -> String {
    let na = || "N/A".to_string();
    let journal = snapshot.journal;
    let activities = journal.map(|j| j.activities).unwrap_or_default();
    let wearable = snapshot.wearable.map(|w| &w.metrics);

    format!(
        "I need personalized mental health coping strategies based on the following information:\n\n\
         JOURNAL DATA:\n\
         - Most recent mood: {}/10\n\
         - Stress level: {}/10\n\
         - Sleep quality: {}/10\n\
         - Exercise today: {}\n\
         - Meditation today: {}\n\
         - Social interaction: {}\n\
         - Time outdoors: {}\n\
         - Journal entry: \"{}\"\n\n\
         WEARABLE DATA:\n\
         - Average heart rate: {} bpm\n\
         - Sleep duration: {} hours\n\
         - Steps today: {}\n\
         - Activity minutes: {} minutes\n\n\
         PREFERENCES:\n\
         - Focus areas: {}\n\
         - Time available: {} minutes\n\
         - Environment: {}\n\n\
         Please provide 3-5 specific coping strategies that are:\n\
         1. Evidence-based and effective\n\
         2. Tailored to the mood, stress, and physical data\n\
         3. Appropriate for the specified time frame and environment\n\
         4. Focused on the requested areas\n\
         5. Clear and actionable\n",
        journal.map_or_else(na, |j| j.mood_score.to_string()),
        journal.map_or_else(na, |j| j.stress_level.to_string()),
        journal.map_or_else(na, |j| j.sleep_quality.to_string()),
        yes_no(activities.exercise),
        yes_no(activities.meditation),
        yes_no(activities.social_interaction),
        yes_no(activities.outdoor_time),
        journal.map_or("No content available", |j| j.content.as_str()),
        wearable.map_or_else(na, |m| m.avg_heart_rate.to_string()),
        wearable.map_or_else(na, |m| m.sleep_hours.to_string()),
        wearable.map_or_else(na, |m| m.steps.to_string()),
        wearable.map_or_else(na, |m| m.activity_minutes.to_string()),
        request.focus_areas.join(", "),
        request.time_available,
        request.environment,
    )
}
