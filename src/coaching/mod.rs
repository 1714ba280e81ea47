// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! AI coaching
//!
//! Every operation degrades to deterministic content when no language model
//! is configured or the request fails; callers never see an error.

pub mod personas;
pub mod strategies;

pub use personas::{persona, Persona, DEFAULT_PERSONA, PERSONAS};
pub use strategies::{fallback_strategies, CopingStrategy, StrategyRequest};

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::journal::JournalEntry;
use crate::llm::{strip_code_fence, ChatBackend, ChatMessage, CompletionRequest, OpenAiClient};
use crate::wearable::ProcessedWearable;
use crate::{NeuroSyncError, Result};

const FOCUS_DISPLAY_CHARS: usize = 50;
const SUMMARY_CHARS: usize = 100;
const SLEEP_WINDOW: usize = 7;

const PROGRESS_SYSTEM_PROMPT: &str =
    "You are a mental health analytics expert specializing in progress assessment and trend analysis.";
const EXERCISE_SYSTEM_PROMPT: &str = "You are an expert in mental health exercises and interventions, specializing in creating personalized practices for individuals.";
const SENTIMENT_SYSTEM_PROMPT: &str = "You are a mental health sentiment analysis expert. \
    Analyze the sentiment of the journal entry and provide an emotional assessment. \
    Respond with JSON in this format: \
    {'sentiment_score': number from 1-10, 'primary_emotion': string, \
    'emotional_tone': string, 'key_concerns': [strings], 'strengths': [strings]}";
const SLEEP_SYSTEM_PROMPT: &str = "You are a sleep scientist specializing in the relationship between sleep and mental health. \
    Analyze sleep data and provide evidence-based insights and recommendations.";

/// Lenient field decoders for model-produced JSON, where a field documented as
/// a list may arrive as a single string and vice versa.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(as_text).collect(),
            other => as_text(other).into_iter().filter(|s| !s.is_empty()).collect(),
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(as_text)
                .collect::<Vec<_>>()
                .join("\n"),
            other => as_text(other).unwrap_or_default(),
        })
    }

    pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or(super::FALLBACK_WELLNESS),
            Value::String(s) => s.trim().parse().unwrap_or(super::FALLBACK_WELLNESS),
            _ => super::FALLBACK_WELLNESS,
        })
    }
}

const FALLBACK_WELLNESS: f64 = 50.0;

fn fallback_wellness() -> f64 {
    FALLBACK_WELLNESS
}

/// Latest journal entry and wearable record, as fed into prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshot<'a> {
    pub journal: Option<&'a JournalEntry>,
    pub wearable: Option<&'a ProcessedWearable>,
}

impl<'a> Snapshot<'a> {
    pub fn latest(journal: &'a [JournalEntry], wearable: &'a [ProcessedWearable]) -> Self {
        Self {
            journal: journal.last(),
            wearable: wearable.last(),
        }
    }
}

/// A coaching conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingSession {
    pub session_id: String,
    pub date: NaiveDate,
    pub persona_id: String,
    pub persona_name: String,
    /// Opening request, shortened for display
    pub focus: String,
    pub messages: Vec<ChatMessage>,
}

fn display_focus(focus: &str) -> String {
    if focus.chars().count() > FOCUS_DISPLAY_CHARS {
        let short: String = focus.chars().take(FOCUS_DISPLAY_CHARS).collect();
        format!("{}...", short)
    } else {
        focus.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    #[serde(default, deserialize_with = "lenient::text")]
    pub overall_trend: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub key_improvements: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub challenge_areas: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub correlations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub recommendations: Vec<String>,
    #[serde(default = "fallback_wellness", deserialize_with = "lenient::score")]
    pub wellness_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressAnalysis {
    fn failed(error: &NeuroSyncError) -> Self {
        Self {
            overall_trend: "Unable to analyze due to technical error".to_string(),
            key_improvements: vec!["Data available but analysis failed".to_string()],
            challenge_areas: vec!["System error in analysis".to_string()],
            correlations: Vec::new(),
            recommendations: vec![
                "Try again later".to_string(),
                "Continue with regular journaling and tracking".to_string(),
            ],
            wellness_score: FALLBACK_WELLNESS,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub sufficient_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ProgressAnalysis>,
}

impl ProgressReport {
    fn insufficient() -> Self {
        Self {
            sufficient_data: false,
            message: Some(
                "Insufficient journal data to analyze progress. Please continue journaling regularly."
                    .to_string(),
            ),
            analysis: None,
        }
    }
}

/// What the exercise generator knows about the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    #[serde(default)]
    pub mood_score: Option<u8>,
    #[serde(default)]
    pub stress_level: Option<u8>,
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub key_concerns: Vec<String>,
}

impl ExerciseProfile {
    pub fn from_journal(entry: Option<&JournalEntry>) -> Self {
        entry.map_or_else(Self::default, |e| Self {
            mood_score: Some(e.mood_score),
            stress_level: Some(e.stress_level),
            sleep_quality: Some(e.sleep_quality),
            key_concerns: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub introduction: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub materials_needed: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tips: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub variations: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub daily_integration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Exercise {
    fn basic_breathing(error: &NeuroSyncError) -> Self {
        Self {
            title: "Basic Mindful Breathing Exercise".to_string(),
            introduction: "This simple breathing exercise can help center your mind and reduce stress."
                .to_string(),
            materials_needed: "None needed".to_string(),
            steps: [
                "Find a comfortable seated position",
                "Close your eyes or maintain a soft gaze",
                "Breathe naturally and observe your breath",
                "Count each inhale and exhale up to 10, then start again",
                "Continue for 5 minutes",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tips: "If your mind wanders, gently return focus to your breath without judgment".to_string(),
            variations: "Can be done standing or lying down if preferred".to_string(),
            daily_integration: "Practice first thing in the morning or during a stressful moment".to_string(),
            error: Some(error.to_string()),
        }
    }
}

/// Model-assessed sentiment of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSentiment {
    #[serde(default = "neutral_score", deserialize_with = "lenient::score")]
    pub sentiment_score: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub primary_emotion: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub emotional_tone: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub key_concerns: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn neutral_score() -> f64 {
    5.0
}

impl AiSentiment {
    fn neutral(error: &NeuroSyncError) -> Self {
        Self {
            sentiment_score: neutral_score(),
            primary_emotion: "neutral".to_string(),
            emotional_tone: "moderate".to_string(),
            key_concerns: vec!["Unable to analyze due to API error".to_string()],
            strengths: vec!["Journaling practice".to_string()],
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepAnalysis {
    #[serde(default, deserialize_with = "lenient::text")]
    pub overall_assessment: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sleep_mood_correlation: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub key_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub positive_habits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SleepAnalysis {
    fn unconfigured() -> Self {
        Self {
            overall_assessment: "Unable to analyze due to API key not available".to_string(),
            sleep_mood_correlation: "Data unavailable".to_string(),
            key_issues: vec!["API key not configured".to_string()],
            recommendations: vec!["Please configure an API key for the language model".to_string()],
            positive_habits: vec!["Continuing to track sleep data".to_string()],
            error: None,
        }
    }

    fn failed(error: &NeuroSyncError) -> Self {
        Self {
            overall_assessment: "Unable to analyze due to API error".to_string(),
            sleep_mood_correlation: "Data unavailable".to_string(),
            key_issues: vec!["API connection error".to_string()],
            recommendations: vec![
                "Try again later".to_string(),
                "Focus on consistent sleep schedule".to_string(),
            ],
            positive_habits: vec!["Continuing to track sleep data".to_string()],
            error: Some(error.to_string()),
        }
    }
}

fn coaching_prompt(snapshot: Snapshot<'_>, focus: &str) -> String {
    let na = || "N/A".to_string();
    let journal = snapshot.journal;
    let names = journal.map(|j| j.activities.names()).unwrap_or_default();
    let activities = if names.is_empty() {
        "none specified".to_string()
    } else {
        names.join(", ")
    };

    let mut prompt = format!(
        "I'm seeking personalized mental health coaching about: {focus}\n\n\
         MY CURRENT STATE:\n\
         - Mood: {}/10\n\
         - Stress: {}/10\n\
         - Sleep: {}/10\n\
         - Recent activities: {}\n\
         - Recent journal entry: \"{}\"\n\n",
        journal.map_or_else(na, |j| j.mood_score.to_string()),
        journal.map_or_else(na, |j| j.stress_level.to_string()),
        journal.map_or_else(na, |j| j.sleep_quality.to_string()),
        activities,
        journal.map_or("No recent journal entry", |j| j.content.as_str()),
    );

    if let Some(w) = snapshot.wearable {
        prompt.push_str(&format!(
            "MY HEALTH METRICS:\n\
             - Heart rate: {} bpm\n\
             - Sleep duration: {} hours\n\
             - Physical activity: {} steps\n\
             - Activity minutes: {} minutes\n",
            w.metrics.avg_heart_rate, w.metrics.sleep_hours, w.metrics.steps, w.metrics.activity_minutes
        ));
        if let Some(score) = w.wellness_score {
            prompt.push_str(&format!("- Overall wellness score: {}/100\n", score));
        }
    }

    prompt.push_str(&format!(
        "\nCOACHING REQUEST:\n\
         I would like specific guidance on {focus}. Please provide:\n\
         1. An assessment of my current state related to this area\n\
         2. Practical strategies I can implement immediately\n\
         3. Longer-term approaches for sustainable improvement\n\
         4. How I can measure my progress in this area\n"
    ));
    prompt
}

fn summarize(content: &str) -> String {
    if content.chars().count() > SUMMARY_CHARS {
        let short: String = content.chars().take(SUMMARY_CHARS).collect();
        format!("{}...", short)
    } else {
        content.to_string()
    }
}

fn last_n<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Coaching front-end over an optional language model
#[derive(Clone, Default)]
pub struct Coach {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl Coach {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    /// Coach that only ever serves fallback content
    pub fn offline() -> Self {
        Self { backend: None }
    }

    /// Build from config; offline when no API key is configured
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match OpenAiClient::from_config(config) {
            Some(client) => {
                let client = client?;
                info!("Language model enabled: {} at {}", client.model(), config.url);
                Ok(Self::new(Some(Arc::new(client))))
            }
            None => {
                info!(
                    "No API key in config or ${}; coaching runs offline",
                    config.api_key_env
                );
                Ok(Self::offline())
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    async fn ask(&self, request: CompletionRequest) -> Result<String> {
        match &self.backend {
            Some(backend) => backend.complete(request).await,
            None => Err(NeuroSyncError::LlmUnavailable(
                "No API key configured".to_string(),
            )),
        }
    }

    async fn ask_json<T: DeserializeOwned>(&self, request: CompletionRequest) -> Result<T> {
        let reply = self.ask(request.json()).await?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }

    /// Persona-driven coaching reply. Falls back to an apology in markdown.
    pub async fn coaching_advice(
        &self,
        snapshot: Snapshot<'_>,
        focus: &str,
        persona_id: &str,
        history: &[ChatMessage],
    ) -> String {
        let persona = persona(persona_id);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(persona.system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(coaching_prompt(snapshot, focus)));

        let request = CompletionRequest::new(messages).max_tokens(1200).temperature(0.7);
        match self.ask(request).await {
            Ok(advice) => advice,
            Err(e) => {
                warn!("Coaching advice unavailable: {}", e);
                format!(
                    "# Coaching Advice Unavailable\n\n\
                     I apologize, but I'm unable to generate personalized coaching at the moment due to a technical issue.\n\n\
                     **Error:** {}\n\n\
                     Please try again later or select a different coaching focus or persona.\n",
                    e
                )
            }
        }
    }

    /// Open a session with the first exchange already recorded
    pub async fn start_session(
        &self,
        snapshot: Snapshot<'_>,
        focus: &str,
        persona_id: &str,
        today: NaiveDate,
    ) -> CoachingSession {
        let persona = persona(persona_id);
        let reply = self.coaching_advice(snapshot, focus, persona.id, &[]).await;

        CoachingSession {
            session_id: uuid::Uuid::new_v4().to_string(),
            date: today,
            persona_id: persona.id.to_string(),
            persona_name: persona.name.to_string(),
            focus: display_focus(focus),
            messages: vec![ChatMessage::user(focus), ChatMessage::assistant(reply)],
        }
    }

    /// Continue a session; the question and reply are appended to its messages
    pub async fn follow_up(
        &self,
        session: &mut CoachingSession,
        snapshot: Snapshot<'_>,
        question: &str,
    ) -> String {
        let mut history = session.messages.clone();
        history.push(ChatMessage::user(question));

        let reply = self
            .coaching_advice(snapshot, question, &session.persona_id, &history)
            .await;

        history.push(ChatMessage::assistant(reply.clone()));
        session.messages = history;
        reply
    }

    /// Trend analysis over the last `timeframe_days`
    pub async fn analyze_progress(
        &self,
        journal: &[JournalEntry],
        wearable: &[ProcessedWearable],
        coaching: &[CoachingSession],
        timeframe_days: u32,
        today: NaiveDate,
    ) -> ProgressReport {
        let cutoff = today - Duration::days(i64::from(timeframe_days));

        let recent_journal: Vec<&JournalEntry> = journal.iter().filter(|j| j.date >= cutoff).collect();
        if recent_journal.len() < 2 {
            return ProgressReport::insufficient();
        }
        let recent_wearable: Vec<&ProcessedWearable> =
            wearable.iter().filter(|w| w.date >= cutoff).collect();
        let focus_areas: BTreeSet<&str> = coaching
            .iter()
            .filter(|c| c.date >= cutoff)
            .map(|c| c.focus.as_str())
            .collect();

        let mood: Vec<_> = recent_journal
            .iter()
            .map(|j| serde_json::json!({ "date": j.date, "score": j.mood_score }))
            .collect();
        let stress: Vec<_> = recent_journal
            .iter()
            .map(|j| serde_json::json!({ "date": j.date, "score": j.stress_level }))
            .collect();
        let sleep: Vec<_> = recent_wearable
            .iter()
            .map(|w| serde_json::json!({ "date": w.date, "hours": w.metrics.sleep_hours }))
            .collect();
        let activity: Vec<_> = recent_wearable
            .iter()
            .map(|w| serde_json::json!({ "date": w.date, "steps": w.metrics.steps }))
            .collect();

        let prompt = format!(
            "I need an analysis of a user's mental health progress over the past {} days.\n\n\
             MOOD DATA:\n{}\n\n\
             STRESS DATA:\n{}\n\n\
             SLEEP DATA:\n{}\n\n\
             ACTIVITY DATA:\n{}\n\n\
             COACHING FOCUS AREAS:\n{}\n\n\
             Please provide a comprehensive analysis of:\n\
             1. Overall trend in mood and mental wellbeing\n\
             2. Progress in areas the user has been focusing on\n\
             3. Correlations between different metrics (e.g., sleep and mood)\n\
             4. Areas of improvement and areas that need continued attention\n\
             5. Recommendations for next steps in their mental health journey\n\n\
             Format your response as a JSON object with the following keys:\n\
             - overall_trend: A summary of the general direction of the user's mental health\n\
             - key_improvements: List of areas where the user has shown progress\n\
             - challenge_areas: List of areas that need continued attention\n\
             - correlations: Any notable relationships between different metrics\n\
             - recommendations: Specific, actionable suggestions for continued progress\n\
             - wellness_score: A score from 1-100 representing overall mental wellness trend\n",
            timeframe_days,
            serde_json::Value::from(mood),
            serde_json::Value::from(stress),
            serde_json::Value::from(sleep),
            serde_json::Value::from(activity),
            focus_areas.into_iter().collect::<Vec<_>>().join(", "),
        );

        let request = CompletionRequest::new(vec![
            ChatMessage::system(PROGRESS_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ]);

        let analysis = match self.ask_json::<ProgressAnalysis>(request).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Progress analysis failed: {}", e);
                ProgressAnalysis::failed(&e)
            }
        };

        ProgressReport {
            sufficient_data: true,
            message: None,
            analysis: Some(analysis),
        }
    }

    pub async fn personalized_exercise(
        &self,
        profile: &ExerciseProfile,
        exercise_type: &str,
        duration_minutes: u32,
        difficulty: &str,
    ) -> Exercise {
        let rating = |v: Option<u8>| v.map_or_else(|| "Unknown".to_string(), |v| v.to_string());
        let concerns = if profile.key_concerns.is_empty() {
            "General wellbeing".to_string()
        } else {
            profile.key_concerns.join(", ")
        };

        let prompt = format!(
            "Create a personalized {exercise_type} exercise for a user with the following profile:\n\n\
             RECENT MOOD: {}/10\n\
             STRESS LEVEL: {}/10\n\
             SLEEP QUALITY: {}/10\n\
             PRIMARY CONCERNS: {}\n\n\
             The exercise should:\n\
             - Take approximately {duration_minutes} minutes to complete\n\
             - Be appropriate for a {difficulty} level practitioner\n\
             - Address the user's specific mental health needs\n\
             - Include clear, step-by-step instructions\n\
             - Provide guidance on how to integrate this practice into daily life\n\n\
             Format your response as a JSON object with the following keys:\n\
             - title: A brief, engaging title for the exercise\n\
             - introduction: A short paragraph explaining the purpose and benefits\n\
             - materials_needed: Any items or preparation required (if none, specify \"None needed\")\n\
             - steps: Numbered list of instructions\n\
             - tips: Additional guidance for effective practice\n\
             - variations: 1-2 alternative ways to perform the exercise for different situations\n\
             - daily_integration: How to incorporate this into a regular routine\n",
            rating(profile.mood_score),
            rating(profile.stress_level),
            rating(profile.sleep_quality),
            concerns,
        );

        let request = CompletionRequest::new(vec![
            ChatMessage::system(EXERCISE_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ]);

        match self.ask_json::<Exercise>(request).await {
            Ok(exercise) => exercise,
            Err(e) => {
                warn!("Exercise generation failed: {}", e);
                Exercise::basic_breathing(&e)
            }
        }
    }

    /// Markdown coping strategies, or the generic set when the model is unavailable
    pub async fn coping_strategies(&self, snapshot: Snapshot<'_>, request: &StrategyRequest) -> String {
        if !self.is_online() {
            return fallback_strategies(&request.focus_areas, request.time_available, &request.environment);
        }

        let completion = CompletionRequest::new(vec![
            ChatMessage::system(strategies::SYSTEM_PROMPT),
            ChatMessage::user(strategies::strategy_prompt(snapshot, request)),
        ])
        .max_tokens(800);

        match self.ask(completion).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Strategy generation failed, using fallback: {}", e);
                fallback_strategies(&request.focus_areas, request.time_available, &request.environment)
            }
        }
    }

    pub async fn journal_sentiment(&self, text: &str) -> AiSentiment {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SENTIMENT_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ]);

        match self.ask_json::<AiSentiment>(request).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!("Journal sentiment analysis failed: {}", e);
                AiSentiment::neutral(&e)
            }
        }
    }

    /// Relate the last week of sleep to mood and stress
    pub async fn sleep_patterns(
        &self,
        sleep: &[ProcessedWearable],
        journal: &[JournalEntry],
    ) -> SleepAnalysis {
        if !self.is_online() {
            return SleepAnalysis::unconfigured();
        }

        let sleep_entries: Vec<_> = last_n(sleep, SLEEP_WINDOW)
            .iter()
            .map(|w| {
                serde_json::json!({
                    "date": w.date,
                    "sleep_hours": w.metrics.sleep_hours,
                    "sleep_quality": w.metrics.sleep_quality_score.unwrap_or(0.0),
                    "deep_sleep_percentage": w.metrics.deep_sleep_percentage,
                })
            })
            .collect();
        let journal_entries: Vec<_> = last_n(journal, SLEEP_WINDOW)
            .iter()
            .map(|j| {
                serde_json::json!({
                    "date": j.date,
                    "mood_score": j.mood_score,
                    "stress_level": j.stress_level,
                    "content_summary": summarize(&j.content),
                })
            })
            .collect();

        let pretty = |v: Vec<serde_json::Value>| {
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| "[]".to_string())
        };

        let prompt = format!(
            "Analyze the following sleep data and journal entries:\n\n\
             SLEEP DATA:\n{}\n\n\
             JOURNAL DATA:\n{}\n\n\
             Provide a sleep pattern analysis that includes:\n\
             1. Overall sleep quality assessment\n\
             2. Correlation between sleep and mood/stress\n\
             3. Most significant sleep issues\n\
             4. Actionable recommendations for improvement\n\
             5. Positive sleep habits to maintain\n\n\
             Format as JSON with these keys: 'overall_assessment', 'sleep_mood_correlation', 'key_issues', 'recommendations', 'positive_habits'\n",
            pretty(sleep_entries),
            pretty(journal_entries),
        );

        let request = CompletionRequest::new(vec![
            ChatMessage::system(SLEEP_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ]);

        match self.ask_json::<SleepAnalysis>(request).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Sleep analysis failed: {}", e);
                SleepAnalysis::failed(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::process_journal_entry;
    use crate::journal::tests::input;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubBackend {
        reply: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl StubBackend {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> CompletionRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatBackend for StubBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            Err(NeuroSyncError::LlmUnavailable("status 503".to_string()))
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entries(dates: &[&str]) -> Vec<JournalEntry> {
        dates
            .iter()
            .map(|d| process_journal_entry(input(d, "Busy but fine day", 6, 4)).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_advice_uses_persona_and_history() {
        let stub = StubBackend::new("Try box breathing.");
        let coach = Coach::new(Some(stub.clone()));
        let journal = entries(&["2024-03-01"]);
        let history = vec![ChatMessage::user("earlier"), ChatMessage::assistant("reply")];

        let advice = coach
            .coaching_advice(Snapshot::latest(&journal, &[]), "panic at work", "anxiety", &history)
            .await;
        assert_eq!(advice, "Try box breathing.");

        let request = stub.last_request();
        assert_eq!(request.messages.len(), 4);
        assert!(request.messages[0].content.starts_with("You are a specialized anxiety coach"));
        assert!(request.messages[3].content.contains("coaching about: panic at work"));
        assert!(request.messages[3].content.contains("- Mood: 6/10"));
        assert!(request.messages[3].content.contains("- Recent activities: none specified"));
        assert_eq!(request.max_tokens, Some(1200));
        assert!(!request.json);
    }

    #[tokio::test]
    async fn test_advice_fallback_when_offline() {
        let advice = Coach::offline()
            .coaching_advice(Snapshot::default(), "sleep", "sleep", &[])
            .await;
        assert!(advice.starts_with("# Coaching Advice Unavailable"));
        assert!(advice.contains("No API key configured"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let stub = StubBackend::new("Noted.");
        let coach = Coach::new(Some(stub.clone()));
        let focus = "I keep waking up at 3am and can't fall back asleep afterwards, what can I do";

        let mut session = coach
            .start_session(Snapshot::default(), focus, "unknown-persona", date("2024-03-10"))
            .await;
        assert_eq!(session.persona_id, "general");
        assert_eq!(session.focus.chars().count(), 53);
        assert!(session.focus.ends_with("..."));
        assert_eq!(session.messages[0].content, focus);
        assert_eq!(session.messages.len(), 2);

        let reply = coach.follow_up(&mut session, Snapshot::default(), "And naps?").await;
        assert_eq!(reply, "Noted.");
        assert_eq!(session.messages.len(), 4);
        assert_eq!(session.messages[2], ChatMessage::user("And naps?"));
        // system + 3 prior messages + new prompt
        assert_eq!(stub.last_request().messages.len(), 5);
    }

    #[tokio::test]
    async fn test_progress_requires_two_recent_entries() {
        let coach = Coach::new(Some(StubBackend::new("{}")));
        let journal = entries(&["2024-01-01", "2024-03-09"]);
        let report = coach
            .analyze_progress(&journal, &[], &[], 30, date("2024-03-10"))
            .await;
        assert!(!report.sufficient_data);
        assert!(report.analysis.is_none());
    }

    #[tokio::test]
    async fn test_progress_accepts_string_or_list_fields() {
        let stub = StubBackend::new(
            r#"```json
            {"overall_trend": "Improving", "key_improvements": "Better sleep",
             "challenge_areas": ["Stress", "Work"], "correlations": [],
             "recommendations": ["Walk daily"], "wellness_score": "72"}
            ```"#,
        );
        let coach = Coach::new(Some(stub.clone()));
        let journal = entries(&["2024-03-08", "2024-03-09"]);

        let report = coach
            .analyze_progress(&journal, &[], &[], 30, date("2024-03-10"))
            .await;
        let analysis = report.analysis.unwrap();
        assert!(report.sufficient_data);
        assert_eq!(analysis.key_improvements, ["Better sleep"]);
        assert_eq!(analysis.challenge_areas.len(), 2);
        assert_eq!(analysis.wellness_score, 72.0);
        assert!(stub.last_request().json);

        let json = serde_json::to_value(
            coach.analyze_progress(&journal, &[], &[], 30, date("2024-03-10")).await,
        )
        .unwrap();
        assert_eq!(json["sufficient_data"], true);
        assert_eq!(json["overall_trend"], "Improving");
    }

    #[tokio::test]
    async fn test_progress_fallback_on_error() {
        let coach = Coach::new(Some(Arc::new(FailingBackend)));
        let journal = entries(&["2024-03-08", "2024-03-09"]);
        let analysis = coach
            .analyze_progress(&journal, &[], &[], 30, date("2024-03-10"))
            .await
            .analysis
            .unwrap();
        assert_eq!(analysis.wellness_score, 50.0);
        assert!(analysis.error.unwrap().contains("status 503"));
    }

    #[tokio::test]
    async fn test_exercise_fallback_on_bad_json() {
        let coach = Coach::new(Some(StubBackend::new("not json at all")));
        let exercise = coach
            .personalized_exercise(&ExerciseProfile::default(), "breathing", 5, "beginner")
            .await;
        assert_eq!(exercise.title, "Basic Mindful Breathing Exercise");
        assert_eq!(exercise.steps.len(), 5);
        assert!(exercise.error.is_some());
    }

    #[tokio::test]
    async fn test_exercise_parsed() {
        let stub = StubBackend::new(
            r#"{"title": "Grounding", "introduction": "Intro", "materials_needed": "None needed",
                "steps": "Sit down", "tips": ["Go slow", "Breathe"], "variations": "Standing",
                "daily_integration": "Mornings"}"#,
        );
        let coach = Coach::new(Some(stub.clone()));
        let profile = ExerciseProfile {
            mood_score: Some(4),
            key_concerns: vec!["Work stress".to_string()],
            ..Default::default()
        };
        let exercise = coach.personalized_exercise(&profile, "grounding", 10, "beginner").await;
        assert_eq!(exercise.steps, ["Sit down"]);
        assert_eq!(exercise.tips, "Go slow\nBreathe");

        let prompt = &stub.last_request().messages[1].content;
        assert!(prompt.contains("RECENT MOOD: 4/10"));
        assert!(prompt.contains("STRESS LEVEL: Unknown/10"));
        assert!(prompt.contains("PRIMARY CONCERNS: Work stress"));
    }

    #[tokio::test]
    async fn test_strategies_offline_and_failing() {
        let request = StrategyRequest {
            focus_areas: vec!["gratitude".to_string()],
            time_available: 10,
            environment: "Home".to_string(),
        };
        let offline = Coach::offline().coping_strategies(Snapshot::default(), &request).await;
        assert_eq!(offline, fallback_strategies(&request.focus_areas, 10, "Home"));

        let failing = Coach::new(Some(Arc::new(FailingBackend)))
            .coping_strategies(Snapshot::default(), &request)
            .await;
        assert_eq!(failing, offline);
    }

    #[tokio::test]
    async fn test_strategies_online() {
        let stub = StubBackend::new("## Strategies");
        let coach = Coach::new(Some(stub.clone()));
        let request = StrategyRequest {
            focus_areas: vec!["Sleep Improvement".to_string()],
            time_available: 20,
            environment: "Work".to_string(),
        };
        let text = coach.coping_strategies(Snapshot::default(), &request).await;
        assert_eq!(text, "## Strategies");
        assert_eq!(stub.last_request().max_tokens, Some(800));
    }

    #[test]
    fn test_sentiment_fallback() {
        let coach = Coach::offline();
        let sentiment = tokio_test::block_on(coach.journal_sentiment("Rough day"));
        assert_eq!(sentiment.sentiment_score, 5.0);
        assert_eq!(sentiment.primary_emotion, "neutral");
        assert!(sentiment.error.is_some());
    }

    #[tokio::test]
    async fn test_sleep_fallbacks_are_distinct() {
        let offline = Coach::offline().sleep_patterns(&[], &[]).await;
        assert_eq!(offline.key_issues, ["API key not configured"]);

        let failing = Coach::new(Some(Arc::new(FailingBackend))).sleep_patterns(&[], &[]).await;
        assert_eq!(failing.key_issues, ["API connection error"]);
        assert!(failing.error.is_some());
    }

    #[tokio::test]
    async fn test_sleep_prompt_summarizes_last_week() {
        let stub = StubBackend::new(r#"{"overall_assessment": "Fair", "key_issues": "Late nights"}"#);
        let coach = Coach::new(Some(stub.clone()));
        let mut journal = entries(&[
            "2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04", "2024-03-05",
            "2024-03-06", "2024-03-07", "2024-03-08",
        ]);
        journal[7].content = "x".repeat(150);

        let analysis = coach.sleep_patterns(&[], &journal).await;
        assert_eq!(analysis.overall_assessment, "Fair");
        assert_eq!(analysis.key_issues, ["Late nights"]);

        let prompt = &stub.last_request().messages[1].content;
        assert!(!prompt.contains("2024-03-01"));
        assert!(prompt.contains(&format!("{}...", "x".repeat(100))));
    }

    #[test]
    fn test_display_focus() {
        assert_eq!(display_focus("short"), "short");
        assert_eq!(display_focus(&"a".repeat(50)), "a".repeat(50));
    }
}
