// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! JSON API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{ApiResult, AppState, ValidJson};
use crate::analysis::{analyze_mood_patterns, calculate_wellness_score, predict_stress_level, StressPrediction};
use crate::coaching::{
    AiSentiment, CoachingSession, CopingStrategy, Exercise, ExerciseProfile, Persona, ProgressReport, SleepAnalysis,
    Snapshot, StrategyRequest, DEFAULT_PERSONA, PERSONAS,
};
use crate::garden::{
    guided_meditation_text, zen_wisdom, GardenItem, GardenLayout, MeditationFocus, MeditationSession, MeditationStats,
    ZenGarden,
};
use crate::journal::{process_journal_entry, JournalEntry, JournalInput};
use crate::privacy::{create_data_export, privacy_summary, DataExport};
use crate::wearable::devices::{self, RealTimeMetrics};
use crate::wearable::{process_wearable_data, ProcessedWearable, WearableSample};
use crate::NeuroSyncError;

const DEFAULT_SYNC_DAYS: u32 = 7;
const MAX_SYNC_DAYS: u32 = 90;

fn require_text(name: &str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(NeuroSyncError::Validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn known_device(device: &str) -> bool {
    devices::device_list().contains(&device)
}

// === Journal & wearables ===

pub(super) async fn list_journal(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<JournalEntry>>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(data.journal_entries))
}

pub(super) async fn add_journal(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(input): ValidJson<JournalInput>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    require_text("content", &input.content)?;
    let entry = process_journal_entry(input)?;
    state.store.update(&user, state.today(), |data| {
        data.journal_entries.push(entry.clone());
        Ok(())
    })?;
    info!("Journal entry {} saved for {}", entry.id, user);
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(super) async fn list_wearables(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<ProcessedWearable>>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(data.wearable_data))
}

pub(super) async fn add_wearable(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(sample): ValidJson<WearableSample>,
) -> ApiResult<(StatusCode, Json<ProcessedWearable>)> {
    let today = state.today();
    let record = process_wearable_data(sample, today);
    state.store.update(&user, today, |data| {
        data.wearable_data.push(record.clone());
        Ok(())
    })?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncRequest {
    device: Option<String>,
    data_types: Option<Vec<String>>,
    days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncResponse {
    message: String,
    records: Vec<ProcessedWearable>,
}

/// Import simulated data for the last few days, oldest first
pub(super) async fn sync_wearables(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<SyncRequest>,
) -> ApiResult<Json<SyncResponse>> {
    let device = request
        .device
        .unwrap_or_else(|| state.config.wearable.default_device.clone());
    if !known_device(&device) {
        return Err(NeuroSyncError::Validation(format!("unknown device: {}", device)).into());
    }
    let days = request.days.unwrap_or(DEFAULT_SYNC_DAYS);
    if !(1..=MAX_SYNC_DAYS).contains(&days) {
        return Err(NeuroSyncError::Validation(format!(
            "days must be between 1 and {}",
            MAX_SYNC_DAYS
        ))
        .into());
    }

    let (_, message) = devices::connect(&device);
    let data_types: Vec<String> = request.data_types.unwrap_or_else(|| {
        devices::available_data_types(&device)
            .into_iter()
            .map(String::from)
            .collect()
    });
    let metrics: Vec<&str> = data_types.iter().map(String::as_str).collect();

    let today = state.today();
    let records: Vec<ProcessedWearable> = state.with_rng(|rng| {
        (0..i64::from(days))
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset);
                process_wearable_data(devices::mock_wearable_data(date, &metrics, rng), today)
            })
            .collect()
    })?;

    state.store.update(&user, today, |data| {
        data.wearable_data.extend(records.iter().cloned());
        Ok(())
    })?;
    info!("Imported {} days of {} data for {}", days, device, user);

    Ok(Json(SyncResponse { message, records }))
}

pub(super) async fn devices() -> Json<Vec<&'static str>> {
    Json(devices::device_list())
}

pub(super) async fn device_data_types(Path(device): Path<String>) -> ApiResult<Json<Vec<&'static str>>> {
    if !known_device(&device) {
        return Err(NeuroSyncError::NotFound(format!("device {}", device)).into());
    }
    Ok(Json(devices::available_data_types(&device)))
}

#[derive(Debug, Deserialize)]
pub(super) struct RealtimeQuery {
    /// Comma-separated metric names
    metrics: Option<String>,
}

pub(super) async fn device_realtime(
    State(state): State<Arc<AppState>>,
    Path(device): Path<String>,
    Query(query): Query<RealtimeQuery>,
) -> ApiResult<Json<RealTimeMetrics>> {
    if !known_device(&device) {
        return Err(NeuroSyncError::NotFound(format!("device {}", device)).into());
    }
    let requested: Option<Vec<&str>> = query
        .metrics
        .as_deref()
        .map(|m| m.split(',').map(str::trim).filter(|m| !m.is_empty()).collect());
    let now = state.now();
    let metrics = state.with_rng(|rng| devices::real_time_metrics(&device, requested.as_deref(), now, rng))?;
    Ok(Json(metrics))
}

// === Analysis ===

#[derive(Debug, Serialize)]
pub(super) struct WellnessResponse {
    date: Option<NaiveDate>,
    wellness_score: Option<u8>,
}

pub(super) async fn wellness(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<WellnessResponse>> {
    let data = state.store.load(&user, state.today())?;
    let latest = data.wearable_data.last();
    Ok(Json(WellnessResponse {
        date: latest.map(|w| w.date),
        wellness_score: latest.map(calculate_wellness_score),
    }))
}

pub(super) async fn stress(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<StressPrediction>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(predict_stress_level(
        data.journal_entries.last(),
        data.wearable_data.last(),
    )))
}

pub(super) async fn insights(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(analyze_mood_patterns(&data.journal_entries, &data.wearable_data)))
}

pub(super) async fn list_strategies(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<CopingStrategy>>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(data.coping_strategies))
}

pub(super) async fn create_strategies(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<StrategyRequest>,
) -> ApiResult<Json<CopingStrategy>> {
    if request.focus_areas.iter().all(|a| a.trim().is_empty()) {
        return Err(NeuroSyncError::Validation("select at least one focus area".to_string()).into());
    }

    let today = state.today();
    let data = state.store.load(&user, today)?;
    let snapshot = Snapshot::latest(&data.journal_entries, &data.wearable_data);
    let text = state.coach.coping_strategies(snapshot, &request).await;

    let strategy = CopingStrategy {
        date: today,
        focus_areas: request.focus_areas,
        strategy: text,
    };
    state.store.update(&user, today, |data| {
        data.coping_strategies.push(strategy.clone());
        Ok(())
    })?;
    Ok(Json(strategy))
}

// === Coaching ===

pub(super) async fn personas() -> Json<&'static [Persona]> {
    Json(PERSONAS.as_slice())
}

pub(super) async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<CoachingSession>>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(data.coaching_history))
}

#[derive(Debug, Deserialize)]
pub(super) struct StartSession {
    focus: String,
    #[serde(default)]
    persona: Option<String>,
}

pub(super) async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<StartSession>,
) -> ApiResult<Json<CoachingSession>> {
    require_text("focus", &request.focus)?;

    let today = state.today();
    let data = state.store.load(&user, today)?;
    let snapshot = Snapshot::latest(&data.journal_entries, &data.wearable_data);
    let persona = request.persona.as_deref().unwrap_or(DEFAULT_PERSONA);
    let session = state
        .coach
        .start_session(snapshot, &request.focus, persona, today)
        .await;

    state.store.update(&user, today, |data| {
        data.coaching_history.push(session.clone());
        Ok(())
    })?;
    info!("Coaching session {} started for {}", session.session_id, user);
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub(super) struct FollowUp {
    question: String,
}

pub(super) async fn follow_up(
    State(state): State<Arc<AppState>>,
    Path((user, session_id)): Path<(String, String)>,
    ValidJson(request): ValidJson<FollowUp>,
) -> ApiResult<Json<CoachingSession>> {
    require_text("question", &request.question)?;

    let today = state.today();
    let mut data = state.store.load(&user, today)?;
    let mut session = data.session_mut(&session_id)?.clone();
    let snapshot = Snapshot::latest(&data.journal_entries, &data.wearable_data);
    state.coach.follow_up(&mut session, snapshot, &request.question).await;

    state.store.update(&user, today, |data| {
        *data.session_mut(&session_id)? = session.clone();
        Ok(())
    })?;
    debug!("Session {} now has {} messages", session_id, session.messages.len());
    Ok(Json(session))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ProgressRequest {
    timeframe_days: Option<u32>,
}

pub(super) async fn progress(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<ProgressRequest>,
) -> ApiResult<Json<ProgressReport>> {
    let today = state.today();
    let data = state.store.load(&user, today)?;
    let timeframe = request
        .timeframe_days
        .unwrap_or(state.config.insights.progress_timeframe_days);
    let report = state
        .coach
        .analyze_progress(
            &data.journal_entries,
            &data.wearable_data,
            &data.coaching_history,
            timeframe,
            today,
        )
        .await;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub(super) struct ExerciseRequest {
    #[serde(default = "default_exercise_type")]
    exercise_type: String,
    #[serde(default = "default_exercise_minutes")]
    duration_minutes: u32,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    key_concerns: Vec<String>,
}

fn default_exercise_type() -> String { "mindfulness".to_string() }
fn default_exercise_minutes() -> u32 { 10 }
fn default_difficulty() -> String { "beginner".to_string() }

pub(super) async fn exercise(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<ExerciseRequest>,
) -> ApiResult<Json<Exercise>> {
    let data = state.store.load(&user, state.today())?;
    let mut profile = ExerciseProfile::from_journal(data.journal_entries.last());
    profile.key_concerns = request.key_concerns;

    let exercise = state
        .coach
        .personalized_exercise(&profile, &request.exercise_type, request.duration_minutes, &request.difficulty)
        .await;
    Ok(Json(exercise))
}

#[derive(Debug, Deserialize)]
pub(super) struct SentimentRequest {
    text: String,
}

pub(super) async fn ai_sentiment(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<SentimentRequest>,
) -> ApiResult<Json<AiSentiment>> {
    require_text("text", &request.text)?;
    Ok(Json(state.coach.journal_sentiment(&request.text).await))
}

pub(super) async fn sleep_analysis(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<SleepAnalysis>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(
        state
            .coach
            .sleep_patterns(&data.wearable_data, &data.journal_entries)
            .await,
    ))
}

// === Zen garden ===

pub(super) async fn garden(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<ZenGarden>> {
    let data = state.store.load(&user, state.today())?;
    Ok(Json(data.garden))
}

pub(super) async fn update_garden(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(layout): ValidJson<GardenLayout>,
) -> ApiResult<Json<ZenGarden>> {
    let today = state.today();
    let garden = state.store.update(&user, today, |data| {
        data.garden.apply_layout(layout, today)?;
        Ok(data.garden.clone())
    })?;
    Ok(Json(garden))
}

pub(super) async fn place_garden_item(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(item): ValidJson<GardenItem>,
) -> ApiResult<Json<ZenGarden>> {
    let today = state.today();
    let garden = state.store.update(&user, today, |data| {
        data.garden.place(item, today)?;
        Ok(data.garden.clone())
    })?;
    Ok(Json(garden))
}

#[derive(Debug, Deserialize)]
pub(super) struct MeditationRequest {
    duration_minutes: u32,
    #[serde(default)]
    notes: String,
}

pub(super) async fn record_meditation(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    ValidJson(request): ValidJson<MeditationRequest>,
) -> ApiResult<Json<MeditationSession>> {
    let now = state.now();
    let session = state.store.update(&user, now.date(), |data| {
        let session = data.garden.record_session(request.duration_minutes, &request.notes, now)?;
        Ok(session.clone())
    })?;
    Ok(Json(session))
}

pub(super) async fn meditation_stats(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<MeditationStats>> {
    let today = state.today();
    let data = state.store.load(&user, today)?;
    Ok(Json(data.garden.meditation_stats(today)))
}

pub(super) async fn wisdom() -> Json<Value> {
    let mut rng = rand::thread_rng();
    Json(json!({ "quote": zen_wisdom(&mut rng) }))
}

#[derive(Debug, Deserialize)]
pub(super) struct MeditationQuery {
    duration: Option<u32>,
    focus: Option<String>,
}

pub(super) async fn guided_meditation(Query(query): Query<MeditationQuery>) -> Json<Value> {
    let duration = query.duration.unwrap_or(10);
    let focus = MeditationFocus::parse(query.focus.as_deref().unwrap_or_default());
    Json(json!({
        "focus": focus,
        "duration_minutes": duration,
        "script": guided_meditation_text(duration, focus),
    }))
}

// === Privacy ===

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExportQuery {
    #[serde(default)]
    include_sensitive: bool,
}

pub(super) async fn export(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Json<DataExport>> {
    let today = state.today();
    let data = state.store.load(&user, today)?;
    Ok(Json(create_data_export(&data, query.include_sensitive, today)?))
}

pub(super) async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = state.store.delete(&user)?;
    if deleted {
        info!("Deleted all data for {}", user);
    }
    Ok(Json(json!({ "deleted": deleted })))
}

pub(super) async fn privacy() -> Json<Value> {
    Json(json!({ "summary": privacy_summary() }))
}
