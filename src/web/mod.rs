// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web dashboard and JSON API

mod api;
mod pages;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::coaching::Coach;
use crate::config::AppConfig;
use crate::store::UserStore;
use crate::NeuroSyncError;

/// Shared application state
pub struct AppState {
    pub store: UserStore,
    pub coach: Coach,
    pub config: AppConfig,
    rng: Mutex<StdRng>,
}

impl AppState {
    /// Mock device data is reproducible across runs when `wearable.mock_seed` is set
    pub fn new(config: AppConfig, coach: Coach) -> Self {
        let rng = match config.wearable.mock_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store: UserStore::new(),
            coach,
            config,
            rng: Mutex::new(rng),
        }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> crate::Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| NeuroSyncError::Store("rng lock poisoned".to_string()))?;
        Ok(f(&mut rng))
    }
}

/// `?user=` on page routes
#[derive(Debug, Default, Deserialize)]
struct UserQuery {
    user: Option<String>,
}

impl UserQuery {
    fn resolve(self, config: &AppConfig) -> String {
        self.user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| config.web.default_user.clone())
    }
}

/// Error body returned by every API route
pub struct ApiError(NeuroSyncError);

impl From<NeuroSyncError> for ApiError {
    fn from(err: NeuroSyncError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NeuroSyncError::Validation(_) => StatusCode::BAD_REQUEST,
            NeuroSyncError::NotFound(_) => StatusCode::NOT_FOUND,
            other => {
                error!("Request failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// `Json` extractor that reports malformed bodies as validation errors
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(NeuroSyncError::Validation(rejection.body_text()).into()),
        }
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(pages::index_page))
        .route("/journal", get(pages::journal_page))
        .route("/wearables", get(pages::wearables_page))
        .route("/insights", get(pages::insights_page))
        .route("/strategies", get(pages::strategies_page))
        .route("/coaching", get(pages::coaching_page))
        .route("/garden", get(pages::garden_page))
        .route("/privacy", get(pages::privacy_page))
        // Journal & wearables
        .route("/api/users/:user", axum::routing::delete(api::delete_user))
        .route("/api/users/:user/journal", get(api::list_journal).post(api::add_journal))
        .route("/api/users/:user/wearables", get(api::list_wearables).post(api::add_wearable))
        .route("/api/users/:user/wearables/sync", post(api::sync_wearables))
        .route("/api/devices", get(api::devices))
        .route("/api/devices/:device/data-types", get(api::device_data_types))
        .route("/api/devices/:device/realtime", get(api::device_realtime))
        // Analysis
        .route("/api/users/:user/wellness", get(api::wellness))
        .route("/api/users/:user/stress", get(api::stress))
        .route("/api/users/:user/insights", get(api::insights))
        .route("/api/users/:user/strategies", get(api::list_strategies).post(api::create_strategies))
        // Coaching
        .route("/api/personas", get(api::personas))
        .route(
            "/api/users/:user/coaching/sessions",
            get(api::list_sessions).post(api::start_session),
        )
        .route("/api/users/:user/coaching/sessions/:session/messages", post(api::follow_up))
        .route("/api/users/:user/coaching/progress", post(api::progress))
        .route("/api/users/:user/coaching/exercise", post(api::exercise))
        .route("/api/analysis/sentiment", post(api::ai_sentiment))
        .route("/api/users/:user/sleep-analysis", get(api::sleep_analysis))
        // Zen garden
        .route("/api/users/:user/garden", get(api::garden).put(api::update_garden))
        .route("/api/users/:user/garden/items", post(api::place_garden_item))
        .route("/api/users/:user/garden/sessions", post(api::record_meditation))
        .route("/api/users/:user/garden/stats", get(api::meditation_stats))
        .route("/api/garden/wisdom", get(api::wisdom))
        .route("/api/garden/meditation", get(api::guided_meditation))
        // Privacy
        .route("/api/users/:user/export", get(api::export))
        .route("/api/privacy", get(api::privacy))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server with config and coach
pub async fn start_server(config: AppConfig, coach: Coach) -> crate::Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config, coach));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("NeuroSync dashboard available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| NeuroSyncError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
