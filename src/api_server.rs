// Axum API Server Module
//
// Purpose: JSON endpoints over the adoption scorer, one GET route per analytic
// operation plus an admin reload. The current snapshot sits behind a lock and
// is swapped whole on reload; each request clones its Arc once.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use moka::future::Cache;
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::{CityParams, IncomeParams, PreferenceParams, RecommendParams, SampleDogsParams, TopBreedParams};
use crate::scorer::AdoptionScorer;

// ============================================================================
// Application State
// ============================================================================

/// Snapshot currently served, tagged with a generation that bumps on every reload
struct Snapshot {
    generation: u64,
    scorer: Arc<AdoptionScorer>,
}

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Snapshot>>,
    pub cache: Cache<String, serde_json::Value>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Load the initial snapshot described by `config`
    pub async fn new(config: EngineConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading adoption snapshot...");
        let load_config = config.clone();
        let scorer = tokio::task::spawn_blocking(move || AdoptionScorer::from_config(&load_config)).await??;
        Ok(Self::from_scorer(scorer, config))
    }

    /// Serve an already-built scorer
    pub fn from_scorer(scorer: AdoptionScorer, config: EngineConfig) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            snapshot: Arc::new(RwLock::new(Snapshot {
                generation: 0,
                scorer: Arc::new(scorer),
            })),
            cache,
            config: Arc::new(config),
        }
    }

    /// Current generation and scorer; the pair is read under one lock
    fn current(&self) -> (u64, Arc<AdoptionScorer>) {
        let guard = self.snapshot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        (guard.generation, Arc::clone(&guard.scorer))
    }

    /// Reload the configured snapshot and swap it in. The old snapshot stays on failure.
    pub async fn reload(&self) -> EngineResult<u64> {
        let config = Arc::clone(&self.config);
        let scorer = tokio::task::spawn_blocking(move || AdoptionScorer::from_config(&config))
            .await
            .map_err(|e| EngineError::UpstreamUnavailable {
                reason: format!("Reload task failed: {}", e),
            })??;

        let generation = {
            let mut guard = self.snapshot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.generation += 1;
            guard.scorer = Arc::new(scorer);
            guard.generation
        };
        self.cache.invalidate_all();

        tracing::info!("Snapshot reloaded (generation {})", generation);
        Ok(generation)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Analytic operations (JSON arrays)
        .route("/top_breed_per_state", get(top_breed_per_state))
        .route("/recommend_breeds", get(recommend_breeds))
        .route("/shelter", get(shelter))
        .route("/supply_income", get(supply_income))
        .route("/over_represented", get(over_represented))
        .route("/user_preferred", get(user_preferred))
        .route("/income_recommend", get(income_recommend))
        .route("/city_breeds", get(city_breeds))
        .route("/sample_dogs", get(sample_dogs))
        .route("/dogs_by_city", get(dogs_by_city))

        // Snapshot reload
        .route("/admin/refresh", post(refresh))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (generation, scorer) = state.current();
    Json(serde_json::json!({
        "status": "healthy",
        "generation": generation,
        "dogs": scorer.data().dogs().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serve one operation from the response cache or compute it on the blocking pool
async fn run_operation<T, F>(state: &AppState, key: String, op: F) -> Result<Json<serde_json::Value>, AppError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&AdoptionScorer) -> EngineResult<Vec<T>> + Send + 'static,
{
    let (generation, scorer) = state.current();
    let cache_key = format!("{}:{}", generation, key);

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", key);
        return Ok(Json(cached));
    }

    let rows = tokio::task::spawn_blocking(move || op(&scorer))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    let result = serde_json::to_value(rows)
        .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e)))?;

    state.cache.insert(cache_key, result.clone()).await;
    Ok(Json(result))
}

async fn top_breed_per_state(
    State(state): State<AppState>,
    Query(params): Query<TopBreedParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("top_breed_per_state:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.top_breed_per_state(&params)).await
}

async fn recommend_breeds(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("recommend_breeds:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.recommend_breeds(&params)).await
}

async fn shelter(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    run_operation(&state, "shelter".to_string(), |scorer| Ok(scorer.shelter_economics())).await
}

async fn supply_income(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    run_operation(&state, "supply_income".to_string(), |scorer| Ok(scorer.supply_income())).await
}

async fn over_represented(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    run_operation(&state, "over_represented".to_string(), |scorer| Ok(scorer.over_represented())).await
}

async fn user_preferred(
    State(state): State<AppState>,
    Query(params): Query<PreferenceParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("user_preferred:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.user_preferred(&params)).await
}

async fn income_recommend(
    State(state): State<AppState>,
    Query(params): Query<IncomeParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("income_recommend:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.income_recommend(&params)).await
}

async fn city_breeds(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    run_operation(&state, "city_breeds".to_string(), |scorer| Ok(scorer.city_breeds())).await
}

async fn sample_dogs(
    State(state): State<AppState>,
    Query(params): Query<SampleDogsParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("sample_dogs:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.sample_dogs(&params)).await
}

async fn dogs_by_city(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = format!("dogs_by_city:{:?}", params);
    run_operation(&state, key, move |scorer| scorer.dogs_by_city(&params)).await
}

async fn refresh(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("Reloading snapshot from {:?}", state.config.data_dir);
    let generation = state.reload().await?;
    let (_, scorer) = state.current();

    Ok(Json(serde_json::json!({
        "status": "refreshed",
        "generation": generation,
        "dogs": scorer.data().dogs().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    Engine(EngineError),
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::Engine(err) if err.is_client_error() => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": err.to_string() }),
            ),
            AppError::Engine(err) => {
                tracing::error!("{}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    serde_json::json!({ "error": err.to_string(), "data": [] }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
