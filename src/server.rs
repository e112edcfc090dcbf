use crate::aggregation::Aggregator;
use crate::config_store::ConfigStore;
use crate::constants::DEFAULT_DAILY_WINDOW_DAYS;
use crate::error::Result;
use crate::notifier::{LiveUpdates, SubscriberRegistry, spawn_live_updates};
use crate::source::ClaudeDataSource;
use crate::types::{CoefficientConfig, DailyRecord, HourlyRecord, ModelBreakdown, Summary};
use crate::utils::DataPaths;
use axum::{
    Json, Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator<ClaudeDataSource>>,
    pub config: Arc<ConfigStore>,
    pub registry: Arc<SubscriberRegistry>,
}

impl AppState {
    pub fn new(paths: DataPaths, config: ConfigStore) -> Self {
        Self {
            aggregator: Arc::new(Aggregator::new(ClaudeDataSource::new(paths))),
            config: Arc::new(config),
            registry: Arc::new(SubscriberRegistry::new()),
        }
    }

    // Aggregations read files, so they run on the blocking pool
    async fn compute<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Aggregator<ClaudeDataSource>, &CoefficientConfig) -> T + Send + 'static,
    {
        let aggregator = Arc::clone(&self.aggregator);
        let config = self.config.current_config();
        Ok(tokio::task::spawn_blocking(move || f(&*aggregator, &config)).await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    days: Option<String>,
}

impl DailyParams {
    fn days(&self) -> u32 {
        self.days
            .as_deref()
            .and_then(|days| days.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_DAILY_WINDOW_DAYS)
    }
}

async fn summary(State(state): State<AppState>) -> Result<Json<Summary>> {
    let summary = state
        .compute(|aggregator, config| aggregator.all_time_summary(config))
        .await?;
    Ok(Json(summary))
}

async fn daily(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<Json<Vec<DailyRecord>>> {
    let days = params.days();
    let daily = state
        .compute(move |aggregator, config| aggregator.daily_breakdown(days, config))
        .await?;
    Ok(Json(daily))
}

async fn hourly(State(state): State<AppState>) -> Result<Json<Vec<HourlyRecord>>> {
    let hourly = state
        .compute(|aggregator, config| aggregator.hourly_breakdown(config))
        .await?;
    Ok(Json(hourly))
}

async fn models(State(state): State<AppState>) -> Result<Json<BTreeMap<String, ModelBreakdown>>> {
    let models = state
        .compute(|aggregator, config| aggregator.per_model(config))
        .await?;
    Ok(Json(models))
}

async fn get_config(State(state): State<AppState>) -> Json<CoefficientConfig> {
    Json(state.config.current_config())
}

async fn update_config(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<CoefficientConfig>> {
    let partial = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let store = Arc::clone(&state.config);
    let config = tokio::task::spawn_blocking(move || store.apply_overrides(&partial)).await?;
    Ok(Json(config))
}

async fn stream(State(state): State<AppState>) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.registry.subscribe();

    // Ends when the registry drops the subscriber; dropping the stream unsubscribes
    let events = futures::stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        let sse = Event::default().json_data(&event).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to encode live event");
            Event::default().comment("encoding error")
        });
        Some((Ok(sse), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/summary", get(summary))
        .route("/api/daily", get(daily))
        .route("/api/hourly", get(hourly))
        .route("/api/models", get(models))
        .route("/api/config", get(get_config).post(update_config))
        .route("/api/stream", get(stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub paths: DataPaths,
    pub config_path: PathBuf,
}

/// Serve the dashboard API until Ctrl-C
pub async fn serve(options: ServeOptions) -> Result<()> {
    let stats_file = options.paths.stats_file();
    let state = AppState::new(options.paths, ConfigStore::load(options.config_path));

    let _live_updates: Option<LiveUpdates> = match spawn_live_updates(
        &stats_file,
        Arc::clone(&state.aggregator),
        Arc::clone(&state.config),
        Arc::clone(&state.registry),
    ) {
        Ok(live) => Some(live),
        Err(e) => {
            tracing::warn!(path = %stats_file.display(), error = %e, "live updates disabled");
            None
        }
    };

    let listener = tokio::net::TcpListener::bind((options.host.as_str(), options.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::warn!(error = %e, "failed to listen for shutdown signal"),
    }
}
