use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::analysis::{analyze, AnalysisReport};
use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::{AnalysisSettings, MAX_REQUEST_BYTES};
use crate::error::{AppError, Result};
use crate::narrative::{build_prompt, NarrativeMode};
use crate::types::{deserialize_timestamp, Transaction, Window};

#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<AnalysisSettings>,
    pub narrative_mode: NarrativeMode,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl ApiState {
    pub fn new(settings: AnalysisSettings, narrative_mode: NarrativeMode) -> Self {
        Self {
            settings: Arc::new(settings),
            narrative_mode,
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/analyze", post(post_analyze))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub transactions: Vec<Transaction>,
    /// Defaults to whole days spanning every transaction.
    #[serde(default)]
    pub window: Option<WindowSpec>,
    /// Overrides the configured home country for this request.
    #[serde(default)]
    pub home: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum WindowSpec {
    Range {
        #[serde(deserialize_with = "deserialize_timestamp")]
        start: NaiveDateTime,
        #[serde(deserialize_with = "deserialize_timestamp")]
        end: NaiveDateTime,
    },
    Dates {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

impl WindowSpec {
    fn resolve(&self) -> Result<Window> {
        match *self {
            WindowSpec::Range { start, end } => Window::new(start, end),
            WindowSpec::Dates {
                start_date,
                end_date,
            } => Window::from_dates(start_date, end_date),
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub analyses_served: u64,
    pub analyses_failed: u64,
    pub last_analysis_at_ns: Option<u64>,
    pub home_country: String,
    pub narrative_mode: NarrativeMode,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn post_analyze(
    State(state): State<ApiState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Value>> {
    let started = Instant::now();
    let result = run_analysis(&state, req).await;
    match &result {
        Ok(_) => {
            state.latency.record(started.elapsed());
            state.health.record_served(now_ns());
        }
        Err(e) => {
            state.health.record_failed();
            warn!(event = "ANALYSIS_FAILED", error = %e, "ANALYSIS FAILED | {e}");
        }
    }
    result.map(Json)
}

async fn run_analysis(state: &ApiState, req: AnalyzeRequest) -> Result<Value> {
    let AnalyzeRequest {
        transactions,
        window,
        home,
    } = req;

    let window = match window {
        Some(spec) => spec.resolve()?,
        None => Window::spanning(&transactions).ok_or(AppError::MissingWindow)?,
    };

    let mut settings = state.settings.as_ref().clone();
    if let Some(home) = home.map(|h| h.trim().to_uppercase()).filter(|h| !h.is_empty()) {
        settings.home_country = home;
    }

    let rows = transactions.len();
    let report: AnalysisReport =
        tokio::task::spawn_blocking(move || analyze(&transactions, window, &settings)).await?;

    log_analysis(rows, &report);

    let mut body = json!({ "report": report.to_payload()? });
    if state.narrative_mode == NarrativeMode::PromptOnly {
        body["narrative_prompt"] = Value::String(build_prompt(&report.metrics, &report.spotlights)?);
    }
    Ok(body)
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let last = state.health.last_analysis_at_ns();
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.health.uptime_secs(),
        analyses_served: state.health.analyses_served(),
        analyses_failed: state.health.analyses_failed(),
        last_analysis_at_ns: (last > 0).then_some(last),
        home_country: state.settings.home_country.clone(),
        narrative_mode: state.narrative_mode,
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let (p50_us, p95_us, p99_us) = state.latency.percentiles();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_us,
        p95_us,
        p99_us,
    })
}

fn log_analysis(rows: usize, report: &AnalysisReport) {
    let flag = |f: bool| if f { "FLAG" } else { "ok" };
    info!(
        event = "ANALYSIS",
        rows,
        selected = report.transaction_count,
        window_start = %report.window.start,
        window_end = %report.window.end,
        burst_score = report.spotlights.burst.score,
        imbalance_score = report.spotlights.imbalance.score,
        "ANALYSIS | rows: {} | selected: {} | window: {} .. {} | burst: {} ({:.2}) | imbalance: {} ({:.2})",
        rows,
        report.transaction_count,
        report.window.start,
        report.window.end,
        flag(report.spotlights.burst.flag),
        report.spotlights.burst.score,
        flag(report.spotlights.imbalance.flag),
        report.spotlights.imbalance.score,
    );
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
