//! HTTP transport for risk assessment and recommendations.
//!
//! This module provides an HTTP server that:
//! - Runs the risk pipeline on JSON profiles via POST /risk/assess
//! - Exposes the baseline curve and activity analysis on their own
//! - Forwards assessments to the recommendation service when one is configured
//! - Builds advice from previously computed results via POST /recommendations/generate/quick
//!
//! # Architecture
//!
//! ```text
//! Client ──→ POST /risk/assess ──→ RiskPipeline ──→ RiskAssessment
//!                                       │
//!        POST /recommendations/* ───────┴──→ advisor fan-out ──→ Messages API
//! ```
//!
//! Invalid input maps to 400 and failures of a consumed capability to 503.

use crate::advisor::{
    generate_for_profile, QuickProfile, RecommendationBackend, RecommendationKind,
    RecommendationReport, UserProfile,
};
use crate::core::activity::{ActivityClassifier, ActivitySummary};
use crate::core::assessment::RiskAssessment;
use crate::core::baseline::{BaselineCategory, BaselineRiskModel};
use crate::core::pipeline::{PipelineParams, RiskPipeline};
use crate::core::profile::ProfileInput;
use crate::core::projection::{FutureStepsProjector, WindowSummary};
use crate::error::RiskError;
use crate::transparency::{create_shared_log, AssessmentStats, SharedAssessmentLog};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Largest accepted batch.
pub const MAX_BATCH_SIZE: usize = 10;
/// Fewest days accepted by the activity analysis endpoint.
pub const MIN_ANALYSIS_DAYS: usize = 7;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Pipeline serving every assessment
    pub pipeline: RiskPipeline,
    /// Recommendation backend, if one is configured
    pub advisor: Option<Arc<dyn RecommendationBackend>>,
    /// Per-request bound on recommendation calls
    pub recommendation_timeout: Duration,
}

impl ServerConfig {
    pub fn new(port: u16, pipeline: RiskPipeline) -> Self {
        Self {
            port,
            cors_origins: Vec::new(),
            pipeline,
            advisor: None,
            recommendation_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_advisor(
        mut self,
        advisor: Arc<dyn RecommendationBackend>,
        timeout: Duration,
    ) -> Self {
        self.advisor = Some(advisor);
        self.recommendation_timeout = timeout;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

/// Shared server state
pub struct ServerState {
    pipeline: RiskPipeline,
    advisor: Option<Arc<dyn RecommendationBackend>>,
    recommendation_timeout: Duration,
    log: SharedAssessmentLog,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            pipeline: config.pipeline.clone(),
            advisor: config.advisor.clone(),
            recommendation_timeout: config.recommendation_timeout,
            log: create_shared_log(),
        }
    }

    fn assess(&self, input: ProfileInput) -> Result<RiskAssessment, RiskError> {
        let outcome = self.pipeline.assess_input(input);
        self.log.record(&outcome);
        outcome
    }

    fn advisor(&self) -> Result<Arc<dyn RecommendationBackend>, ApiError> {
        self.advisor.clone().ok_or_else(|| {
            ApiError::unavailable("Recommendation service is not configured (missing API key)")
        })
    }

    async fn recommend(
        &self,
        profile: UserProfile,
        kinds: &[RecommendationKind],
    ) -> Result<RecommendationReport, ApiError> {
        let advisor = self.advisor()?;
        let report =
            generate_for_profile(advisor, profile, kinds, self.recommendation_timeout).await;

        if report.all_failed() {
            let detail = report
                .recommendations
                .iter()
                .filter_map(|o| o.error.as_deref())
                .collect::<Vec<_>>()
                .join("; ");
            self.log.record_error(&RiskError::external(detail.clone()));
            return Err(ApiError::unavailable(format!(
                "Recommendation service unavailable: {detail}"
            )));
        }
        Ok(report)
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
    pub timestamp: String,
    pub request_id: String,
}

/// Handler error, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid input",
            detail: detail.into(),
        }
    }

    fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: "Service unavailable",
            detail: detail.into(),
        }
    }
}

impl From<RiskError> for ApiError {
    fn from(e: RiskError) -> Self {
        match e {
            RiskError::InvalidInput(detail) => Self::bad_request(detail),
            RiskError::ExternalCapability(detail) => Self::unavailable(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::warn!(
            status = self.status.as_u16(),
            request_id = %request_id,
            detail = %self.detail,
            "request failed"
        );
        let body = ErrorResponse {
            error: self.error.to_string(),
            detail: self.detail,
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub classifier: String,
    pub pipeline: PipelineParams,
    pub recommendations_available: bool,
}

/// GET /health
async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.pipeline.classifier_name().to_string(),
        pipeline: *state.pipeline.params(),
        recommendations_available: state.advisor.is_some(),
    })
}

/// POST /risk/assess
async fn assess(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> ApiResult<RiskAssessment> {
    let Json(input) = payload?;
    Ok(Json(state.assess(input)?))
}

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub age: i64,
    #[serde(alias = "past_28_day_steps")]
    pub steps: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub age: i64,
    pub baseline_risk: f64,
    pub step_analysis: ActivitySummary,
    pub window_summary: WindowSummary,
}

/// POST /risk/metrics
///
/// Baseline and step statistics without consulting the tier classifier.
async fn metrics(
    payload: Result<Json<MetricsRequest>, JsonRejection>,
) -> ApiResult<MetricsResponse> {
    let Json(request) = payload?;
    let baseline = BaselineRiskModel::new().baseline_risk(request.age as f64)?;
    let step_analysis = ActivityClassifier::new().classify(&request.steps)?;
    let window_summary = FutureStepsProjector::default().summary(&request.steps)?;

    Ok(Json(MetricsResponse {
        age: request.age,
        baseline_risk: baseline,
        step_analysis,
        window_summary,
    }))
}

fn default_kind() -> RecommendationKind {
    RecommendationKind::Comprehensive
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub patients: Vec<ProfileInput>,
    #[serde(default)]
    pub include_recommendations: bool,
    #[serde(default = "default_kind")]
    pub recommendation_type: RecommendationKind,
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub patient_id: usize,
    pub risk_assessment: Option<RiskAssessment>,
    pub recommendation: Option<RecommendationReport>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total_patients: usize,
    pub successful: usize,
    pub failed: usize,
    pub recommendations_generated: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
    pub summary: BatchSummary,
    pub processed_at: String,
}

/// POST /risk/assess/batch
///
/// Errors are reported per patient; only a malformed batch fails as a whole.
async fn assess_batch(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<BatchResponse> {
    let Json(request) = payload?;
    if request.patients.is_empty() || request.patients.len() > MAX_BATCH_SIZE {
        return Err(ApiError::bad_request(format!(
            "Batch must contain between 1 and {MAX_BATCH_SIZE} patients, got {}",
            request.patients.len()
        )));
    }
    if request.include_recommendations {
        state.advisor()?;
    }

    let total_patients = request.patients.len();
    let mut results = Vec::with_capacity(total_patients);
    let mut recommendations_generated = 0;

    for (i, input) in request.patients.into_iter().enumerate() {
        let mut entry = BatchEntry {
            patient_id: i + 1,
            risk_assessment: None,
            recommendation: None,
            error: None,
        };

        match state.assess(input) {
            Ok(assessment) => {
                if request.include_recommendations {
                    match state
                        .recommend(
            UserProfile::from_assessment(&assessment),
            &[request.recommendation_type],
        )
                        .await
                    {
                        Ok(report) => {
                            entry.recommendation = Some(report);
                            recommendations_generated += 1;
                        }
                        Err(e) => {
                            entry.error = Some(format!("Recommendation failed: {}", e.detail))
                        }
                    }
                }
                entry.risk_assessment = Some(assessment);
            }
            Err(e) => entry.error = Some(e.to_string()),
        }
        results.push(entry);
    }

    let successful = results.iter().filter(|r| r.risk_assessment.is_some()).count();
    Ok(Json(BatchResponse {
        summary: BatchSummary {
            total_patients,
            successful,
            failed: total_patients - successful,
            recommendations_generated,
        },
        results,
        processed_at: Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
pub struct BaselineResponse {
    pub age: i64,
    pub baseline_risk_percentage: f64,
    pub risk_category: BaselineCategory,
    pub age_group: String,
    pub data_source: String,
    pub description: String,
}

/// GET /risk/baseline/{age}
async fn baseline(path: Result<Path<i64>, PathRejection>) -> ApiResult<BaselineResponse> {
    let Path(age) = path?;
    if !(1..=120).contains(&age) {
        return Err(ApiError::bad_request(format!(
            "Age must be between 1 and 120 years, got {age}"
        )));
    }

    let info = BaselineRiskModel::new().age_group_info(age as f64)?;
    Ok(Json(BaselineResponse {
        age,
        baseline_risk_percentage: info.risk_percentage,
        risk_category: info.risk_category,
        age_group: info.age_group,
        data_source: "Australian Bureau of Statistics 2022".to_string(),
        description: format!(
            "Baseline diabetes risk for {age}-year-old: {}%",
            info.risk_percentage
        ),
    }))
}

#[derive(Debug, Serialize)]
pub struct ActivityInterpretation {
    pub activity_level: String,
    pub daily_average: String,
    pub data_quality: String,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activity_analysis: ActivitySummary,
    pub interpretation: ActivityInterpretation,
}

/// POST /risk/activity/analyze
async fn analyze_activity(
    payload: Result<Json<Vec<i64>>, JsonRejection>,
) -> ApiResult<ActivityResponse> {
    let Json(steps) = payload?;
    if steps.len() < MIN_ANALYSIS_DAYS {
        return Err(ApiError::bad_request(format!(
            "At least {MIN_ANALYSIS_DAYS} days of step data required, got {}",
            steps.len()
        )));
    }

    let summary = ActivityClassifier::new().classify(&steps)?;
    let interpretation = ActivityInterpretation {
        activity_level: summary.tier.to_string(),
        daily_average: format!("{:.0} steps/day (median)", summary.median_steps),
        data_quality: format!("{}/{} valid days", summary.valid_days, summary.total_days),
    };

    Ok(Json(ActivityResponse {
        activity_analysis: summary,
        interpretation,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub age: i64,
    pub bmi: f64,
    #[serde(alias = "past_28_day_steps")]
    pub steps: Vec<i64>,
    #[serde(default = "default_kind")]
    pub recommendation_type: RecommendationKind,
}

impl RecommendationRequest {
    fn profile(&self) -> ProfileInput {
        ProfileInput {
            age: self.age,
            bmi: self.bmi,
            steps: self.steps.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub risk_assessment: RiskAssessment,
    #[serde(flatten)]
    pub report: RecommendationReport,
}

/// POST /recommendations/generate
async fn recommend_single(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> ApiResult<RecommendationResponse> {
    let Json(request) = payload?;
    state.advisor()?;
    let assessment = state.assess(request.profile())?;
    let report = state
        .recommend(
            UserProfile::from_assessment(&assessment),
            &[request.recommendation_type],
        )
        .await?;

    Ok(Json(RecommendationResponse {
        risk_assessment: assessment,
        report,
    }))
}

/// POST /recommendations/generate/comprehensive
async fn recommend_all(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> ApiResult<RecommendationResponse> {
    let Json(input) = payload?;
    state.advisor()?;
    let assessment = state.assess(input)?;
    let report = state
        .recommend(
            UserProfile::from_assessment(&assessment),
            &RecommendationKind::ALL,
        )
        .await?;

    Ok(Json(RecommendationResponse {
        risk_assessment: assessment,
        report,
    }))
}

#[derive(Debug, Deserialize)]
pub struct QuickRecommendationRequest {
    #[serde(flatten)]
    pub results: QuickProfile,
    #[serde(default = "default_kind")]
    pub recommendation_type: RecommendationKind,
}

/// POST /recommendations/generate/quick
///
/// Advice from results the client already holds; the pipeline is not run.
async fn recommend_quick(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<QuickRecommendationRequest>, JsonRejection>,
) -> ApiResult<RecommendationReport> {
    let Json(request) = payload?;
    state.advisor()?;
    let profile = UserProfile::from_results(request.results)?;
    let report = state
        .recommend(profile, &[request.recommendation_type])
        .await?;
    Ok(Json(report))
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<AssessmentStats> {
    Json(state.log.stats())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the router without binding a socket.
pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(ServerState::new(config));

    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/risk/assess", post(assess))
        .route("/risk/metrics", post(metrics))
        .route("/risk/assess/batch", post(assess_batch))
        .route("/risk/baseline/:age", get(baseline))
        .route("/risk/activity/analyze", post(analyze_activity))
        .route("/recommendations/generate", post(recommend_single))
        .route("/recommendations/generate/comprehensive", post(recommend_all))
        .route("/recommendations/generate/quick", post(recommend_quick))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = router(&config);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("DiabetaLens server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
