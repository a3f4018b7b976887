use super::types::{AnalysisRequest, AnalysisResponse, ErrorResponse, HealthResponse};
use crate::{Error, analysis::Analyzer};
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Return raw error text in 500 bodies.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            expose_error_details: true,
        }
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }
}

pub async fn analyze_image(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4();
    info!(%request_id, "Received image analysis request");

    match state.analyzer.analyze(request.image_data).await {
        Ok(analysis) => {
            info!(%request_id, "Image analysis succeeded");
            Ok(Json(analysis.into()))
        }
        Err(e) => Err(error_response(&e, request_id, state.expose_error_details)),
    }
}

pub async fn health(State(_state): State<AppState>) -> Json<HealthResponse> {
    // The analyzer, and with it the model, exists before the router does.
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: true,
    })
}

fn error_response(
    err: &Error,
    request_id: Uuid,
    expose_details: bool,
) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_client_error() {
        warn!(%request_id, "Rejected image analysis request: {}", err);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: err.to_string(),
            }),
        );
    }

    error!(%request_id, "Error analyzing image: {}", err);
    let detail = if expose_details {
        err.to_string()
    } else {
        GENERIC_SERVER_ERROR.to_string()
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail }))
}
