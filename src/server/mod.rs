pub mod handlers;
pub mod types;

use crate::{
    Result,
    analysis::Analyzer,
    config::{Config, ServerConfig},
    speech::{GoogleTts, SpeechSynthesizer},
    vision::YoloDetector,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Builds the analyzer described by `config`, loading the detection model.
pub fn build_analyzer(config: &Config) -> Result<Analyzer> {
    let options = config.analysis.options();

    let detector = Arc::new(YoloDetector::load(&config.detector)?);

    let speech: Option<Arc<dyn SpeechSynthesizer>> = if options.synthesize_audio {
        Some(Arc::new(GoogleTts::new(&config.speech)?))
    } else {
        None
    };

    info!(
        include_objects = options.include_objects,
        synthesize_audio = options.synthesize_audio,
        min_confidence = ?options.min_confidence,
        "Analysis pipeline configured"
    );

    Analyzer::new(detector, speech, options)
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/analyze_image", post(handlers::analyze_image))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // The model must load before the server accepts anything.
    let analyzer = build_analyzer(&config)?;

    let app_state =
        AppState::new(analyzer).with_error_details(config.server.expose_error_details);

    let app = router(app_state, &config.server);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
