use super::mocks::{StubDetector, StubSpeech};
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use voxel::{
    analysis::{AnalysisOptions, Analyzer},
    config::ServerConfig,
    server::{self, handlers::AppState},
    speech::SpeechSynthesizer,
    vision::DetectionRecord,
};

/// A small solid-colour PNG, base64 encoded without a prefix
pub fn png_base64(width: u32, height: u32) -> String {
    let image = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test PNG");
    general_purpose::STANDARD.encode(bytes)
}

/// The same image as a browser would send it
pub fn png_data_uri(width: u32, height: u32) -> String {
    format!("data:image/png;base64,{}", png_base64(width, height))
}

pub fn cat(confidence: f32) -> DetectionRecord {
    DetectionRecord::new("cat", confidence, [10.0, 20.0, 110.0, 220.0])
}

/// Build the full router around the given collaborators
pub fn create_test_app(
    detector: Arc<StubDetector>,
    speech: Option<Arc<StubSpeech>>,
    options: AnalysisOptions,
) -> Router {
    create_test_app_with(detector, speech, options, ServerConfig::default())
}

pub fn create_test_app_with(
    detector: Arc<StubDetector>,
    speech: Option<Arc<StubSpeech>>,
    options: AnalysisOptions,
    server_config: ServerConfig,
) -> Router {
    let speech = speech.map(|s| s as Arc<dyn SpeechSynthesizer>);
    let analyzer = Analyzer::new(detector, speech, options).expect("Failed to build analyzer");
    let state = AppState::new(analyzer).with_error_details(server_config.expose_error_details);
    server::router(state, &server_config)
}

pub fn analyze_request(image_data: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze_image")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "image_data": image_data }).to_string(),
        ))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
