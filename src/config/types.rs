use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, BRIEF_MIN_CONFIDENCE, DescriptionStyle};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// When false, 500 responses carry a generic message instead of the error text.
    #[serde(default = "default_true")]
    pub expose_error_details: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Newline-separated class names; COCO names are used when unset.
    #[serde(default)]
    pub labels_path: Option<String>,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f32,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisProfile {
    /// Description only, confident detections only.
    #[default]
    Brief,
    /// Description, every detection, and spoken audio.
    Narrated,
}

/// Picks a profile and optionally overrides individual pipeline switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub profile: AnalysisProfile,
    #[serde(default)]
    pub min_confidence: Option<f32>,
    #[serde(default)]
    pub include_low_confidence: Option<bool>,
    #[serde(default)]
    pub include_objects: Option<bool>,
    #[serde(default)]
    pub synthesize_audio: Option<bool>,
    #[serde(default)]
    pub style: Option<DescriptionStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,
}

impl AnalysisConfig {
    pub fn options(&self) -> AnalysisOptions {
        let mut options = match self.profile {
            AnalysisProfile::Brief => AnalysisOptions::brief(),
            AnalysisProfile::Narrated => AnalysisOptions::narrated(),
        };

        if let Some(min_confidence) = self.min_confidence {
            options.min_confidence = Some(min_confidence);
        }
        match self.include_low_confidence {
            Some(true) => options.min_confidence = None,
            Some(false) => {
                options.min_confidence =
                    Some(self.min_confidence.unwrap_or(BRIEF_MIN_CONFIDENCE));
            }
            None => {}
        }
        if let Some(include_objects) = self.include_objects {
            options.include_objects = include_objects;
        }
        if let Some(synthesize_audio) = self.synthesize_audio {
            options.synthesize_audio = synthesize_audio;
        }
        if let Some(style) = self.style {
            options.style = style;
        }

        options
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            max_body_bytes: default_max_body_bytes(),
            expose_error_details: true,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            labels_path: None,
            input_size: default_input_size(),
            confidence_floor: default_confidence_floor(),
            iou_threshold: default_iou_threshold(),
            max_detections: default_max_detections(),
            intra_threads: default_intra_threads(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            language: default_language(),
            timeout_secs: default_speech_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_model_path() -> String {
    "models/yolov8n.onnx".to_string()
}

fn default_input_size() -> u32 {
    640
}

fn default_confidence_floor() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    0.7
}

fn default_max_detections() -> usize {
    300
}

fn default_intra_threads() -> usize {
    4
}

fn default_speech_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_speech_timeout_secs() -> u64 {
    30
}
