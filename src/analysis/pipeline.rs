use super::composer::{DescriptionStyle, describe};
use crate::{
    Error, Result,
    speech::SpeechSynthesizer,
    vision::{DetectionRecord, Detector, decode_image_data},
};
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;
use tracing::{debug, info};

/// Description threshold of the brief profile. Detections at or below it are
/// left out.
pub const BRIEF_MIN_CONFIDENCE: f32 = 0.5;

/// Switches that select what an analysis returns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Keep only detections strictly above this confidence. `None` keeps all.
    pub min_confidence: Option<f32>,
    /// Return the detection list alongside the description.
    pub include_objects: bool,
    /// Speak the description and return the audio.
    pub synthesize_audio: bool,
    pub style: DescriptionStyle,
}

impl AnalysisOptions {
    /// Description of confident detections only.
    pub fn brief() -> Self {
        Self {
            min_confidence: Some(BRIEF_MIN_CONFIDENCE),
            include_objects: false,
            synthesize_audio: false,
            style: DescriptionStyle::Brief,
        }
    }

    /// Every detection, listed and spoken.
    pub fn narrated() -> Self {
        Self {
            min_confidence: None,
            include_objects: true,
            synthesize_audio: true,
            style: DescriptionStyle::Narrated,
        }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::brief()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub description: String,
    pub objects: Option<Vec<DetectionRecord>>,
    pub audio_base64: Option<String>,
}

/// Runs decode, detect, describe and speak for one image.
///
/// Built once at startup and shared by every request.
pub struct Analyzer {
    detector: Arc<dyn Detector>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    options: AnalysisOptions,
}

impl Analyzer {
    /// Fails if the options ask for audio but no synthesizer is given.
    pub fn new(
        detector: Arc<dyn Detector>,
        speech: Option<Arc<dyn SpeechSynthesizer>>,
        options: AnalysisOptions,
    ) -> Result<Self> {
        if options.synthesize_audio && speech.is_none() {
            return Err(Error::config(
                "audio synthesis is enabled but no speech synthesizer is configured",
            ));
        }

        Ok(Self {
            detector,
            speech,
            options,
        })
    }

    pub async fn analyze(&self, image_data: String) -> Result<Analysis> {
        let detector = Arc::clone(&self.detector);
        let detections = tokio::task::spawn_blocking(move || {
            let image = decode_image_data(&image_data)?;
            debug!(
                width = image.width(),
                height = image.height(),
                "Running object detection"
            );
            detector.detect(&image)
        })
        .await
        .map_err(|e| Error::internal(format!("detection task failed: {e}")))??;

        let detections = self.select(detections);
        let description = describe(&detections, self.options.style);
        info!("Analysis complete: {}", description);

        let audio_base64 = match &self.speech {
            Some(speech) if self.options.synthesize_audio => {
                let audio = speech.synthesize(&description).await?;
                Some(general_purpose::STANDARD.encode(audio))
            }
            _ => None,
        };

        Ok(Analysis {
            description,
            objects: self.options.include_objects.then_some(detections),
            audio_base64,
        })
    }

    fn select(&self, detections: Vec<DetectionRecord>) -> Vec<DetectionRecord> {
        match self.options.min_confidence {
            Some(threshold) => detections
                .into_iter()
                .filter(|d| d.confidence > threshold)
                .collect(),
            None => detections,
        }
    }
}
