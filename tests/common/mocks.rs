use async_trait::async_trait;
use image::RgbImage;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use voxel::{
    Error, Result,
    speech::SpeechSynthesizer,
    vision::{DetectionRecord, Detector},
};

/// Detector returning a fixed list and recording every call
#[derive(Debug, Default)]
pub struct StubDetector {
    pub detections: Vec<DetectionRecord>,
    pub calls: AtomicUsize,
    pub seen_sizes: Mutex<Vec<(u32, u32)>>,
    pub error: Option<String>,
}

impl StubDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detections(mut self, detections: Vec<DetectionRecord>) -> Self {
        self.detections = detections;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for StubDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<DetectionRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_sizes.lock().unwrap().push(image.dimensions());

        if let Some(ref error) = self.error {
            return Err(Error::detection(error.clone()));
        }

        Ok(self.detections.clone())
    }
}

/// Speech engine returning fixed bytes, or failing
#[derive(Debug, Default)]
pub struct StubSpeech {
    pub audio: Vec<u8>,
    pub texts: Mutex<Vec<String>>,
    pub error: Option<String>,
}

impl StubSpeech {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.texts.lock().unwrap().push(text.to_string());

        if let Some(ref error) = self.error {
            return Err(Error::speech(error.clone()));
        }

        Ok(self.audio.clone())
    }
}
