//! YOLOv8 object detection through ONNX Runtime.
//!
//! The model is an Ultralytics ONNX export with a single `[1, 3, S, S]`
//! input and a `[1, 4 + C, N]` output: per candidate the box centre, size
//! and one score per class.

use super::detector::{DetectionRecord, Detector, Labels};
use crate::{Error, Result, config::DetectorConfig};
use image::{RgbImage, imageops::FilterType};
use ndarray::ArrayView2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Grey used by Ultralytics to pad letterboxed inputs.
const PAD_VALUE: u8 = 114;

#[derive(Debug, Clone)]
pub struct YoloParams {
    pub input_size: u32,
    pub confidence_floor: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl From<&DetectorConfig> for YoloParams {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            input_size: config.input_size,
            confidence_floor: config.confidence_floor,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        }
    }
}

pub struct YoloDetector {
    session: Mutex<Session>,
    labels: Labels,
    params: YoloParams,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("labels", &self.labels.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Loads the model and its label table. Fails if the model file is missing
    /// or ONNX Runtime rejects it.
    pub fn load(config: &DetectorConfig) -> Result<Self> {
        if config.input_size == 0 {
            return Err(Error::config("detector input_size must be positive"));
        }

        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(Error::config(format!(
                "detection model not found: {}",
                model_path.display()
            )));
        }

        let labels = match &config.labels_path {
            Some(path) => Labels::parse(&std::fs::read_to_string(path)?),
            None => Labels::coco(),
        };
        if labels.is_empty() {
            return Err(Error::config("label table is empty"));
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .map_err(|e| Error::detection(format!("failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::detection(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| Error::detection(format!("failed to set intra threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                Error::detection(format!(
                    "failed to load model from {}: {e}",
                    model_path.display()
                ))
            })?;

        info!(
            labels = labels.len(),
            input_size = config.input_size,
            "Detection model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            params: YoloParams::from(config),
        })
    }

    fn run_inference(&self, input: Vec<f32>) -> Result<(Vec<usize>, Vec<f32>)> {
        let size = self.params.input_size as usize;
        let tensor = Tensor::from_array((vec![1usize, 3, size, size], input.into_boxed_slice()))
            .map_err(|e| Error::detection(format!("failed to create input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::internal("detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::detection(format!("inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::detection(format!("failed to extract output tensor: {e}")))?;

        let shape = shape.iter().map(|&d| d.max(0) as usize).collect();
        Ok((shape, data.to_vec()))
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<DetectionRecord>> {
        let letterbox = Letterbox::new(image, self.params.input_size);
        let (shape, output) = self.run_inference(letterbox.to_tensor(image))?;

        let candidates = decode_output(&output, &shape, &letterbox, self.params.confidence_floor)?;
        let kept = non_maximum_suppression(
            candidates,
            self.params.iou_threshold,
            self.params.max_detections,
        );

        debug!(count = kept.len(), "Object detection completed");

        Ok(kept
            .into_iter()
            .map(|c| DetectionRecord::new(self.labels.name(c.class_id), c.confidence, c.bbox))
            .collect())
    }
}

/// Geometry of fitting an image into the square model input without
/// distorting it.
#[derive(Debug, Clone, PartialEq)]
pub struct Letterbox {
    pub size: u32,
    pub scale: f32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    pub fn new(image: &RgbImage, size: u32) -> Self {
        let (orig_width, orig_height) = image.dimensions();
        let scale = (size as f32 / orig_width as f32).min(size as f32 / orig_height as f32);

        let resized_width = ((orig_width as f32 * scale).round() as u32).clamp(1, size);
        let resized_height = ((orig_height as f32 * scale).round() as u32).clamp(1, size);

        Self {
            size,
            scale,
            resized_width,
            resized_height,
            pad_x: (size - resized_width) / 2,
            pad_y: (size - resized_height) / 2,
            orig_width,
            orig_height,
        }
    }

    /// NCHW `[1, 3, size, size]` tensor data normalised to `[0, 1]`.
    pub fn to_tensor(&self, image: &RgbImage) -> Vec<f32> {
        let resized = image::imageops::resize(
            image,
            self.resized_width,
            self.resized_height,
            FilterType::Triangle,
        );

        let size = self.size as usize;
        let plane = size * size;
        let mut data = vec![PAD_VALUE as f32 / 255.0; 3 * plane];

        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = (y + self.pad_y) as usize * size + (x + self.pad_x) as usize;
            for c in 0..3 {
                data[c * plane + offset] = pixel[c] as f32 / 255.0;
            }
        }

        data
    }

    /// Maps a model-space `(x, y)` back to original-image pixels.
    fn unproject(&self, x: f32, y: f32) -> (f32, f32) {
        let x = ((x - self.pad_x as f32) / self.scale).clamp(0.0, self.orig_width as f32);
        let y = ((y - self.pad_y as f32) / self.scale).clamp(0.0, self.orig_height as f32);
        (x, y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

/// Turns raw `[1, 4 + C, N]` output into candidates scoring at least
/// `confidence_floor`, with boxes in original-image pixels.
pub fn decode_output(
    output: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    confidence_floor: f32,
) -> Result<Vec<Candidate>> {
    let (features, boxes) = match shape {
        [1, features, boxes] if *features > 4 => (*features, *boxes),
        _ => {
            return Err(Error::detection(format!(
                "unexpected output shape {shape:?}, expected [1, 4 + classes, candidates]"
            )));
        }
    };

    let table = ArrayView2::from_shape((features, boxes), output)
        .map_err(|e| Error::detection(format!("failed to reshape output: {e}")))?;

    let mut candidates = Vec::new();
    for column in table.columns() {
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (id, score)| {
                if score > best.1 { (id, score) } else { best }
            });

        if confidence < confidence_floor {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let (x1, y1) = letterbox.unproject(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unproject(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Candidate {
            class_id,
            confidence: confidence.clamp(0.0, 1.0),
            bbox: [x1, y1, x2, y2],
        });
    }

    Ok(candidates)
}

/// Class-aware NMS. Output is ordered by descending confidence.
pub fn non_maximum_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }

        let overlaps = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
    }

    kept
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let inter_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = inter_w * inter_h;

    let area = |r: &[f32; 4]| (r[2] - r[0]).max(0.0) * (r[3] - r[1]).max(0.0);
    let union = area(a) + area(b) - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}
