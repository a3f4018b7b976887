use crate::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One detected object, in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]`
    #[serde(rename = "bbox")]
    pub bounding_box: [f32; 4],
}

impl DetectionRecord {
    pub fn new(class_name: impl Into<String>, confidence: f32, bounding_box: [f32; 4]) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bounding_box,
        }
    }

    /// Confidence as a whole percentage, halves rounded to even.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round_ties_even() as u32
    }
}

/// A loaded object-detection model.
///
/// `detect` is blocking and CPU/GPU bound; callers on the async runtime
/// should run it through `spawn_blocking`.
#[cfg_attr(test, mockall::automock)]
pub trait Detector: Send + Sync {
    /// Detections in the model's own order.
    fn detect(&self, image: &RgbImage) -> Result<Vec<DetectionRecord>>;
}

/// Class id to name lookup.
#[derive(Debug, Clone)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn coco() -> Self {
        Self(COCO_CLASSES.iter().map(|name| name.to_string()).collect())
    }

    /// One name per line; blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn name(&self, class_id: usize) -> String {
        self.0
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{class_id}"))
    }
}

/// COCO class names (80 classes).
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];
