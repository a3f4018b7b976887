mod decode;
mod detector;
mod yolo;

pub use decode::decode_image_data;
pub use detector::{COCO_CLASSES, DetectionRecord, Detector, Labels};
pub use yolo::{Candidate, Letterbox, YoloDetector, YoloParams, decode_output, non_maximum_suppression};

#[cfg(test)]
pub use detector::MockDetector;
