use crate::vision::DetectionRecord;
use serde::{Deserialize, Serialize};

/// Sentence templates for a detection summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionStyle {
    /// "I see N objects in this image: ..."
    #[default]
    Brief,
    /// "I detected N objects in the image: ..."
    Narrated,
}

impl DescriptionStyle {
    fn empty_sentence(self) -> &'static str {
        match self {
            Self::Brief => "I don't see any recognizable objects in this image.",
            Self::Narrated => "No objects were detected in this image.",
        }
    }

    fn lead(self, count: usize) -> String {
        match self {
            Self::Brief => format!("I see {count} objects in this image: "),
            Self::Narrated => format!("I detected {count} objects in the image: "),
        }
    }
}

/// Summarises detections in one sentence, keeping their order.
pub fn describe(detections: &[DetectionRecord], style: DescriptionStyle) -> String {
    if detections.is_empty() {
        return style.empty_sentence().to_string();
    }

    let items: Vec<String> = detections
        .iter()
        .map(|d| format!("{} ({}% confidence)", d.class_name, d.confidence_percent()))
        .collect();

    format!("{}{}", style.lead(detections.len()), items.join(", "))
}
