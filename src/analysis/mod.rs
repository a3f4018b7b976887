mod composer;
mod pipeline;

pub use composer::{DescriptionStyle, describe};
pub use pipeline::{Analysis, AnalysisOptions, Analyzer, BRIEF_MIN_CONFIDENCE};
