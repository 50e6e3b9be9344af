//! Image analysis: the processing call behind the queue.

pub mod analyzer;
pub mod vision;

pub use analyzer::{image_url, AnalyzeRequest, Analysis, Analyzer};
pub use vision::{parse_analysis, VisionClient};
