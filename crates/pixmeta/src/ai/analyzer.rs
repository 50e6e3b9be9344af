use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::store::FileId;

/// Input to one processing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub file_id: FileId,
    pub image_url: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Metadata produced for an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// The boundary to the image analysis capability.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, AnalyzeError>;
}

/// Joins the image base with a filename, tolerating a trailing slash.
pub fn image_url(base: &str, filename: &str) -> String {
    if base.is_empty() {
        return filename.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), filename)
}
