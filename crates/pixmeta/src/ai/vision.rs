//! Vision client for OpenAI-compatible chat-completions endpoints.
//!
//! Works with hosted services (OpenAI, OpenRouter) and local servers
//! (Ollama, vLLM, LM Studio) that accept `image_url` content parts.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::ai::analyzer::{AnalyzeRequest, Analysis, Analyzer};
use crate::config::AiSettings;
use crate::error::AnalyzeError;

pub struct VisionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl VisionClient {
    pub fn new(settings: &AiSettings) -> Result<Self, AnalyzeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().map(SecretString::from),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Remote URLs are passed through; local paths are inlined as data URLs.
    async fn resolve_image(&self, image_url: &str) -> Result<String, AnalyzeError> {
        if is_remote(image_url) {
            return Ok(image_url.to_string());
        }

        let path = Path::new(image_url.strip_prefix("file://").unwrap_or(image_url));
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AnalyzeError::ReadImage {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!(
            "Inlining local image {} ({}, {}KB)",
            path.display(),
            mime,
            bytes.len() / 1024
        );
        Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
    }

    fn build_body(&self, request: &AnalyzeRequest, image: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt },
                    { "type": "image_url", "image_url": { "url": image } }
                ]
            }],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature
        })
    }
}

#[async_trait]
impl Analyzer for VisionClient {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, AnalyzeError> {
        let image = self.resolve_image(&request.image_url).await?;
        let body = self.build_body(&request, &image);
        let url = format!("{}/chat/completions", self.endpoint);

        info!(
            file_id = request.file_id,
            model = %self.model,
            max_tokens = request.max_tokens,
            "Vision request"
        );
        let started = Instant::now();

        let mut req = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key.expose_secret());
        }

        let response = req.send().await?;
        let status = response.status();
        debug!(
            file_id = request.file_id,
            "Vision response {} after {:.2}s",
            status,
            started.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Vision endpoint error: status={}, body={}", status, body);
            return Err(AnalyzeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: serde_json::Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AnalyzeError::ResponseParse("response has no message content".into()))?;

        parse_analysis(content)
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:")
}

/// Extracts the `{description, keywords}` object from a model reply,
/// tolerating code fences and prose around it.
pub fn parse_analysis(content: &str) -> Result<Analysis, AnalyzeError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json_str = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(AnalyzeError::ResponseParse(format!(
                "no JSON object in reply: {}",
                content.chars().take(80).collect::<String>()
            )))
        }
    };

    let mut analysis: Analysis =
        serde_json::from_str(json_str).map_err(|e| AnalyzeError::ResponseParse(e.to_string()))?;

    if analysis.description.trim().is_empty() {
        return Err(AnalyzeError::ResponseParse(
            "reply has an empty description".to_string(),
        ));
    }

    analysis.description = analysis.description.trim().to_string();
    analysis.keywords = normalize_keywords(analysis.keywords);
    Ok(analysis)
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping
/// the first spelling.
fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}
