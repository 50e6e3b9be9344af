use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixmetaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Search history error: {0}")]
    SearchHistory(#[from] SearchHistoryError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse settings YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Failures of the processing call. Every variant is routed through the
/// queue's retry/error path; none of them is fatal to the poll loop.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Request to vision endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Vision endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse analysis response: {0}")]
    ResponseParse(String),

    #[error("Failed to read image '{path}': {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Processing timed out after {0}s")]
    Timeout(u64),

    #[error("Analysis failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook '{url}' returned {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug)]
pub enum SearchHistoryError {
    #[error("Failed to read search history '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write search history '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed search history: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PixmetaError>;
