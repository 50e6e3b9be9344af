use std::path::Path;

use crate::config::schema::Settings;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/settings-v1.json");

/// Loads settings from a `.json`, `.yaml` or `.yml` file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        load_settings_from_yaml(&content)
    } else {
        load_settings_from_str(&content)
    }
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;
    settings_from_value(json_value)
}

pub fn load_settings_from_yaml(content: &str) -> Result<Settings, ConfigError> {
    let json_value: serde_json::Value = serde_yaml::from_str(content)?;
    settings_from_value(json_value)
}

fn settings_from_value(json_value: serde_json::Value) -> Result<Settings, ConfigError> {
    validate_schema(&json_value)?;

    let settings: Settings = serde_json::from_value(json_value)?;

    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express, also applied to settings
/// replaced at runtime.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.queue.concurrent_processing == 0 {
        return Err(ConfigError::Validation {
            message: "queue.concurrentProcessing must be at least 1".to_string(),
        });
    }

    if settings.queue.queue_check_interval == 0 {
        return Err(ConfigError::Validation {
            message: "queue.queueCheckInterval must be at least 1 second".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&settings.ai.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "ai.temperature must be between 0 and 2, got {}",
                settings.ai.temperature
            ),
        });
    }

    if let Err(e) = reqwest::Url::parse(&settings.ai.endpoint) {
        return Err(ConfigError::Validation {
            message: format!("ai.endpoint '{}' is not a URL: {}", settings.ai.endpoint, e),
        });
    }

    for url in &settings.notifications.webhook_urls {
        if let Err(e) = reqwest::Url::parse(url) {
            return Err(ConfigError::Validation {
                message: format!("Webhook '{}' is not a URL: {}", url, e),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_settings() {
        let settings_json = r#"
        {
            "queue": {
                "concurrentProcessing": 3,
                "queueCheckInterval": 10,
                "maxRetries": 2,
                "retryDelay": 5
            },
            "ai": {
                "endpoint": "http://127.0.0.1:11434/v1",
                "model": "llava",
                "temperature": 0.2
            }
        }
        "#;

        let settings = load_settings_from_str(settings_json).unwrap();
        assert_eq!(settings.queue.concurrent_processing, 3);
        assert_eq!(settings.queue.max_retries, 2);
        assert_eq!(settings.ai.model, "llava");
        assert_eq!(settings.ai.timeout, 60);
    }

    #[test]
    fn test_schema_rejects_zero_concurrency() {
        let result = load_settings_from_str(r#"{ "queue": { "concurrentProcessing": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_schema_rejects_unknown_field() {
        let result = load_settings_from_str(r#"{ "queue": { "priority": 1 } }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_invalid_endpoint_url() {
        let result = load_settings_from_str(r#"{ "ai": { "endpoint": "not a url" } }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_webhook_url() {
        let result =
            load_settings_from_str(r#"{ "notifications": { "webhookUrls": ["::nope"] } }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = load_settings_from_str("{ queue: ");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "queue:\n  concurrentProcessing: 5\n  maxRetries: 0").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.queue.concurrent_processing, 5);
        assert_eq!(settings.queue.max_retries, 0);
    }

    #[test]
    fn test_missing_file() {
        let result = load_settings("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
