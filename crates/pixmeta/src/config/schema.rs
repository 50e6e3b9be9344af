use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Queue tuning. Read as a snapshot once per poll cycle, so edits take
/// effect on the next poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSettings {
    /// Maximum number of files in flight at once.
    #[serde(default = "default_concurrent_processing")]
    pub concurrent_processing: usize,
    /// Poll cadence in seconds.
    #[serde(default = "default_queue_check_interval")]
    pub queue_check_interval: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds to wait before a failed file is queued again.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
}

fn default_concurrent_processing() -> usize {
    2
}

fn default_queue_check_interval() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    30
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            concurrent_processing: default_concurrent_processing(),
            queue_check_interval: default_queue_check_interval(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    /// OpenAI-compatible base URL, e.g. `https://api.openai.com/v1`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Processing-call timeout in seconds. A call that runs longer counts as
    /// a failed attempt.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    /// Prefix joined with a file's name to build the image URL sent to the
    /// endpoint. May be an `http(s)://` URL or a local directory.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    60
}

fn default_prompt() -> String {
    "Describe this image for a stock photo listing. Reply with a JSON object \
     containing a \"description\" string and a \"keywords\" array of up to 25 \
     single-word or short-phrase keywords."
        .to_string()
}

fn default_image_base_url() -> String {
    "http://localhost:3000/uploads".to_string()
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout: default_timeout(),
            default_prompt: default_prompt(),
            image_base_url: default_image_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Emit a notification for every file that finishes processing.
    #[serde(default = "default_true")]
    pub project_completion: bool,
    /// Emit a notification when a file fails terminally.
    #[serde(default = "default_true")]
    pub errors: bool,
    /// Webhooks that also receive processing messages.
    #[serde(default)]
    pub webhook_urls: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            project_completion: true,
            errors: true,
            webhook_urls: vec![],
        }
    }
}
