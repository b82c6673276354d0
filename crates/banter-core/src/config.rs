//! Widget configuration types.
//!
//! `WidgetConfig` covers tunable runtime behavior (timings, limits, the
//! greeting, the inference model). `SecretConfig` holds API keys and is
//! loaded separately from `secret.json` by the infrastructure layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_greeting() -> String {
    "👋 Hey there!\nI'm Banter, your intelligent assistant. How can I help you today?".to_string()
}

fn default_typing_tick_ms() -> u64 {
    30
}

fn default_thinking_delay_ms() -> u64 {
    500
}

fn default_backup_interval_secs() -> u64 {
    30
}

fn default_restore_window_hours() -> i64 {
    24
}

fn default_max_attachment_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Runtime configuration for the chat widget.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WidgetConfig {
    /// Model name passed to the inference service.
    #[serde(default = "default_model")]
    pub model: String,
    /// Bot greeting appended to every fresh session.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Interval between reveal ticks, in milliseconds.
    #[serde(default = "default_typing_tick_ms")]
    pub typing_tick_ms: u64,
    /// Delay between the user message and the thinking indicator.
    #[serde(default = "default_thinking_delay_ms")]
    pub thinking_delay_ms: u64,
    /// Interval between durability snapshots, in seconds.
    #[serde(default = "default_backup_interval_secs")]
    pub backup_interval_secs: u64,
    /// Maximum backup age eligible for restore at startup, in hours.
    #[serde(default = "default_restore_window_hours")]
    pub restore_window_hours: i64,
    /// Upper bound on staged attachment size.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
    /// Directory for exported transcripts. Platform download/data dir if unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            greeting: default_greeting(),
            typing_tick_ms: default_typing_tick_ms(),
            thinking_delay_ms: default_thinking_delay_ms(),
            backup_interval_secs: default_backup_interval_secs(),
            restore_window_hours: default_restore_window_hours(),
            max_attachment_bytes: default_max_attachment_bytes(),
            export_dir: None,
        }
    }
}

/// Secret configuration loaded from `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    /// Gemini API credentials.
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiSecret {
    /// The API key sent with every inference request.
    pub api_key: String,
    /// Optional model override; falls back to `WidgetConfig::model`.
    #[serde(default)]
    pub model: Option<String>,
}
