//! Frontend configuration module
//!
//! Build-time settings for the web client, baked in with `option_env!`.

use shared::config::UiConfig;

/// Frontend configuration for the API location and UI limits
#[derive(Debug, Clone, PartialEq)]
pub struct FrontendConfig {
    /// Base URL of the chat API; relative paths resolve against the page origin
    pub api_base_url: String,
    /// Shared UI tuning
    pub ui: UiConfig,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        let mut ui = UiConfig::with_defaults();
        if let Some(length) = option_env!("CHATDECK_PREVIEW_LENGTH").and_then(|v| v.parse().ok()) {
            ui.preview_length = length;
        }
        if let Some(length) =
            option_env!("CHATDECK_MAX_MESSAGE_LENGTH").and_then(|v| v.parse().ok())
        {
            ui.max_message_length = length;
        }
        if ui.validate().is_err() {
            ui = UiConfig::with_defaults();
        }

        Self {
            api_base_url: option_env!("CHATDECK_API_BASE_URL")
                .unwrap_or("/api")
                .to_string(),
            ui,
        }
    }
}

impl FrontendConfig {
    /// Create a new frontend configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the API base URL
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}
