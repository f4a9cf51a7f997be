use reqwest::{Client, Error};
use shared::models::{ConversationSummary, OutgoingMessage};
use std::cell::OnceCell;
use uuid::Uuid;

use crate::config::FrontendConfig;

thread_local! {
    static SHARED_CLIENT: OnceCell<ChatdeckClient> = const { OnceCell::new() };
}

/// Thin HTTP client whose methods serve as operations for `use_async_call`.
#[derive(Clone, Debug)]
pub struct ChatdeckClient {
    base_url: String,
    client: Client,
}

impl ChatdeckClient {
    /// Create a new API client with the provided base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Client bound to the configured API base, resolved against the page origin.
    pub fn shared() -> Self {
        SHARED_CLIENT.with(|cell| {
            cell.get_or_init(|| {
                let config = FrontendConfig::new();
                Self::new(&absolute_base(config.api_base_url(), page_origin().as_deref()))
            })
            .clone()
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// List the conversations shown in the sidebar.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, Error> {
        self.client
            .get(self.api_url("conversations"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Send a composed message; the server answers with the refreshed summary.
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        message: &OutgoingMessage,
    ) -> Result<ConversationSummary, Error> {
        self.client
            .post(self.api_url(&format!("conversations/{conversation_id}/messages")))
            .json(message)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Clear the unread counter of a conversation on the server.
    pub async fn mark_read(&self, conversation_id: Uuid) -> Result<(), Error> {
        self.client
            .post(self.api_url(&format!("conversations/{conversation_id}/read")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Relative bases such as `/api` are resolved against the page origin;
/// reqwest only accepts absolute URLs.
fn absolute_base(base: &str, origin: Option<&str>) -> String {
    match origin {
        Some(origin) if base.starts_with('/') => {
            format!("{}{}", origin.trim_end_matches('/'), base)
        }
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_without_double_slashes() {
        let client = ChatdeckClient::new("https://chat.example/api/");
        assert_eq!(
            client.api_url("/conversations"),
            "https://chat.example/api/conversations"
        );
    }

    #[test]
    fn relative_base_is_resolved_against_origin() {
        assert_eq!(
            absolute_base("/api", Some("https://chat.example/")),
            "https://chat.example/api"
        );
        assert_eq!(
            absolute_base("https://other.example/api", Some("https://chat.example")),
            "https://other.example/api"
        );
        assert_eq!(absolute_base("/api", None), "/api");
    }
}
