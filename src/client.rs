use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::SUGGESTIONS_PATH;
use crate::error::SuggestionError;
use crate::form::InterestForm;
use crate::opportunity::{mock_opportunities, Opportunity};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SuggestionResponse {
    processed_response: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: Option<String>,
}

/// What a request cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Backend text; `None` when the response carried no usable payload.
    Text(Option<String>),
    Opportunities(Vec<Opportunity>),
}

/// Talks to `POST {base_url}/api/get-suggestions`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, SUGGESTIONS_PATH)
    }

    #[instrument(skip(self, form), fields(endpoint = %self.endpoint()))]
    pub async fn get_suggestions(&self, form: &InterestForm) -> Result<Option<String>, SuggestionError> {
        // One round trip; transport errors (refused, DNS, reset) never get a status
        let response = self
            .http
            .post(self.endpoint())
            .json(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Suggestion request failed before a response arrived");
                SuggestionError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the server's own `error` text, fall back to the bare status code
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .filter(|m| !m.trim().is_empty());
            warn!(%status, ?message, "Suggestion backend returned an error");
            return Err(SuggestionError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        // A 2xx without a non-blank `processedResponse` is "no usable payload", not an error
        let body = response.text().await?;
        let text = match serde_json::from_str::<SuggestionResponse>(&body) {
            Ok(parsed) => parsed.processed_response.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Suggestion backend sent a body that is not the expected envelope");
                None
            }
        };

        debug!(has_payload = text.is_some(), "Received suggestion response");
        Ok(text)
    }
}

/// Stands in for the backend: waits, then returns the fixed opportunity list.
#[derive(Debug, Clone)]
pub struct MockSource {
    pub delay: Duration,
    pub opportunities: Vec<Opportunity>,
}

impl MockSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            opportunities: mock_opportunities(),
        }
    }

    pub async fn get_opportunities(&self) -> Vec<Opportunity> {
        // Simulate network latency
        tokio::time::sleep(self.delay).await;
        self.opportunities.clone()
    }
}

#[derive(Debug, Clone)]
pub enum SuggestionSource {
    Backend(BackendClient),
    Mock(MockSource),
}

impl SuggestionSource {
    pub async fn fetch(&self, form: &InterestForm) -> Result<Suggestions, SuggestionError> {
        match self {
            SuggestionSource::Backend(client) => client.get_suggestions(form).await.map(Suggestions::Text),
            SuggestionSource::Mock(mock) => {
                info!(delay_ms = mock.delay.as_millis() as u64, "Serving mock opportunities");
                Ok(Suggestions::Opportunities(mock.get_opportunities().await))
            }
        }
    }
}
