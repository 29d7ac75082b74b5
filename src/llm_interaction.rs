use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::form::InterestForm;

// Structures matching Ollama's /api/generate endpoint
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool, // We want the full response, not a stream
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String, // The generated text
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

pub fn build_profile_prompt(profile: &InterestForm) -> String {
    format!(
        "Analyze the profile of a person interested in volunteering and social engagement:\n\
         - Interests / causes that motivate them: {}\n\
         - Specific skills they would like to offer: {}\n\
         - Kind of contribution they would like to make: {}\n\
         - Location: {}\n\n\
         Based on this information, interpret and categorize the person's interests.\n\
         Suggest what kind of opportunities or organizations would best match this profile.\n\
         Answer in one or two paragraphs, friendly and encouraging.\n\
         For now focus only on interpreting the profile and giving a general direction.",
        profile.interests, profile.skills, profile.contribution_method, profile.location
    )
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, profile), fields(model = %self.model))]
    pub async fn interpret_profile(&self, profile: &InterestForm) -> Result<String> {
        let ollama_api_url = format!("{}/api/generate", self.base_url);
        let prompt = build_profile_prompt(profile);
        debug!(?prompt, "Constructed Ollama prompt for profile interpretation");

        let request_payload = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&ollama_api_url)
            .json(&request_payload)
            .send()
            .await
            .context(format!("Failed to send request to Ollama API at {}", ollama_api_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %error_body, "Ollama API request failed");
            return Err(anyhow::anyhow!(
                "Ollama API request failed with status {}: {}",
                status, error_body
            ));
        }

        let ollama_response = response
            .json::<OllamaResponse>()
            .await
            .context("Failed to parse JSON response from Ollama API")?;

        debug!(response = ?ollama_response.response, "Received Ollama response");

        Ok(ollama_response.response.trim().to_string())
    }
}
