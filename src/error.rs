use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::form::Field;

#[derive(Error, Debug, PartialEq)]
#[error("Missing required fields: {}", join_wire_names(.missing))]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

fn join_wire_names(fields: &[Field]) -> String {
    fields.iter().map(|f| f.wire_name()).collect::<Vec<_>>().join(", ")
}

impl ValidationError {
    pub fn labels(&self) -> Vec<&'static str> {
        self.missing.iter().map(|f| f.label()).collect()
    }
}

/// Failures of the one round trip to the suggestion backend.
#[derive(Error, Debug)]
pub enum SuggestionError {
    /// Non-2xx response. `message` is the server's `error` field when the body parsed.
    #[error("backend returned status {status}")]
    Backend { status: u16, message: Option<String> },

    #[error("could not reach the suggestion backend: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SuggestionError {
    /// Text shown in the chat for this failure.
    pub fn chat_text(&self) -> String {
        match self {
            SuggestionError::Backend { message: Some(message), .. } => message.clone(),
            SuggestionError::Backend { status, message: None } => {
                format!("The server answered with status {}. Please try again later.", status)
            }
            SuggestionError::Transport(_) => {
                "Could not connect to the suggestion service. Check your connection and try again."
                    .to_string()
            }
        }
    }
}

/// Errors returned by the suggestion backend API, rendered as `{"error": ...}` envelopes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No data received")]
    NoData,

    #[error("Incomplete data. {0}")]
    Incomplete(ValidationError),

    #[error("Internal server error while processing your request.")]
    Generation(#[source] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NoData | ApiError::Incomplete(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            ApiError::Generation(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string(), "details": format!("{:#}", source) }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
