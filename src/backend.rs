// The suggestion API the web UI talks to: validates the profile and asks the model about it.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::{get, post},
    serve, Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::constants::SUGGESTIONS_PATH;
use crate::error::ApiError;
use crate::form::InterestForm;
use crate::llm_interaction::OllamaClient;

#[derive(Clone)]
struct BackendState {
    llm: Arc<OllamaClient>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionBody {
    processed_response: String,
}

// Strings pass through; null means absent; other scalars are used as their JSON text.
fn field_text(body: &Map<String, Value>, key: &str) -> String {
    match body.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Reads the profile out of a JSON object. An empty object counts as no data.
fn profile_from_body(body: &Value) -> Option<InterestForm> {
    let body = body.as_object().filter(|b| !b.is_empty())?;
    Some(InterestForm {
        interests: field_text(body, "interests"),
        skills: field_text(body, "skills"),
        contribution_method: field_text(body, "contributionMethod"),
        location: field_text(body, "location"),
    })
}

async fn suggestions_handler(
    State(state): State<BackendState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuggestionBody>, ApiError> {
    // Missing body, wrong content type, malformed JSON and `{}` all mean "no data"
    let profile = payload
        .map_err(|e| {
            info!(error = %e, "Rejected suggestion request without a usable JSON body");
        })
        .ok()
        .and_then(|Json(body)| profile_from_body(&body))
        .ok_or(ApiError::NoData)?;

    // Every field is required, blank ones are reported together
    let profile = profile.validate().map_err(ApiError::Incomplete)?;

    // Model failures surface as a 500 with the error chain in `details`
    let text = state.llm.interpret_profile(&profile).await.map_err(|e| {
        error!("Error generating suggestions: {:#}", e);
        ApiError::Generation(e)
    })?;

    Ok(Json(SuggestionBody {
        processed_response: text,
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "backend_ok" }))
}

async fn home_handler() -> &'static str {
    "Conector suggestion backend is up! Open the web UI to interact."
}

pub fn router(llm: OllamaClient) -> Router {
    let state = BackendState { llm: Arc::new(llm) };

    Router::new()
        .route(SUGGESTIONS_PATH, post(suggestions_handler))
        .route("/api/health", get(health_handler))
        .route("/", get(home_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_backend(port: u16, llm: OllamaClient) -> Result<()> {
    info!(model = %llm.model(), "Starting suggestion backend");
    let app = router(llm);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Suggestion backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Suggestion backend failed")?;

    Ok(())
}
