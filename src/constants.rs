// Defaults loaded from the environment (or a .env file picked up by dotenvy in main).

use std::env;

lazy_static::lazy_static! {
    pub static ref BACKEND_URL: String = env::var("CONECTOR_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
    pub static ref SUGGESTION_MODEL: String = env::var("CONECTOR_MODEL").unwrap_or_else(|_| "gemma3:12b".to_string());
    pub static ref CONTACT_EMAIL: String = env::var("CONECTOR_CONTACT_EMAIL").unwrap_or_else(|_| "voluntariado@conector.org".to_string());
    pub static ref MOCK_DELAY_MS: u64 = env::var("CONECTOR_MOCK_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2500);
}

/// Path of the suggestion endpoint, relative to the backend base URL.
pub const SUGGESTIONS_PATH: &str = "/api/get-suggestions";
