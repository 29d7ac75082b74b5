use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    serve, Form, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::chat::{Chat, ChatMessage};
use crate::client::SuggestionSource;
use crate::controller;
use crate::form::InterestForm;
use crate::mailto;
use crate::opportunity::{Opportunity, OpportunityCard};

const EMBEDDED_TEMPLATES: [(&str, &str); 3] = [
    ("index.html", include_str!("../templates/index.html")),
    ("chat.html", include_str!("../templates/chat.html")),
    ("suggestions.html", include_str!("../templates/suggestions.html")),
];

pub struct WebConfig {
    pub source: SuggestionSource,
    pub contact_email: String,
    /// Load templates from here (with hot reload) instead of the embedded copies.
    pub template_dir: Option<PathBuf>,
    pub static_dir: PathBuf,
}

// What the page shows besides the transcript.
#[derive(Debug, Default)]
struct PageState {
    last_input: InterestForm,
    contact_href: Option<String>,
    opportunities: Option<Vec<Opportunity>>,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    messages: &'a [ChatMessage],
    form: &'a InterestForm,
    contact_href: Option<&'a str>,
    opportunities: Option<Vec<OpportunityCard<'a>>>,
}

#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    chat: Arc<Mutex<Chat>>,
    page: Arc<Mutex<PageState>>,
    source: Arc<SuggestionSource>,
    contact_email: Arc<str>,
}

fn create_minijinja_env(template_dir: Option<PathBuf>) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        match &template_dir {
            Some(dir) => {
                env.set_loader(path_loader(dir));
                notifier.watch_path(dir, true);
            }
            None => {
                for (name, source) in EMBEDDED_TEMPLATES {
                    env.add_template(name, source)?;
                }
            }
        }
        Ok(env)
    })
}

async fn render_page(state: &AppState) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let chat = state.chat.lock().await;
    let page = state.page.lock().await;

    let view = PageView {
        title: "Conector - Social Causes",
        messages: chat.messages(),
        form: &page.last_input,
        contact_href: page.contact_href.as_deref(),
        opportunities: page
            .opportunities
            .as_ref()
            .map(|ops| ops.iter().map(Opportunity::card).collect()),
    };

    state
        .templates
        .acquire_env()
        .and_then(|env| env.get_template("index.html").and_then(|tmpl| tmpl.render(&view)))
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    render_page(&state).await
}

async fn submit_handler(State(state): State<AppState>, Form(input): Form<InterestForm>) -> impl IntoResponse {
    let outcome = controller::submit(&state.chat, &state.source, &input).await;

    // Keep what was typed; the contact button only follows a successful cycle
    {
        let mut page = state.page.lock().await;
        page.last_input = input;
        if let Some(submitted) = &outcome.submitted {
            page.contact_href = outcome
                .show_contact
                .then(|| mailto::contact_link(&state.contact_email, submitted));
        }
        if let Some(opportunities) = outcome.opportunities {
            page.opportunities = Some(opportunities);
        }
    }

    render_page(&state).await
}

async fn clear_handler(State(state): State<AppState>) -> Redirect {
    state.chat.lock().await.clear();
    *state.page.lock().await = PageState::default();
    info!("Chat transcript cleared");
    Redirect::to("/")
}

pub fn router(config: WebConfig) -> Router {
    let state = AppState {
        templates: Arc::new(create_minijinja_env(config.template_dir)),
        chat: Arc::new(Mutex::new(Chat::with_greeting())),
        page: Arc::new(Mutex::new(PageState::default())),
        source: Arc::new(config.source),
        contact_email: config.contact_email.into(),
    };

    let static_files_service = ServeDir::new(config.static_dir).not_found_service(tower::service_fn(|_| async {
        Ok::<_, std::convert::Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
    }));

    Router::new()
        .route("/", get(index_handler))
        .route("/submit", post(submit_handler))
        .route("/clear", post(clear_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16, config: WebConfig) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web UI listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
