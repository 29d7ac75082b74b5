use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{error, info};

use conector::chat::Chat;
use conector::client::{BackendClient, MockSource, SuggestionSource};
use conector::constants;
use conector::controller;
use conector::form::InterestForm;
use conector::llm_interaction::OllamaClient;
use conector::{backend, mailto, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    #[arg(long, env = "CONECTOR_BACKEND_URL", help = "Base URL of the suggestion backend.")]
    backend_url: Option<String>,
    #[arg(long, help = "Serve the built-in opportunity list instead of calling the backend.")]
    mock: bool,
    #[arg(long, help = "Simulated latency of the mock source, in milliseconds.")]
    mock_delay_ms: Option<u64>,
}

impl SourceArgs {
    fn into_source(self) -> SuggestionSource {
        if self.mock {
            let delay = self.mock_delay_ms.unwrap_or(*constants::MOCK_DELAY_MS);
            SuggestionSource::Mock(MockSource::new(Duration::from_millis(delay)))
        } else {
            let url = self.backend_url.unwrap_or_else(|| constants::BACKEND_URL.clone());
            SuggestionSource::Backend(BackendClient::new(url))
        }
    }
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web UI (interest form and chat).
    Serve {
        #[arg(long, default_value_t = 8080, help = "Port for the web server.")]
        port: u16,
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, help = "Load templates from this directory and reload them on change.")]
        template_dir: Option<PathBuf>,
        #[arg(long, default_value = "static", help = "Directory served under /static.")]
        static_dir: PathBuf,
    },
    /// Start the suggestion backend API.
    Backend {
        #[arg(long, default_value_t = 5000, help = "Port for the backend API.")]
        port: u16,
        #[arg(long, env = "OLLAMA_URL", help = "Base URL of the Ollama server.")]
        ollama_url: Option<String>,
        #[arg(long, env = "CONECTOR_MODEL", help = "Model used to interpret profiles.")]
        model: Option<String>,
    },
    /// Submit one profile from the terminal and print the conversation.
    Ask {
        #[arg(long)]
        interests: String,
        #[arg(long)]
        skills: String,
        #[arg(long)]
        contribution: String,
        #[arg(long)]
        location: String,
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (backend URL, model, contact address)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,conector=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("Conector starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Serve {
            port,
            source,
            template_dir,
            static_dir,
        } => {
            let config = web_server::WebConfig {
                source: source.into_source(),
                contact_email: constants::CONTACT_EMAIL.clone(),
                template_dir,
                static_dir,
            };

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, config).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            wait_for_shutdown(&mut web_server_handle, "Web server").await;
        }
        Commands::Backend {
            port,
            ollama_url,
            model,
        } => {
            let llm = OllamaClient::new(
                ollama_url.unwrap_or_else(|| constants::OLLAMA_URL.clone()),
                model.unwrap_or_else(|| constants::SUGGESTION_MODEL.clone()),
            );

            let mut backend_handle = tokio::spawn(async move {
                if let Err(e) = backend::start_backend(port, llm).await {
                    error!("Suggestion backend failed: {:?}", e);
                }
            });

            wait_for_shutdown(&mut backend_handle, "Suggestion backend").await;
        }
        Commands::Ask {
            interests,
            skills,
            contribution,
            location,
            source,
        } => {
            let form = InterestForm {
                interests,
                skills,
                contribution_method: contribution,
                location,
            };
            let chat = Mutex::new(Chat::new());
            let outcome = controller::submit(&chat, &source.into_source(), &form).await;

            println!("{}", chat.lock().await.to_plain_text());
            for op in outcome.opportunities.iter().flatten() {
                println!("\n* {} ({})\n  {}\n  Contact: {}", op.name, op.cause, op.description, op.contact);
            }
            if let (true, Some(submitted)) = (outcome.show_contact, &outcome.submitted) {
                println!("\nContact: {}", mailto::contact_link(&constants::CONTACT_EMAIL, submitted));
            }
            if outcome.submitted.is_none() {
                anyhow::bail!("Submission rejected");
            }
        }
    }

    Ok(())
}

async fn wait_for_shutdown(handle: &mut tokio::task::JoinHandle<()>, name: &str) {
    let ctrl_c = tokio::signal::ctrl_c();
    // Pin the ctrl_c future to the stack so its address is stable
    tokio::pin!(ctrl_c);

    tokio::select! {
        res = &mut ctrl_c => {
            if let Err(e) = res.context("Failed to listen for Ctrl-C") {
                error!("{:?}", e);
            }
            info!("Ctrl-C received, initiating shutdown...");
        }
        res = &mut *handle => {
            match res {
                Ok(_) => info!("{} task completed unexpectedly.", name),
                Err(e) if e.is_panic() => error!("{} task panicked: {:?}", name, e),
                Err(e) => error!("{} task failed: {:?}", name, e),
            }
        }
    }

    if !handle.is_finished() {
        info!("Aborting {} task...", name);
        handle.abort();
    }
    info!("Shutdown complete.");
}
