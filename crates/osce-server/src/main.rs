//! osce-server - OSCE Voice backend server
//!
//! REST API sequencing speech-to-text, chat completion, and text-to-speech
//! around in-memory interview sessions.

use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use osce_core::case::CaseDatabase;
use osce_server::upstream::OpenAiClient;
use osce_server::{config::Config, routes, services::sweeper, state::AppState};

/// Cases seeded into an empty database so a fresh install can run an interview.
const DEMO_CASES: &[(&str, &str, &str)] = &[
    (
        "chest-pain-01",
        "Acute chest pain",
        "You are Arthur Pembroke, a 54-year-old delivery driver and long-term \
         smoker. For the last two hours you have had crushing central chest \
         pain spreading to your left arm, with sweating and nausea. You are \
         frightened but keep minimizing the symptoms. Your father died of a \
         heart attack at 58. You take no regular medication.",
    ),
    (
        "abdo-pain-02",
        "Right-sided abdominal pain",
        "You are Priya Shah, a 29-year-old teacher. Since yesterday evening a \
         dull ache around your navel has sharpened and moved to the lower \
         right of your belly. Walking makes it worse and you have no appetite. \
         You are worried about missing work, not about the pain.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("osce_server=info".parse()?))
        .init();

    info!("osce-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Open the case database, seeding demo cases on first run
    let cases = CaseDatabase::open(&config.database_path)?;
    if cases.count()? == 0 {
        for (reference, title, description) in DEMO_CASES {
            cases.upsert(reference, title, description)?;
        }
        info!(
            seeded = DEMO_CASES.len(),
            "seeded demo cases into empty database"
        );
    }
    for case in cases.list()? {
        debug!(reference = %case.reference, title = %case.title, "case available");
    }

    if config.upstream.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; speech and chat calls will fail");
    }

    // One OpenAI-compatible client serves all three upstream contracts
    let client = Arc::new(OpenAiClient::new(&config.upstream)?);
    let state = AppState::new(config, cases, client.clone(), client.clone(), client);

    let sweeper = sweeper::spawn(
        Arc::clone(&state.sessions),
        state.config.sweep_interval,
        state.config.idle_timeout,
    );

    let app = routes::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(state.config.bind_addr()).await?;
    info!(addr = %state.config.bind_addr(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down...");
    sweeper.abort();

    Ok(())
}
