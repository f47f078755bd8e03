// src/main.rs

use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use prep_backend::config::Config;
use prep_backend::routes;
use prep_backend::services::question_bank::QuestionBank;
use prep_backend::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load the question pool once; it is read-only from here on
    let (question_bank, source) = match &config.question_bank_path {
        Some(path) => (QuestionBank::load_from_file(path), path.as_str()),
        None => (QuestionBank::bundled(), "bundled"),
    };
    let question_bank = match question_bank {
        Ok(bank) => bank,
        Err(e) => {
            tracing::error!("Failed to load question bank from {}: {}", source, e);
            std::process::exit(1);
        }
    };
    tracing::info!(count = question_bank.len(), source, "Question bank loaded");

    let port = config.port;
    let sweep_every = Duration::from_secs(config.session_sweep_interval_secs);
    let idle_ttl = Duration::from_secs(config.session_idle_ttl_secs);
    let state = AppState::new(config, question_bank);

    // Evict finished or abandoned quiz sessions in the background
    state.sessions.spawn_sweeper(sweep_every, idle_ttl);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
