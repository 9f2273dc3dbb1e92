//! RSVP backend for the Kimberly & Anesu wedding site.
//!
//! # Endpoints
//!
//! All `POST`, JSON in and out.
//!
//! | Path | Body | Answer |
//! |---|---|---|
//! | `/verify-name` | `{name}` | `{isValid, validatedName?}`, 400 without a name, 500 if the list is unreachable |
//! | `/verify-pin` | `{pin}` | `{isValid}`, 500 when no PIN is configured |
//! | `/search-names` | `{search}` | `{suggestions}`, at most 10, empty under 2 characters |
//! | `/rsvp-submit` | [`invite::RsvpSubmission`] | `{success, duplicate}`, 400 with per-field errors, 503 if the write failed |
//! | `/send-confirmation` | `{email, name, attending}` | `{success}`, 502 with `success: false` if the provider failed |
//!
//! Only one of `/verify-name` and `/verify-pin` is mounted, matching `GATE_STRATEGY`.
//!
//!
//!
//! # Flow
//!
//! - Guest opens the RSVP screen and types their name, suggestions come from `/search-names`
//! - `/verify-name` admits them and hands back the stored spelling of their name
//! - The form is submitted to `/rsvp-submit`, which validates again and appends one record
//! - Only after that, `/send-confirmation` mails the yes/no template
//! - A failed email never undoes the record
//!
//!
//!
//! # Setup
//!
//! Seed the invitation list once.
//! ```sh
//! cargo run -p seed -- guests.txt
//! ```
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p backend
//! ```
//!
//! Drive a full RSVP against it.
//! ```sh
//! cargo run -p tester -- --name "Jane Doe" --email jane@example.com --attending yes
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};

use invite::GateStrategy;
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod gate;
pub mod memory;
pub mod notifier;
pub mod routes;
pub mod search;
pub mod state;
pub mod templates;
pub mod utils;

use config::Config;
use routes::{
    rsvp_submit_handler, search_names_handler, send_confirmation_handler, verify_name_handler,
    verify_pin_handler,
};
use state::AppState;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let gate = match state.gate.strategy() {
        GateStrategy::Names => {
            Router::new().route(GateStrategy::Names.route(), post(verify_name_handler))
        }
        GateStrategy::Pin => Router::new().route(GateStrategy::Pin.route(), post(verify_pin_handler)),
    };

    gate.route("/search-names", post(search_names_handler))
        .route("/rsvp-submit", post(rsvp_submit_handler))
        .route("/send-confirmation", post(send_confirmation_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => error!("Failed to install Ctrl+C handler: {e}"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
