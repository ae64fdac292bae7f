//! Mystery Box · weekly riddle game server
//!
//! - One riddle opens per week from the configured start date
//! - Correct answers move a visitor forward, never past the open week
//! - Axum HTTP server rendering HTML pages (HTMX fragments when asked)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   RIDDLES_PATH          : riddles JSON document (default "./riddles.json")
//!   ASSETS_DIR            : static files served under /assets (default "./assets")
//!   REQUEST_TIMEOUT_SECS  : per-request deadline (default 10)
//!   SHUTDOWN_TIMEOUT_SECS : drain period after a stop signal (default 10)
//!   PREVIEW_NOW           : RFC 3339 timestamp; freezes the clock to preview the game
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod schedule;
mod progression;
mod state;
mod protocol;
mod logic;
mod views;
mod routes;

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{info, warn};

use crate::config::{load_riddle_set, ServerConfig};
use crate::routes::build_router;
use crate::state::{AppState, Clock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = ServerConfig::from_env();

  // The game is meaningless without its riddles: fail before binding.
  let riddles = load_riddle_set(&cfg.riddles_path)?;
  let mut state = AppState::new(riddles);
  if let Some(at) = cfg.preview_now {
    warn!(target: "mysterybox", now = %at, "Clock frozen for preview");
    state = state.with_clock(Clock::Fixed(at));
  }
  let state = Arc::new(state);

  let app = build_router(state, &cfg);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "mysterybox", %addr, "HTTP server listening");

  let stopping = Arc::new(Notify::new());
  let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(stopping.clone()));

  tokio::select! {
    res = server.into_future() => res?,
    _ = drain_deadline(stopping, cfg.shutdown_timeout) => {
      warn!(target: "mysterybox", timeout = ?cfg.shutdown_timeout, "Drain period elapsed; closing remaining connections");
    }
  }
  info!(target: "mysterybox", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and wakes the drain timer.
async fn shutdown_signal(stopping: Arc<Notify>) {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!(target: "mysterybox", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        warn!(target: "mysterybox", error = %e, "Failed to listen for SIGTERM");
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
  info!(target: "mysterybox", "Shutdown requested; draining connections");
  stopping.notify_one();
}

/// Completes `timeout` after shutdown starts.
async fn drain_deadline(stopping: Arc<Notify>, timeout: Duration) {
  stopping.notified().await;
  tokio::time::sleep(timeout).await;
}
