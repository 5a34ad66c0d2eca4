//! # dpjoin-server: HTTP Service for the Join-Order Optimizer
//!
//! This binary crate exposes the memoized join-order search as a network service.
//! Clients post their base relations and receive the cheapest bushy join tree.
//!
//! ## Architecture
//!
//! ```text
//! Client (planner, notebook, test harness)
//!   |
//!   | HTTP POST /optimize/join-order (JSON)
//!   v
//! dpjoin-server (this binary)
//!   |
//!   +-> register relations in a fresh catalog
//!   +-> DP search over relation subsets (blocking pool)
//!   +-> convert winning plan to a JSON tree
//!   |
//!   | HTTP response (JSON)
//!   v
//! Client
//! ```
//!
//! ## Endpoints
//!
//! - `GET  /health`               - Health check
//! - `GET  /config`               - Search configuration applied to requests
//! - `POST /optimize/join-order`  - Optimize a join order
//!
//! ## Configuration
//!
//! The server listens on `DPJOIN_ADDR` (default `0.0.0.0:3000`). `DPJOIN_MAX_RELATIONS`
//! and `DPJOIN_DEADLINE_MS` bound each search. Logging is controlled by the `RUST_LOG`
//! environment variable (defaults to `dpjoin=debug`).

mod join_order;
mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug-level messages from the dpjoin crates by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dpjoin=debug".parse()?))
        .init();

    let config = state::OptimizerConfig::from_env();
    let addr = config.bind_addr.clone();
    tracing::info!(
        max_relations = config.search.relation_limit(),
        deadline = ?config.search.deadline,
        "search configuration loaded"
    );
    let state = Arc::new(state::AppState::new(config));

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::show_config))
        .route("/optimize/join-order", post(join_order::optimize_join_order))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("dpjoin-server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
