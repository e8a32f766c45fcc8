//! # Shoplens Dashboard
//!
//! This crate is the presentation layer: an axum server that renders the KPI dashboard
//! as a server-side HTML page with inline SVG charts, plus a small JSON API.
//!
//! ## Architectural Principles
//!
//! - **Synchronous Recompute:** Every request reloads the CSV files and recomputes the
//!   metrics. There is no cache, no background task and no shared mutable state.
//! - **View Models First:** Handlers only translate between HTTP and `DashboardView`.
//!   The same view feeds the HTML page, the JSON API and `DashboardSession`.
//! - **Errors Are Pages:** A data problem never stops the server; it becomes an error
//!   page or a `{"error": ...}` body with a matching status code.
//!
//! ## Public API
//!
//! - `router` / `run_server`: The HTTP surface (`/`, `/api/dashboard`, `/api/filters`, `/api/health`).
//! - `DashboardSession`: A filter selection with a redraw callback.
//! - `DashboardView`: Cards, charts and filter options for one render.
//! - `format`: Currency, percentage and trend formatting.

use axum::{Router, routing::get};
use configuration::{Config, DashboardSettings};
use loader::DataLoader;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod charts;
pub mod error;
pub mod format;
pub mod handlers;
pub mod html;
pub mod view;

pub use error::AppError;
pub use view::{DashboardSession, DashboardView, FilterChange, FilterOptions, Selection};

/// The shared application state that all handlers can access. Read-only.
#[derive(Debug, Clone)]
pub struct AppState {
    pub loader: DataLoader,
    pub dashboard: DashboardSettings,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            loader: DataLoader::from_settings(&config.data),
            dashboard: config.dashboard.clone(),
        }
    }
}

/// Builds the application routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::dashboard_page))
        .route("/api/dashboard", get(handlers::dashboard_json))
        .route("/api/filters", get(handlers::filter_options))
        .route("/api/health", get(handlers::health))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    // Missing data is reported per request, so the server still starts.
    if let Err(err) = state.loader.load() {
        tracing::warn!(error = %err, "The data directory is not usable yet.");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        data_dir = %state.loader.data_dir().display(),
        "Dashboard listening on http://{}",
        addr
    );
    axum::serve(listener, router(state)).await?;

    Ok(())
}
