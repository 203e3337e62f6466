//! HTTP server entry point and Axum router setup.
//!
//! Loads settings and the template store once, then serves rendering,
//! parsing and recovery-message selection over JSON.

mod dto;
mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use cadre::{Renderer, Settings, TemplateStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub renderer: Renderer,
}

impl ServerState {
    pub fn new(store: TemplateStore) -> Self {
        Self {
            renderer: Renderer::new(Arc::new(store)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let store = TemplateStore::load(&settings)?;
    for category in store.categories() {
        info!("  - {} ({} templates)", category, store.category(category).map_or(0, |c| c.len()));
    }

    let state = Arc::new(ServerState::new(store));

    info!("Starting server on {}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Builds the router with logging and CORS layers.
pub fn app(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/templates", get(handlers::templates::list))
        .route("/render", post(handlers::render::render))
        .route("/parse", post(handlers::parse::parse))
        .route("/recover", post(handlers::recover::recover))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
