use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::AppConfig;
use crate::store::AppointmentStore;

/// Cross-origin access for browser front ends hosted elsewhere.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn app(shared_state: SharedState) -> Router {
    let cors_enabled = shared_state.config.cors_enabled;

    let router = Router::new()
        // API routes
        .nest("/api", routes::router(cors_enabled))
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        router.layer(cors())
    } else {
        router
    };

    router.with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting with {:?}", config);

    let store = AppointmentStore::from_config(&config)?;
    let shared_state = Arc::new(AppState::new(store, config));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!(
        "Server started. Listening on {}",
        listener.local_addr().context("Listener has no address")?
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
