pub mod error;
pub mod parser;
pub mod rotation;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use rotor_core::config::Config;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// CORS policy: `*` anywhere in the configured origins allows any origin,
/// otherwise the configured origins plus the local development ones.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins()
            .into_iter()
            .filter_map(|o| match HeaderValue::from_str(&o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/row", get(routes::row::current_row))
        .route("/chat", post(routes::conditions::chat))
        .route("/conditions", get(routes::conditions::list_conditions))
        .route("/conditions/{id}", get(routes::conditions::get_condition))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind `server.host:server.port` and serve until Ctrl-C.
pub async fn serve(app_state: AppState, config: &Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, config, listener).await
}

/// Serve on a pre-bound listener with the rotation task running alongside.
///
/// On shutdown the schedule stops and one final snapshot is written.
/// An invalid configuration is rejected before anything starts.
pub async fn serve_on(
    app_state: AppState,
    config: &Config,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    config.ensure_valid()?;
    let actual_port = listener.local_addr()?.port();
    let rotor = Arc::clone(&app_state.rotor);
    let rotation = rotation::spawn_rotation(Arc::clone(&rotor), config.update_interval());
    let app = build_router(app_state, cors_layer(config));

    tracing::info!("rotor server listening on http://localhost:{actual_port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rotation.abort();
    match tokio::task::spawn_blocking(move || rotor.persist()).await {
        Ok(Ok(())) => tracing::info!("final snapshot written"),
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to write final snapshot"),
        Err(e) => tracing::warn!(error = %e, "final snapshot task failed"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
