//! HTTP surface of the solver: routing, request validation and error mapping.

use std::sync::Arc;

use ai_llm_service::error_handler::env_opt;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

pub mod core {
    pub mod app_state;
    pub mod upload;
}

pub mod error_handler;

mod routes {
    pub mod home_route;

    pub mod self_test {
        pub mod self_test_route;
    }

    pub mod solve {
        pub mod solve_response;
        pub mod solve_route;
    }
}

pub use crate::{
    core::app_state::{AppState, api_address},
    error_handler::AppError,
};

use crate::routes::{
    home_route::home_route, self_test::self_test_route::self_test_route,
    solve::solve_route::solve_route,
};

/// Upper bound for a request body, uploads included.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Builds the application router over shared `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_route))
        .route("/api", post(solve_route))
        .route("/api/", post(solve_route))
        .route("/test", get(self_test_route))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads state from the environment, binds and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);
    let addr = api_address(&env_opt);

    let listener = TcpListener::bind(&addr).await.map_err(AppError::Bind)?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
