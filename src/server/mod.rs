use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};

use crate::config::ServerConfig;
use handlers::{
    author_stats, health_check, list_active_loans, list_available_copies, list_items,
    list_members, list_overdue_loans, member_loans, search_items, search_members,
    sparql_query_handler,
};
use sparql_client::QueryExecutor;

pub mod errors;
pub mod fixed_queries;
pub mod handlers;
pub mod models;
pub mod parameter_substitution;
pub mod projection;
pub mod query_form;
pub mod sparql_client;

/// Slack on top of the engine timeout before the HTTP layer gives up on a request
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(2);

/// Immutable per-process state; nothing here changes between requests
#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(executor: QueryExecutor, config: ServerConfig) -> Self {
        Self { executor, config }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = app_state.config.query_timeout() + REQUEST_TIMEOUT_SLACK;
    let max_body_bytes = app_state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/items", get(list_items))
        .route("/copies/available", get(list_available_copies))
        .route("/loans/active", get(list_active_loans))
        .route("/loans/overdue", get(list_overdue_loans))
        .route("/members", get(list_members))
        .route("/members/{id}/loans", get(member_loans))
        .route("/authors/stats", get(author_stats))
        .route("/search/items", get(search_items))
        .route("/search/members", get(search_members))
        .route("/query", post(sparql_query_handler))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(app_state))
}

fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    log::error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

pub async fn run_with_config(config: ServerConfig) {
    log::info!(
        "Server configuration: http={}, sparql={}, timeout={}ms",
        config.bind_address(),
        config.sparql_endpoint,
        config.query_timeout_ms
    );

    let executor = match QueryExecutor::http(&config.sparql_endpoint, config.query_timeout()) {
        Ok(executor) => executor,
        Err(e) => {
            log::error!("✗ Failed to create SPARQL client: {}", e);
            std::process::exit(1);
        }
    };

    let http_bind_address = config.bind_address();
    let app = build_router(AppState::new(executor, config.clone()));

    let http_listener = match TcpListener::bind(&http_bind_address).await {
        Ok(listener) => {
            log::info!("Successfully bound HTTP listener to {}", http_bind_address);
            listener
        }
        Err(e) => {
            log::error!(
                "✗ FATAL: Failed to bind HTTP listener to {}: {}",
                http_bind_address,
                e
            );
            log::error!("  Is another process using port {}?", config.http_port);
            std::process::exit(1);
        }
    };

    println!("shelfgraph is running");
    println!("  HTTP API: http://{}", http_bind_address);
    println!("  SPARQL endpoint: {}", config.sparql_endpoint);

    if let Err(e) = axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("HTTP server fatal error: {:?}", e);
        std::process::exit(1);
    }

    println!("Server stopped");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to register SIGTERM handler: {}. Only Ctrl+C will stop the server.", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                }
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => println!("Received SIGTERM, shutting down..."),
            _ = tokio::signal::ctrl_c() => println!("Received SIGINT, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        println!("Received shutdown signal, shutting down...");
    }
}
