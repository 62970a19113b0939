use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use super::{
    AppState,
    errors::GatewayError,
    fixed_queries::{self, FixedQuery},
    models::{QueryRequest, Record, SearchParams},
    projection, query_form,
};

const NO_QUERY: &str = "No query provided";

/// Liveness of the gateway plus reachability of the SPARQL engine
pub async fn health_check(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    match app_state.executor.execute("ASK {}").await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "service": "shelfgraph",
                "status": "healthy",
                "engine": "reachable",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            log::warn!("Health check: SPARQL engine not answering: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "service": "shelfgraph",
                    "status": "degraded",
                    "engine": "unreachable",
                    "error": e.to_string(),
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
    }
}

/// Render a table entry, run it and project its rows
async fn run_fixed(
    app_state: &AppState,
    query: &FixedQuery,
    arg: Option<&str>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    log::debug!("Fixed route '{}' called", query.name);

    let body = query.render(arg).map_err(|e| {
        log::warn!("Rejected parameter for '{}': {}", query.name, e);
        GatewayError::from(e)
    })?;

    let result = app_state.executor.execute(&body).await?;

    let records = projection::project_rows(result.rows(), query.fields).map_err(|e| {
        log::error!("Projection failed for '{}': {}", query.name, e);
        GatewayError::from(e)
    })?;

    log::debug!("Fixed route '{}' returned {} record(s)", query.name, records.len());
    Ok(Json(records))
}

pub async fn list_items(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::ALL_BOOKS, None).await
}

pub async fn list_available_copies(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::AVAILABLE_COPIES, None).await
}

pub async fn list_active_loans(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::ACTIVE_LOANS, None).await
}

pub async fn list_overdue_loans(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::OVERDUE_LOANS, None).await
}

pub async fn list_members(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::MEMBERS, None).await
}

pub async fn member_loans(
    State(app_state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::MEMBER_LOANS, Some(&member_id)).await
}

pub async fn author_stats(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::AUTHOR_STATS, None).await
}

pub async fn search_items(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::SEARCH_BOOKS, params.q.as_deref()).await
}

pub async fn search_members(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, GatewayError> {
    run_fixed(&app_state, &fixed_queries::SEARCH_MEMBERS, params.q.as_deref()).await
}

/// Free-form query console: runs caller SPARQL and relays the engine's result
/// document unchanged
pub async fn sparql_query_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let request = match payload {
        Ok(Json(request)) => request,
        // Without a JSON content type the body is not read at all, so the
        // request is treated as carrying no query
        Err(JsonRejection::MissingJsonContentType(_)) => QueryRequest::default(),
        Err(rejection) => {
            log::warn!("Pass-through query with unreadable body: {}", rejection.body_text());
            return Err(GatewayError::BadRequest(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            log::warn!("Pass-through query rejected: {}", NO_QUERY);
            GatewayError::BadRequest(NO_QUERY.to_string())
        })?;

    let form = query_form::classify(query);
    if let Some(reason) = form.rejection() {
        log::warn!("Pass-through query rejected ({:?}): {}", form, reason);
        return Err(GatewayError::BadRequest(reason.to_string()));
    }

    log::debug!("Pass-through {:?} query", form);
    let result = app_state.executor.execute_raw(query).await?;
    Ok(Json(result))
}
