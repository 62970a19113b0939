//! Shared helpers: a mock SPARQL transport and in-process router calls

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use mockall::mock;
use serde_json::Value;
use tower::ServiceExt;

use shelfgraph::config::ServerConfig;
use shelfgraph::server::{
    AppState, build_router,
    errors::UpstreamError,
    models::{BindingRow, ResultSet, Term},
    sparql_client::{QueryExecutor, SparqlTransport},
};

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

mock! {
    pub Engine {}

    #[async_trait]
    impl SparqlTransport for Engine {
        async fn select(&self, query: &str) -> Result<Value, UpstreamError>;
    }
}

/// Engine that must never be called
pub fn unused_engine() -> MockEngine {
    let mut engine = MockEngine::new();
    engine.expect_select().never();
    engine
}

/// Wire form of a result set, as the engine would send it
pub fn doc(result: &ResultSet) -> Value {
    serde_json::to_value(result).unwrap()
}

/// Engine answering every query once with `result`
pub fn engine_returning(result: ResultSet) -> MockEngine {
    let answer = doc(&result);
    let mut engine = MockEngine::new();
    engine
        .expect_select()
        .times(1)
        .returning(move |_| Ok(answer.clone()));
    engine
}

pub fn app_with(engine: MockEngine) -> Router {
    let executor = QueryExecutor::new(Arc::new(engine));
    build_router(AppState::new(executor, ServerConfig::default()))
}

pub fn row(pairs: &[(&str, Term)]) -> BindingRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn lit(value: &str) -> Term {
    Term::literal(value)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}
