//! `POST /query` against a mocked SPARQL engine

use axum::http::StatusCode;
use mockall::predicate;
use serde_json::json;

use shelfgraph::server::{
    errors::UpstreamError,
    models::{ResultSet, Term},
    sparql_client::QueryExecutor,
};

use super::common::{MockEngine, app_with, doc, lit, post_json, post_raw, row, unused_engine};

#[tokio::test]
async fn test_empty_query_is_rejected_without_engine_call() {
    let (status, body) = post_json(app_with(unused_engine()), "/query", r#"{"query": ""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No query provided" }));
}

#[tokio::test]
async fn test_whitespace_query_is_rejected() {
    let (status, body) =
        post_json(app_with(unused_engine()), "/query", r#"{"query": "  \n\t "}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No query provided");
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let (status, body) =
        post_json(app_with(unused_engine()), "/query", r#"{"sparql": "SELECT * {}"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No query provided");
}

#[tokio::test]
async fn test_body_without_json_content_type_is_rejected() {
    let (status, body) = post_raw(app_with(unused_engine()), "/query", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No query provided");
}

#[tokio::test]
async fn test_broken_json_is_rejected() {
    let (status, body) = post_json(app_with(unused_engine()), "/query", r#"{"query": "#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_update_is_rejected_without_engine_call() {
    let body = json!({ "query": "INSERT DATA { lib:b9 lib:title \"Forged\" }" }).to_string();
    let (status, response) = post_json(app_with(unused_engine()), "/query", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("read-only"));
}

#[tokio::test]
async fn test_construct_is_rejected() {
    let body = json!({ "query": "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }" }).to_string();
    let (status, _) = post_json(app_with(unused_engine()), "/query", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_select_result_is_relayed_verbatim() {
    let query = "SELECT ?genreName (COUNT(?book) AS ?n) WHERE { ?book lib:hasGenre ?g . ?g lib:genreName ?genreName } GROUP BY ?genreName";

    let mut tagged = lit("Poesía");
    tagged.lang = Some("es".to_string());
    let result = ResultSet::select(
        &["genreName", "n"],
        vec![
            row(&[
                ("genreName", tagged),
                (
                    "n",
                    Term::typed("4", "http://www.w3.org/2001/XMLSchema#integer"),
                ),
            ]),
            row(&[("n", Term::typed("1", "http://www.w3.org/2001/XMLSchema#integer"))]),
        ],
    );
    let expected = doc(&result);
    let answer = expected.clone();

    let composed = QueryExecutor::compose(query);
    let mut engine = MockEngine::new();
    engine
        .expect_select()
        .with(predicate::function(move |q: &str| q == composed))
        .times(1)
        .returning(move |_| Ok(answer.clone()));

    let body = json!({ "query": query }).to_string();
    let (status, response) = post_json(app_with(engine), "/query", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, expected);
    assert_eq!(response["head"]["vars"], json!(["genreName", "n"]));
    assert_eq!(
        response["results"]["bindings"][0]["genreName"],
        json!({ "type": "literal", "value": "Poesía", "xml:lang": "es" })
    );
    // Unbound variable stays absent in the native shape
    assert!(response["results"]["bindings"][1].get("genreName").is_none());
}

#[tokio::test]
async fn test_ask_result_is_relayed() {
    let mut engine = MockEngine::new();
    engine
        .expect_select()
        .times(1)
        .returning(|_| Ok(doc(&ResultSet::ask(true))));

    let body = json!({ "query": "ASK { ?b a lib:Book }" }).to_string();
    let (status, response) = post_json(app_with(engine), "/query", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["boolean"], json!(true));
    assert!(response.get("results").is_none());
}

#[tokio::test]
async fn test_engine_rejection_is_caller_error() {
    let mut engine = MockEngine::new();
    engine.expect_select().times(1).returning(|_| {
        Err(UpstreamError::Rejected(
            "400 Bad Request: Lexical error at line 4, column 9".into(),
        ))
    });

    let body = json!({ "query": "SELECT ?x WHERE { ?x lib:title }" }).to_string();
    let (status, response) = post_json(app_with(engine), "/query", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .unwrap()
        .contains("Lexical error at line 4"));
}

#[tokio::test]
async fn test_engine_unreachable_is_bad_gateway() {
    let mut engine = MockEngine::new();
    engine
        .expect_select()
        .times(1)
        .returning(|_| Err(UpstreamError::Unreachable("connection refused".into())));

    let body = json!({ "query": "SELECT * WHERE { ?s ?p ?o } LIMIT 1" }).to_string();
    let (status, _) = post_json(app_with(engine), "/query", &body).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_non_result_document_is_bad_gateway() {
    let mut engine = MockEngine::new();
    engine
        .expect_select()
        .times(1)
        .returning(|_| Ok(json!({ "status": "ok" })));

    let body = json!({ "query": "SELECT * WHERE { ?s ?p ?o }" }).to_string();
    let (status, response) = post_json(app_with(engine), "/query", &body).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(response["error"].as_str().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_json_body_without_content_type_carries_no_query() {
    let (status, body) = post_raw(
        app_with(unused_engine()),
        "/query",
        r#"{"query": "SELECT * WHERE { ?s ?p ?o }"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No query provided");
}
