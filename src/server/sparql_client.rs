use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde_json::Value;

use super::errors::UpstreamError;
use super::models::ResultSet;

/// Namespace declarations prepended to every query sent to the engine
pub const PREFIXES: &str = "\
PREFIX lib: <http://www.semanticweb.org/anner/ontologies/2026/1/untitled-ontology-14#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
";

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest engine error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Sends a complete query to a SPARQL engine and returns the JSON document it
/// answered with, untouched
#[async_trait]
pub trait SparqlTransport: Send + Sync {
    async fn select(&self, query: &str) -> Result<Value, UpstreamError>;
}

/// SPARQL 1.1 protocol over HTTP GET
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unreachable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl SparqlTransport for HttpTransport {
    async fn select(&self, query: &str) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header(header::ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice::<Value>(&bytes).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

fn status_error(status: StatusCode, body: &str) -> UpstreamError {
    let detail: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    let message = if detail.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail)
    };

    if status.is_client_error() {
        UpstreamError::Rejected(message)
    } else {
        UpstreamError::Unreachable(message)
    }
}

/// Composes full queries and runs them through a transport
#[derive(Clone)]
pub struct QueryExecutor {
    transport: Arc<dyn SparqlTransport>,
}

impl QueryExecutor {
    pub fn new(transport: Arc<dyn SparqlTransport>) -> Self {
        Self { transport }
    }

    /// Executor backed by the HTTP transport
    pub fn http(endpoint: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self::new(Arc::new(HttpTransport::new(endpoint, timeout)?)))
    }

    /// Prepend the namespace preamble to a query body
    pub fn compose(body: &str) -> String {
        let mut query = String::with_capacity(PREFIXES.len() + body.len());
        query.push_str(PREFIXES);
        query.push_str(body);
        query
    }

    async fn run(&self, body: &str) -> Result<Value, UpstreamError> {
        let query = Self::compose(body);
        log::debug!("Executing SPARQL:\n{}", query);

        self.transport.select(&query).await.map_err(|e| {
            log::error!("SPARQL query failed. Query was:\n{}\nError: {}", query, e);
            e
        })
    }

    /// Run a query and decode the answer into a typed result set
    pub async fn execute(&self, body: &str) -> Result<ResultSet, UpstreamError> {
        let doc = self.run(body).await?;
        let result: ResultSet = serde_json::from_value(doc).map_err(|e| {
            log::error!("SPARQL result did not decode: {}", e);
            UpstreamError::Malformed(e.to_string())
        })?;

        log::debug!("SPARQL returned {} row(s)", result.rows().len());
        Ok(result)
    }

    /// Run a query and hand back the engine's document as-is, once it is known
    /// to be a result set. Unknown keys and term types pass through.
    pub async fn execute_raw(&self, body: &str) -> Result<Value, UpstreamError> {
        let doc = self.run(body).await?;
        check_result_shape(&doc).map_err(|e| {
            log::error!("SPARQL engine answered with a non-result document: {}", e);
            e
        })?;
        Ok(doc)
    }
}

/// A SELECT document has `head` and `results.bindings`, an ASK document has
/// `head` and `boolean`
fn check_result_shape(doc: &Value) -> Result<(), UpstreamError> {
    let has_head = doc.get("head").is_some_and(Value::is_object);
    let has_bindings = doc.pointer("/results/bindings").is_some_and(Value::is_array);
    let has_boolean = doc.get("boolean").is_some_and(Value::is_boolean);

    if has_head && (has_bindings || has_boolean) {
        Ok(())
    } else {
        Err(UpstreamError::Malformed(
            "expected a SPARQL JSON result set with head and results.bindings or boolean"
                .to_string(),
        ))
    }
}
