use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::parameter_substitution::ParameterSubstitutionError;

/// Failure while talking to the SPARQL engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpstreamError {
    /// Connection failure or a 5xx from the engine. Safe to retry.
    #[error("SPARQL engine unreachable: {0}")]
    Unreachable(String),

    #[error("SPARQL engine did not answer within {0:?}")]
    Timeout(Duration),

    /// The engine refused the query (4xx), usually a syntax error
    #[error("Query rejected by SPARQL engine: {0}")]
    Rejected(String),

    /// 2xx answer whose body is not a SPARQL JSON result set
    #[error("Malformed response from SPARQL engine: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamError::Unreachable(_) | UpstreamError::Timeout(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Unreachable(_) | UpstreamError::Malformed(_) => StatusCode::BAD_GATEWAY,
            UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::Rejected(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// A binding row did not have the shape its projection expects
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MappingError {
    #[error("Field '{field}' expected an integer but variable ?{var} was '{value}'")]
    NotAnInteger {
        field: &'static str,
        var: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Result mapping failed: {0}")]
    Mapping(#[from] MappingError),
}

impl From<ParameterSubstitutionError> for GatewayError {
    fn from(e: ParameterSubstitutionError) -> Self {
        GatewayError::BadRequest(e.to_string())
    }
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(e) => e.status_code(),
            GatewayError::Mapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
