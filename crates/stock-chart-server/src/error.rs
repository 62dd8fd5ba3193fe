use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stock_chart_core::error::ResolveError;
use stock_chart_providers::error::ProviderError;
use thiserror::Error;

/// Unified error type for API responses.
///
/// Three terminal classes: the caller got the request wrong (400), the
/// request was valid but upstream had nothing for it (404), or upstream
/// failed or returned a malformed payload (500).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("No data available for the specified period")]
    NoData,

    #[error("Failed to fetch stock data")]
    Upstream { details: Option<String> },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoData => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.to_string() });
        if let Self::Upstream {
            details: Some(details),
        } = &self
        {
            body["details"] = json!(details);
        }
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NoData { .. } => Self::NoData,
            // Surface the provider's own description for diagnostics.
            ProviderError::Chart { description, .. } => Self::Upstream {
                details: Some(description),
            },
            other => Self::Upstream {
                details: Some(other.to_string()),
            },
        }
    }
}
