use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::Response;

/// Errors returned by the SDK.
///
/// Variants raised after a request went out carry the [`Response`] envelope so
/// that status, rate limit and pagination metadata stay inspectable on failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("`{url}` is not a valid API url: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unable to encode query options")]
    Query(#[source] serde_qs::Error),
    #[error("Unable to encode request body")]
    Body(#[source] serde_json::Error),
    #[error("Unable to build request")]
    Request(#[source] reqwest::Error),
    #[error("Repository has no id")]
    MissingRepositoryId,
    #[error("Request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
        response: Option<Box<Response>>,
    },
    #[error("{} {}: {} {}", .response.method, .response.url, .response.status.as_u16(), .body.message)]
    Status {
        response: Box<Response>,
        body: ErrorResponse,
    },
    #[error("API rate limit exceeded for `{}`", .response.url)]
    RateLimited {
        response: Box<Response>,
        body: ErrorResponse,
    },
    #[error("Unable to decode response from `{}`", .response.url)]
    Decode {
        response: Box<Response>,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// The response envelope, if the request got far enough to receive one.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status { response, .. }
            | Error::RateLimited { response, .. }
            | Error::Decode { response, .. } => Some(&**response),
            Error::Transport { response, .. } => response.as_deref(),
            Error::InvalidUrl { .. }
            | Error::Query(_)
            | Error::Body(_)
            | Error::Request(_)
            | Error::MissingRepositoryId => None,
        }
    }

    /// True when the request was rejected before anything was sent.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl { .. }
                | Error::Query(_)
                | Error::Body(_)
                | Error::Request(_)
                | Error::MissingRepositoryId
        )
    }

    /// The decoded error body for non-success statuses.
    #[must_use]
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Status { body, .. } | Error::RateLimited { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Error payload GitHub returns alongside non-success statuses.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorResponse {
    /// Decode an error body, keeping the raw text when it is not JSON.
    pub(crate) fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self {
            message: String::from_utf8_lossy(body).trim().to_string(),
            ..Self::default()
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
