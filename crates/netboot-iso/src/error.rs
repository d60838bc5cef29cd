//! Error types for the ISO patcher
//!
//! Every variant maps to an HTTP status so handlers can return
//! `Result<Response, IsoError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use netboot_hardware::DirectoryError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for ISO operations
#[derive(Debug, Error)]
pub enum IsoError {
    /// Request path is not `/iso/{mac}/{filename}`
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// MAC segment did not parse
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// Source URL did not parse or is not http(s)
    #[error("invalid source URL '{url}': {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    /// Neither the request, the hardware record nor the config named a source
    #[error("no source ISO configured")]
    NoSource,

    /// Hardware directory failed
    #[error("hardware lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Hardware directory did not answer in time
    #[error("hardware lookup timed out after {0:?}")]
    LookupTimeout(Duration),

    /// Kernel command line does not fit the placeholder
    #[error("kernel command line is {len} bytes, placeholder holds {max}")]
    CmdlineTooLong { len: usize, max: usize },

    /// Magic placeholder is empty
    #[error("magic placeholder is empty")]
    EmptyMagic,

    /// Redirect chain longer than the configured limit
    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Redirect without a usable Location header
    #[error("bad redirect from {url}: {reason}")]
    BadRedirect { url: String, reason: String },

    /// Upstream answered with a non-success status
    #[error("upstream returned {0}")]
    UpstreamStatus(StatusCode),

    /// Upstream did not send response headers in time
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// Upstream request failed
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body stream failed or stalled after the response started
    #[error("upstream body failed: {0}")]
    Stream(String),

    /// Failed to bind the HTTP listener
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Listener failed while serving
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl IsoError {
    pub fn status(&self) -> StatusCode {
        match self {
            IsoError::InvalidPath(_) => StatusCode::NOT_FOUND,
            IsoError::InvalidMac(_) | IsoError::InvalidSourceUrl { .. } => StatusCode::BAD_REQUEST,
            IsoError::TooManyRedirects(_)
            | IsoError::BadRedirect { .. }
            | IsoError::UpstreamStatus(_)
            | IsoError::UpstreamTimeout(_)
            | IsoError::Request(_)
            | IsoError::Stream(_) => StatusCode::BAD_GATEWAY,
            IsoError::NoSource
            | IsoError::Directory(_)
            | IsoError::LookupTimeout(_)
            | IsoError::CmdlineTooLong { .. }
            | IsoError::EmptyMagic
            | IsoError::BindFailed { .. }
            | IsoError::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IsoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, status = %status, "ISO request failed");
        } else {
            debug!(error = %self, status = %status, "ISO request rejected");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Result type for ISO operations
pub type Result<T> = std::result::Result<T, IsoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            IsoError::InvalidPath("bad".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IsoError::InvalidMac("zz".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IsoError::NoSource.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(IsoError::TooManyRedirects(10).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            IsoError::Directory(DirectoryError::Backend("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = IsoError::CmdlineTooLong { len: 12, max: 8 };
        assert_eq!(
            err.to_string(),
            "kernel command line is 12 bytes, placeholder holds 8"
        );
        let err = IsoError::UpstreamStatus(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "upstream returned 404 Not Found");
    }

    #[test]
    fn test_into_response() {
        let response = IsoError::InvalidSourceUrl {
            url: "ftp://x".into(),
            reason: "unsupported scheme".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
