//! Response relay.
//!
//! # Responsibilities
//! - Pass the origin's response through to the client
//! - Map rejections and forwarding errors to a status-only response
//!
//! # Design Decisions
//! - Origin status, headers and body are relayed verbatim, body streamed
//! - Error responses carry a plain-text "<code> <reason>" body
//! - The handler returns exactly one of these per request

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;

use crate::error::ProxyError;
use crate::http::forwarder::UpstreamBody;

/// Relay an origin response unmodified.
pub fn relay_upstream(response: Response<UpstreamBody>) -> axum::response::Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

/// Standard error response for a status code.
pub fn error_response(status: StatusCode) -> axum::response::Response {
    (status, status.to_string()).into_response()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        error_response(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteRejection;

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ProxyError::from(RouteRejection::UnknownHost { host: None }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"404 Not Found");
    }
}
