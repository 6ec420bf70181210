// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::xl::XlError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Map pipeline errors onto front-door statuses: caller mistakes are 400s,
/// a dead session is 401, everything upstream of us is a 502.
impl From<XlError> for ApiError {
    fn from(err: XlError) -> Self {
        let status = match &err {
            XlError::Validation(_) => StatusCode::BAD_REQUEST,
            XlError::SessionExpired => StatusCode::UNAUTHORIZED,
            XlError::Signing(_)
            | XlError::Transport(_)
            | XlError::UpstreamStatus { .. }
            | XlError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        };
        let message = match err {
            XlError::UpstreamStatus { status, body } => {
                format!("upstream status {status}: {body}")
            }
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    #[test]
    fn constructors_set_status_and_message() {
        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let auth = ApiError::unauthorized("expired");
        assert_eq!(auth.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn pipeline_errors_map_to_the_right_statuses() {
        let validation: ApiError = XlError::Validation("contact".to_string()).into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);

        let expired: ApiError = XlError::SessionExpired.into();
        assert_eq!(expired.status, StatusCode::UNAUTHORIZED);

        let upstream: ApiError = XlError::UpstreamStatus {
            status: "FAILED".to_string(),
            body: json!({ "code": "OUT_OF_STOCK" }),
        }
        .into();
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert!(upstream.message.contains("OUT_OF_STOCK"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
