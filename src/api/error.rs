//! Maps [`Error`] kinds onto HTTP status codes.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable kind
    pub error: &'static str,
    /// Human-readable detail
    pub detail: String,
}

fn status_for(kind: &str) -> StatusCode {
    match kind {
        "forbidden" => StatusCode::FORBIDDEN,
        "unauthorized" => StatusCode::UNAUTHORIZED,
        "invalid_transition" => StatusCode::BAD_REQUEST,
        "not_found" => StatusCode::NOT_FOUND,
        "conflict" => StatusCode::CONFLICT,
        "validation_error" => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        // Internal details stay in the log.
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: kind,
                detail,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_to_status() {
        let cases = [
            (Error::forbidden("no"), StatusCode::FORBIDDEN),
            (
                Error::Unauthorized {
                    message: "who".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                Error::InvalidTransition {
                    entity: "club",
                    from: "rejected".into(),
                    to: "active".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::NotFound {
                    resource: "club",
                    id: 1,
                },
                StatusCode::NOT_FOUND,
            ),
            (Error::conflict("dup"), StatusCode::CONFLICT),
            (Error::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                Error::Config {
                    message: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
