//! Uniform `{message, data}` response envelope
//!
//! Every public operation answers with exactly one envelope. Failure messages
//! are fixed per operation; the underlying error is only ever logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

/// Public catalog operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SearchMusic,
    GetChart,
    GetDetail,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::SearchMusic => "search_music",
            Operation::GetChart => "get_chart",
            Operation::GetDetail => "get_detail",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Operation::SearchMusic => "music search succeeded",
            Operation::GetChart => "music chart lookup succeeded",
            Operation::GetDetail => "music detail lookup succeeded",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::SearchMusic => "music search failed",
            Operation::GetChart => "music chart lookup failed",
            Operation::GetDetail => "music detail lookup failed",
        }
    }

    /// Message for a rejected request parameter
    pub fn invalid_input_message(self) -> &'static str {
        match self {
            Operation::SearchMusic => "music search failed - no search term",
            Operation::GetChart => "music chart lookup failed - no genre",
            Operation::GetDetail => self.failure_message(),
        }
    }
}

/// Turn an operation outcome into its HTTP response
pub fn respond<T: Serialize>(operation: Operation, result: CatalogResult<T>) -> Response {
    match result {
        Ok(data) => (
            StatusCode::OK,
            Json(Envelope {
                message: operation.success_message(),
                data,
            }),
        )
            .into_response(),
        Err(err) => failure(operation, &err),
    }
}

fn failure(operation: Operation, err: &CatalogError) -> Response {
    let message = match err {
        CatalogError::InvalidInput(_) => operation.invalid_input_message(),
        _ => operation.failure_message(),
    };

    match err {
        CatalogError::Store(_) | CatalogError::Fetch(_) | CatalogError::Decode(_) => {
            error!(operation = operation.name(), kind = err.kind(), error = %err, "Operation failed");
        }
        CatalogError::InvalidInput(_)
        | CatalogError::NotFound(_)
        | CatalogError::DanglingReference { .. } => {
            warn!(operation = operation.name(), kind = err.kind(), error = %err, "Operation rejected");
        }
    }

    (
        StatusCode::BAD_REQUEST,
        Json(Envelope {
            message,
            data: Value::Object(Map::new()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FetchError;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = respond(Operation::GetChart, Ok(vec![1, 2]));
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["message"], "music chart lookup succeeded");
        assert_eq!(body["data"], serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_invalid_input_envelope() {
        let response = respond::<()>(
            Operation::SearchMusic,
            Err(CatalogError::InvalidInput("missing search query".into())),
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "music search failed - no search term");
        assert_eq!(body["data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_failure_hides_error_detail() {
        let response = respond::<()>(
            Operation::GetDetail,
            Err(CatalogError::Fetch(FetchError::Unavailable(
                "node 10.0.0.3 refused connection".into(),
            ))),
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "music detail lookup failed");
        assert_eq!(body["data"], serde_json::json!({}));
        assert!(!body.to_string().contains("10.0.0.3"));
    }
}
