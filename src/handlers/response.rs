use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::ErrorBody;

pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Normalized response handed back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiResponse {
    fn with_body(status_code: u16, body: Option<String>) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(ALLOW_ORIGIN_HEADER.to_string(), "*".to_string())]),
            body,
        }
    }

    /// Parses the JSON body back into a value.
    #[cfg(test)]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// Response with `body` serialized as JSON text.
pub fn create_response<T: Serialize>(status_code: u16, body: &T) -> ApiResponse {
    match serde_json::to_string(body) {
        Ok(json) => ApiResponse::with_body(status_code, Some(json)),
        Err(e) => {
            tracing::error!(status_code, "Failed to serialize response body: {}", e);
            internal_error(&e.to_string())
        }
    }
}

/// Response without a body (delete).
pub fn empty_response(status_code: u16) -> ApiResponse {
    ApiResponse::with_body(status_code, None)
}

/// 500 with `{message}`; an empty message falls back to the generic text.
pub fn internal_error(message: &str) -> ApiResponse {
    let message = if message.trim().is_empty() {
        INTERNAL_SERVER_ERROR
    } else {
        message
    };

    let body = serde_json::json!({ "message": message }).to_string();
    ApiResponse::with_body(500, Some(body))
}

pub fn not_found(id: &str) -> ApiResponse {
    create_response(
        404,
        &ErrorBody::new(format!("An item could not be found with id: {}", id)),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_response_sets_cors_and_json_body() {
        let response = create_response(200, &json!({"orders": []}));

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get(ALLOW_ORIGIN_HEADER).map(String::as_str),
            Some("*")
        );
        assert_eq!(response.body.as_deref(), Some(r#"{"orders":[]}"#));
    }

    #[test]
    fn test_empty_response_has_no_body() {
        let response = empty_response(200);
        assert!(response.body.is_none());

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(
            wire,
            json!({"statusCode": 200, "headers": {"Access-Control-Allow-Origin": "*"}})
        );
    }

    #[test]
    fn test_internal_error_falls_back_to_generic_message() {
        let response = internal_error("");
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_json(), Some(json!({"message": "Internal server error"})));

        let response = internal_error("connection refused");
        assert_eq!(response.body_json(), Some(json!({"message": "connection refused"})));
    }

    #[test]
    fn test_not_found_message() {
        let response = not_found("missing-id");
        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.body_json(),
            Some(json!({"message": "An item could not be found with id: missing-id"}))
        );
    }
}
