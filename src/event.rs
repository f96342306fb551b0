use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::RequestShape;
use crate::models::OrderInput;

// ============================================================================
// Dispatcher Events - Normalization at the boundary
// ============================================================================
//
// The dispatcher hands over a free-form JSON event whose layout depends on
// where we run:
//
//   local:    { "path": { "id": "..." },           "body": { "name": "..." } }
//   deployed: { "pathParameters": { "id": "..." }, "body": "{\"name\":\"...\"}" }
//
// Request::from_event resolves the path parameters once; the body stays in
// its raw form until create/update ask for it through Request::input.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(&'static str),

    #[error("Missing request body")]
    MissingBody,

    #[error("Request body must be a JSON-encoded string")]
    BodyNotEncoded,

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub path_params: HashMap<String, String>,
    pub body: Option<Value>,
    shape: RequestShape,
}

fn string_params(carrier: Option<&Value>) -> HashMap<String, String> {
    carrier
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .filter_map(|(name, value)| value.as_str().map(|v| (name.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

impl Request {
    pub fn from_event(event: &Value, shape: RequestShape) -> Self {
        let carrier = match shape {
            RequestShape::Local => "path",
            RequestShape::Deployed => "pathParameters",
        };

        Self {
            path_params: string_params(event.get(carrier)),
            body: event.get("body").filter(|body| !body.is_null()).cloned(),
            shape,
        }
    }

    /// The `id` path parameter.
    pub fn path_id(&self) -> Result<&str, RequestError> {
        self.path_params
            .get("id")
            .map(String::as_str)
            .ok_or(RequestError::MissingPathParameter("id"))
    }

    /// Body fields for create/update; `name` must be present.
    pub fn input(&self) -> Result<OrderInput, RequestError> {
        let body = self.body.as_ref().ok_or(RequestError::MissingBody)?;
        match (self.shape, body) {
            (RequestShape::Local, body) => Ok(OrderInput::deserialize(body)?),
            (RequestShape::Deployed, Value::String(encoded)) => Ok(serde_json::from_str(encoded)?),
            (RequestShape::Deployed, _) => Err(RequestError::BodyNotEncoded),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_shape_reads_plain_objects() {
        let event = json!({
            "path": {"id": "abc"},
            "body": {"name": "Widget"},
            "headers": {"Host": "localhost"}
        });

        let request = Request::from_event(&event, RequestShape::Local);
        assert_eq!(request.path_id().unwrap(), "abc");
        assert_eq!(request.input().unwrap().name, "Widget");
    }

    #[test]
    fn test_deployed_shape_parses_encoded_body() {
        let event = json!({
            "pathParameters": {"id": "abc"},
            "body": "{\"name\":\"Widget\"}"
        });

        let request = Request::from_event(&event, RequestShape::Deployed);
        assert_eq!(request.path_id().unwrap(), "abc");
        assert_eq!(request.input().unwrap().name, "Widget");
    }

    #[test]
    fn test_shapes_do_not_mix() {
        let deployed = json!({"pathParameters": {"id": "abc"}});
        let request = Request::from_event(&deployed, RequestShape::Local);
        assert!(request.path_id().is_err());

        let local = json!({"path": {"id": "abc"}, "body": {"name": "Widget"}});
        let request = Request::from_event(&local, RequestShape::Deployed);
        assert!(request.path_id().is_err());
        assert!(matches!(request.input(), Err(RequestError::BodyNotEncoded)));
    }

    #[test]
    fn test_deployed_body_must_be_valid_json() {
        let event = json!({"body": "{not json"});
        let request = Request::from_event(&event, RequestShape::Deployed);
        let err = request.input().unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
    }

    #[test]
    fn test_unused_body_is_never_decoded() {
        let event = json!({"pathParameters": {"id": "abc"}, "body": "not json"});
        let request = Request::from_event(&event, RequestShape::Deployed);
        assert_eq!(request.path_id().unwrap(), "abc");

        let event = json!({"body": {"name": "Widget"}});
        let request = Request::from_event(&event, RequestShape::Deployed);
        assert!(request.path_params.is_empty());
    }

    #[test]
    fn test_null_pieces_are_absent() {
        let event = json!({"pathParameters": null, "body": null});
        let request = Request::from_event(&event, RequestShape::Deployed);

        assert!(request.path_params.is_empty());
        assert!(matches!(request.input(), Err(RequestError::MissingBody)));
        assert_eq!(
            request.path_id().unwrap_err().to_string(),
            "Missing path parameter: id"
        );
    }

    #[test]
    fn test_body_without_name_is_rejected() {
        let event = json!({"body": {"title": "Widget"}});
        let request = Request::from_event(&event, RequestShape::Local);
        assert!(matches!(request.input(), Err(RequestError::InvalidBody(_))));

        let event = json!({"body": "{\"title\":\"Widget\"}"});
        let request = Request::from_event(&event, RequestShape::Deployed);
        assert!(matches!(request.input(), Err(RequestError::InvalidBody(_))));
    }
}
