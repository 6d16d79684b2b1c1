use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::Response,
    Form, Json,
};
use serde_json::{Map, Value};

use crate::routes::internal_server_error;

/// Content-negotiated request payload for the contact endpoint.
///
/// JSON bodies are passed through as-is; URL-encoded form bodies are lifted
/// into an equivalent JSON object. Any other (or missing) content type
/// yields `Value::Null`, which normalizes to an all-empty submission, so the
/// handler answers with the missing-fields validation error instead of a
/// transport-level rejection.
pub struct RawPayload(pub Value);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for RawPayload {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<Value>::from_request(req, state)
                .await
                .map_err(internal_server_error)?;
            Ok(Self(payload))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<BTreeMap<String, String>>::from_request(req, state)
                .await
                .map_err(internal_server_error)?;
            let payload = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect::<Map<_, _>>();
            Ok(Self(Value::Object(payload)))
        } else {
            Ok(Self(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde_json::json;

    use super::*;

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let builder = Request::builder().method("POST").uri("/api/contact");
        let builder = match content_type {
            Some(value) => builder.header(CONTENT_TYPE, value),
            None => builder,
        };
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn json_payload() {
        let req = request(
            Some("application/json"),
            r#"{"first_name": "Anna", "message": "Hej!"}"#,
        );

        let RawPayload(payload) = RawPayload::from_request(req, &()).await.unwrap();

        assert_eq!(payload, json!({"first_name": "Anna", "message": "Hej!"}));
    }

    #[tokio::test]
    async fn form_payload() {
        let req = request(
            Some("application/x-www-form-urlencoded"),
            "first_name=Anna&message=Hej%21",
        );

        let RawPayload(payload) = RawPayload::from_request(req, &()).await.unwrap();

        assert_eq!(payload, json!({"first_name": "Anna", "message": "Hej!"}));
    }

    #[tokio::test]
    async fn unknown_content_type() {
        let req = request(Some("text/plain"), "first_name=Anna");

        let RawPayload(payload) = RawPayload::from_request(req, &()).await.unwrap();

        assert_eq!(payload, Value::Null);
    }

    #[tokio::test]
    async fn missing_content_type() {
        let req = request(None, "");

        let RawPayload(payload) = RawPayload::from_request(req, &()).await.unwrap();

        assert_eq!(payload, Value::Null);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let req = request(Some("application/json"), "{not json");

        assert!(RawPayload::from_request(req, &()).await.is_err());
    }
}
