/// Uniform JSON response envelope
///
/// Every response this service sends, success or failure, has the same shape:
///
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "messages": [],
///   "data": { "rows_returned": 1, "tasks": [ ... ] }
/// }
/// ```
///
/// `success` is derived from the status class (2xx is a success), so the two can
/// never disagree. `data` is omitted when there is no payload.
///
/// Cacheable envelopes carry `Cache-Control: max-age=N` and a `Last-Modified`
/// header; all others carry `Cache-Control: no-cache, no-store`.
///
/// # Example
///
/// ```
/// use axum::http::StatusCode;
/// use serde_json::json;
/// use tasktrack_api::envelope::Envelope;
///
/// let envelope = Envelope::new(StatusCode::OK)
///     .with_data(&json!({ "rows_returned": 0, "tasks": [] }))
///     .cacheable(60);
///
/// assert!(envelope.is_success());
/// ```

use axum::{
    http::{
        header::{CACHE_CONTROL, LAST_MODIFIED},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Response envelope builder
#[derive(Debug, Clone)]
pub struct Envelope {
    status: StatusCode,
    messages: Vec<String>,
    data: Option<Value>,
    max_age_seconds: Option<u32>,
    serialization_error: Option<String>,
}

/// Serialized body of an envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeBody {
    status_code: u16,
    success: bool,
    messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl Envelope {
    /// Empty, non-cacheable envelope with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            messages: Vec::new(),
            data: None,
            max_age_seconds: None,
            serialization_error: None,
        }
    }

    /// 200 OK
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 201 Created
    pub fn created() -> Self {
        Self::new(StatusCode::CREATED)
    }

    /// Appends a human-readable message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Appends several messages, preserving order
    pub fn messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages.extend(messages.into_iter().map(Into::into));
        self
    }

    /// Sets the payload
    ///
    /// If the payload cannot be serialized the envelope turns into a 500 when
    /// it is sent.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(e) => self.serialization_error = Some(e.to_string()),
        }
        self
    }

    /// Marks the response cacheable for `max_age_seconds`
    pub fn cacheable(mut self, max_age_seconds: u32) -> Self {
        self.max_age_seconds = Some(max_age_seconds);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_cacheable(&self) -> bool {
        self.max_age_seconds.is_some()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        if let Some(error) = self.serialization_error {
            tracing::error!("Failed to serialize response data: {}", error);
            return Envelope::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Failed to serialize response data")
                .into_response();
        }

        let body = EnvelopeBody {
            status_code: self.status.as_u16(),
            success: self.status.is_success(),
            messages: self.messages,
            data: self.data,
        };

        let mut response = (self.status, Json(body)).into_response();
        let headers = response.headers_mut();

        match self.max_age_seconds {
            Some(max_age) => {
                if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", max_age)) {
                    headers.insert(CACHE_CONTROL, value);
                }
                let last_modified = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
                if let Ok(value) = HeaderValue::from_str(&last_modified) {
                    headers.insert(LAST_MODIFIED, value);
                }
            }
            None => {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope_shape() {
        let response = Envelope::ok()
            .message("Task deleted")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "no-cache, no-store"
        );
        assert!(response.headers().get(LAST_MODIFIED).is_none());

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "statusCode": 200,
                "success": true,
                "messages": ["Task deleted"]
            })
        );
    }

    #[tokio::test]
    async fn test_failure_envelope_success_flag() {
        let response = Envelope::new(StatusCode::NOT_FOUND)
            .message("Task not found")
            .into_response();

        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_cacheable_envelope_headers() {
        let response = Envelope::ok()
            .with_data(&json!({ "rows_returned": 0, "tasks": [] }))
            .cacheable(60)
            .into_response();

        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "max-age=60");
        let last_modified = response.headers().get(LAST_MODIFIED).unwrap();
        assert!(last_modified.to_str().unwrap().ends_with(" GMT"));

        let body = body_json(response).await;
        assert_eq!(body["data"]["rows_returned"], 0);
    }

    #[test]
    fn test_messages_preserve_order() {
        let envelope = Envelope::new(StatusCode::BAD_REQUEST)
            .messages(["first", "second"])
            .message("third");
        assert_eq!(envelope.messages, vec!["first", "second", "third"]);
        assert!(!envelope.is_success());
        assert!(!envelope.is_cacheable());
    }
}
