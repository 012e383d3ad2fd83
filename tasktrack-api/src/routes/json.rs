/// Request body helpers shared by the JSON endpoints
///
/// Bodies are taken as raw bytes and decoded here so that every failure
/// produces a response envelope instead of the framework's default rejection.

use crate::error::ApiError;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

const CONTENT_TYPE_MESSAGE: &str = "Content type header not set to JSON";

/// Content type of the request, if one was declared
///
/// `Some(true)` for `application/json` with or without parameters such as
/// `; charset=utf-8`.
fn declared_json(headers: &HeaderMap) -> Option<bool> {
    headers.get(CONTENT_TYPE).map(|value| {
        value
            .to_str()
            .ok()
            .and_then(|raw| raw.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    })
}

/// Requires a JSON content type
pub fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    match declared_json(headers) {
        Some(true) => Ok(()),
        _ => Err(ApiError::bad_request(CONTENT_TYPE_MESSAGE)),
    }
}

/// Rejects a declared non-JSON content type; an absent header is accepted
pub fn reject_non_json(headers: &HeaderMap) -> Result<(), ApiError> {
    match declared_json(headers) {
        Some(false) => Err(ApiError::bad_request(CONTENT_TYPE_MESSAGE)),
        _ => Ok(()),
    }
}

/// Decodes a body that must be a JSON object into `T`
///
/// A body that is not JSON, or not an object, is reported as invalid JSON.
/// An object whose fields have the wrong types is reported with
/// `invalid_fields_message`.
pub fn parse_object<T: DeserializeOwned>(
    body: &[u8],
    invalid_fields_message: &str,
) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::bad_request("Request body is not valid JSON"))?;

    if !value.is_object() {
        return Err(ApiError::bad_request("Request body is not valid JSON"));
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Request body fields rejected");
        ApiError::bad_request(invalid_fields_message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: Option<String>,
    }

    #[test]
    fn test_require_json() {
        assert!(require_json(&headers(Some("application/json"))).is_ok());
        assert!(require_json(&headers(Some("application/json; charset=utf-8"))).is_ok());
        assert!(require_json(&headers(Some("text/plain"))).is_err());
        assert!(require_json(&headers(None)).is_err());
    }

    #[test]
    fn test_reject_non_json_allows_missing_header() {
        assert!(reject_non_json(&headers(None)).is_ok());
        assert!(reject_non_json(&headers(Some("application/json"))).is_ok());
        assert_eq!(
            reject_non_json(&headers(Some("application/x-www-form-urlencoded"))),
            Err(ApiError::bad_request(CONTENT_TYPE_MESSAGE))
        );
    }

    #[test]
    fn test_parse_object() {
        let sample: Sample = parse_object(br#"{"name": "x"}"#, "bad fields").unwrap();
        assert_eq!(sample.name.as_deref(), Some("x"));

        let err = parse_object::<Sample>(b"not json", "bad fields").unwrap_err();
        assert_eq!(err, ApiError::bad_request("Request body is not valid JSON"));

        let err = parse_object::<Sample>(b"[1, 2]", "bad fields").unwrap_err();
        assert_eq!(err, ApiError::bad_request("Request body is not valid JSON"));

        let err = parse_object::<Sample>(br#"{"name": 5}"#, "bad fields").unwrap_err();
        assert_eq!(err, ApiError::bad_request("bad fields"));
    }
}
