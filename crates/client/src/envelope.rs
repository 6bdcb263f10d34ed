//! Uniform response envelope.
//!
//! Services answer either with `{success, data, error}` or with the bare
//! payload. Both are normalized into [`ApiResponse`], and so are transport
//! failures, so stores only ever branch on `success`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shipdesk_core::PageMeta;

/// Error codes produced client-side. Backend codes pass through untouched.
pub mod codes {
    /// Request never produced an HTTP response.
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// Non-2xx response.
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    /// 2xx response whose body could not be decoded.
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status_code: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_ERROR, message)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status),
            ..Self::new(codes::SERVER_ERROR, message)
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_RESPONSE, message)
    }

    pub fn is_network(&self) -> bool {
        self.code == codes::NETWORK_ERROR
    }

    pub fn is_status(&self, status: u16) -> bool {
        self.status_code == Some(status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    /// Data of a successful response. A success without data is reported as
    /// an invalid response.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err(ApiError::invalid_response("response carried no data")),
            (false, _, Some(error)) => Err(error),
            (false, _, None) => Err(ApiError::new(codes::SERVER_ERROR, "request failed")),
        }
    }

    /// Outcome of calls whose body does not matter (delete, logout).
    pub fn into_unit_result(self) -> Result<(), ApiError> {
        match (self.success, self.error) {
            (true, _) => Ok(()),
            (false, Some(error)) => Err(error),
            (false, None) => Err(ApiError::new(codes::SERVER_ERROR, "request failed")),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            timestamp: self.timestamp,
        }
    }
}

/// Body of paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    /// Wrap an unpaginated list.
    pub fn single_page(data: Vec<T>) -> Self {
        let meta = PageMeta::single_page(data.len());
        Self { data, meta }
    }
}

/// Normalize a 2xx body.
pub(crate) fn decode_success<T: DeserializeOwned>(status: u16, body: &[u8]) -> ApiResponse<T> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => return ApiResponse::failure(ApiError::invalid_response(e.to_string())),
        }
    };

    match as_envelope(&value) {
        Some(envelope) => decode_envelope(status, envelope),
        None => decode_value(value),
    }
}

/// Best-effort message of a non-2xx body.
pub(crate) fn decode_failure(status: u16, reason: Option<&str>, body: &[u8]) -> ApiError {
    let fallback = || reason.unwrap_or("request failed").to_string();

    let message = match serde_json::from_slice::<Value>(body) {
        Ok(value) => error_message(&value).unwrap_or_else(fallback),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() { fallback() } else { text }
        }
    };
    ApiError::server(status, message)
}

fn as_envelope(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    let obj = value.as_object()?;
    let has_flag = obj.get("success").is_some_and(Value::is_boolean);
    (has_flag && (obj.contains_key("data") || obj.contains_key("error"))).then_some(obj)
}

fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    envelope: &serde_json::Map<String, Value>,
) -> ApiResponse<T> {
    let timestamp = envelope
        .get("timestamp")
        .and_then(|t| serde_json::from_value::<DateTime<Utc>>(t.clone()).ok())
        .unwrap_or_else(Utc::now);

    let success = envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !success {
        let error = envelope
            .get("error")
            .map(|e| envelope_error(status, e))
            .unwrap_or_else(|| ApiError::server(status, "request failed"));
        return ApiResponse {
            timestamp,
            ..ApiResponse::failure(error)
        };
    }

    let data = envelope.get("data").cloned().unwrap_or(Value::Null);
    let decoded = match serde_json::from_value::<T>(data.clone()) {
        Ok(v) => Ok(v),
        // `{success, data: [...], meta}` puts pagination beside the data.
        Err(e) => match envelope.get("meta") {
            Some(meta) => serde_json::from_value::<T>(serde_json::json!({
                "data": data,
                "meta": meta,
            })),
            None => Err(e),
        },
    };

    match decoded {
        Ok(data) => ApiResponse {
            timestamp,
            ..ApiResponse::ok(data)
        },
        Err(e) => ApiResponse::failure(ApiError::invalid_response(e.to_string())),
    }
}

fn decode_value<T: DeserializeOwned>(value: Value) -> ApiResponse<T> {
    match serde_json::from_value::<T>(value) {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::failure(ApiError::invalid_response(e.to_string())),
    }
}

fn envelope_error(status: u16, error: &Value) -> ApiError {
    match error {
        Value::String(message) => ApiError::server(status, message.clone()),
        Value::Object(obj) => ApiError {
            code: obj
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or(codes::SERVER_ERROR)
                .to_string(),
            message: obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string(),
            status_code: obj
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .or(Some(status)),
        },
        _ => ApiError::server(status, "request failed"),
    }
}

fn error_message(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if let Some(error) = obj.get("error") {
        match error {
            Value::String(s) => return Some(s.clone()),
            Value::Object(e) => {
                if let Some(m) = e.get("message").and_then(Value::as_str) {
                    return Some(m.to_string());
                }
            }
            _ => {}
        }
    }
    match obj.get("message")? {
        Value::String(s) => Some(s.clone()),
        // Validation pipes sometimes send a list of messages.
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Thing {
        id: String,
    }

    fn body(v: Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn raw_and_enveloped_bodies_normalize_the_same() {
        let raw: ApiResponse<Thing> = decode_success(200, &body(json!({ "id": "a" })));
        let wrapped: ApiResponse<Thing> =
            decode_success(200, &body(json!({ "success": true, "data": { "id": "a" } })));

        assert_eq!(raw.into_result().unwrap(), Thing { id: "a".into() });
        assert_eq!(wrapped.into_result().unwrap(), Thing { id: "a".into() });
    }

    #[test]
    fn unsuccessful_envelope_keeps_its_error() {
        let resp: ApiResponse<Thing> = decode_success(
            200,
            &body(json!({
                "success": false,
                "error": { "code": "TARIFF_EXISTS", "message": "Tarif déjà configuré" }
            })),
        );
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, "TARIFF_EXISTS");
        assert_eq!(err.message, "Tarif déjà configuré");
        assert_eq!(err.status_code, Some(200));
    }

    #[test]
    fn undecodable_success_is_invalid_response() {
        let resp: ApiResponse<Thing> = decode_success(200, b"<html>gateway</html>");
        assert_eq!(resp.into_result().unwrap_err().code, codes::INVALID_RESPONSE);

        let resp: ApiResponse<Thing> = decode_success(200, &body(json!({ "name": "x" })));
        assert_eq!(resp.into_result().unwrap_err().code, codes::INVALID_RESPONSE);
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let resp: ApiResponse<()> = decode_success(204, b"");
        assert!(resp.success);
        assert!(resp.into_unit_result().is_ok());
    }

    #[test]
    fn pagination_beside_data_is_accepted() {
        let resp: ApiResponse<PaginatedResponse<Thing>> = decode_success(
            200,
            &body(json!({
                "success": true,
                "data": [{ "id": "a" }, { "id": "b" }],
                "meta": { "page": 1, "limit": 20, "total": 2, "totalPages": 1,
                          "hasNext": false, "hasPrev": false }
            })),
        );
        let page = resp.into_result().unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total, 2);
    }

    #[test]
    fn failure_message_is_read_from_common_shapes() {
        let nested = decode_failure(409, Some("Conflict"), &body(json!({
            "error": { "message": "Email déjà utilisé" }
        })));
        assert_eq!(nested.message, "Email déjà utilisé");
        assert_eq!(nested.status_code, Some(409));
        assert_eq!(nested.code, codes::SERVER_ERROR);

        let list = decode_failure(400, None, &body(json!({
            "message": ["email must be an email", "password too short"]
        })));
        assert_eq!(list.message, "email must be an email, password too short");

        let text = decode_failure(502, Some("Bad Gateway"), b"upstream down");
        assert_eq!(text.message, "upstream down");

        let empty = decode_failure(503, Some("Service Unavailable"), b"");
        assert_eq!(empty.message, "Service Unavailable");
    }
}
