//! Response envelopes and failure classification.
//!
//! The Movies API answers with one of these JSON shapes:
//!
//! - `{ "status": 200, "data": ... }` on success;
//! - `{ "status": 200, "message": "..." }` when confirming a deletion;
//! - `{ "error": "..." }` or `{ "status": 404, "error": "..." }` on failure;
//! - `{ "status": 404, "message": "..." }` for some not-found responses.
//!
//! Every shape is folded into [`ApiResponse`], so callers match on two
//! variants instead of probing for fields.

use reqwest::StatusCode;
use movies_core::Movie;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Outcome of one call against the Movies API.
///
/// Serializes back to the server's own shapes: `{status, data}`,
/// `{status, message}` for a delete, or `{status, error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, bound(serialize = "T: Payload"))]
pub enum ApiResponse<T> {
    Success(Success<T>),
    Failure(ApiError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Success<T> {
    pub status: u16,
    pub data: T,
}

/// A success payload and where it sits in the envelope.
pub trait Payload: Serialize {
    /// `true` merges the payload's fields next to `status` instead of
    /// nesting them under `data`.
    const FLATTEN: bool = false;
}

impl Payload for Movie {}

impl<T: Payload> Payload for Vec<T> {}

impl Payload for DeleteConfirmation {
    const FLATTEN: bool = true;
}

#[derive(Serialize)]
struct Nested<'a, T> {
    status: u16,
    data: &'a T,
}

#[derive(Serialize)]
struct Flat<'a, T> {
    status: u16,
    #[serde(flatten)]
    data: &'a T,
}

impl<T: Payload> Serialize for Success<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (status, data) = (self.status, &self.data);
        if T::FLATTEN {
            Flat { status, data }.serialize(serializer)
        } else {
            Nested { status, data }.serialize(serializer)
        }
    }
}

/// Failure reported by the server (or a response that could not be understood).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{status}: {error}")]
pub struct ApiError {
    pub status: u16,
    pub error: String,
}

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success(s) => s.status,
            Self::Failure(e) => e.status,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(s) => Some(&s.data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<Success<T>, ApiError> {
        match self {
            Self::Success(s) => Ok(s),
            Self::Failure(e) => Err(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Success(s) => ApiResponse::Success(Success {
                status: s.status,
                data: f(s.data),
            }),
            Self::Failure(e) => ApiResponse::Failure(e),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireBody {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Decode a `{status, data}` body into `T`.
pub fn decode_data<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ApiResponse<T> {
    decode_with(status, body, |wire| {
        let data = wire
            .data
            .ok_or_else(|| "response body has no `data` field".to_string())?;
        serde_json::from_value(data).map_err(|e| format!("unexpected `data` shape: {e}"))
    })
}

/// Decode a `{status, message}` deletion confirmation.
pub fn decode_confirmation(status: StatusCode, body: &[u8]) -> ApiResponse<DeleteConfirmation> {
    decode_with(status, body, |wire| match wire.message {
        Some(Value::String(message)) => Ok(DeleteConfirmation { message }),
        Some(other) => Err(format!("unexpected `message` shape: {other}")),
        None => Err("response body has no `message` field".to_string()),
    })
}

fn decode_with<T>(
    status: StatusCode,
    body: &[u8],
    extract: impl FnOnce(WireBody) -> Result<T, String>,
) -> ApiResponse<T> {
    let code = status.as_u16();

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            let error = if status.is_success() {
                format!("invalid response body: {e}")
            } else {
                non_json_message(status, body)
            };
            return ApiResponse::Failure(ApiError { status: code, error });
        }
    };

    let wire: WireBody = serde_json::from_value(value.clone()).unwrap_or_default();

    if let Some(error) = wire.error.as_ref().filter(|v| !v.is_null()) {
        return ApiResponse::Failure(ApiError {
            status: code,
            error: text_of(error),
        });
    }

    if !status.is_success() {
        let error = match wire.message.as_ref().filter(|v| !v.is_null()) {
            Some(message) => text_of(message),
            None if value.is_object() => reason(status),
            None => text_of(&value),
        };
        return ApiResponse::Failure(ApiError { status: code, error });
    }

    match extract(wire) {
        Ok(data) => ApiResponse::Success(Success { status: code, data }),
        Err(error) => ApiResponse::Failure(ApiError { status: code, error }),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_json_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        reason(status)
    } else {
        text.to_string()
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
