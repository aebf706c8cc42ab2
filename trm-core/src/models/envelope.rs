//! API response envelope normalization.
//!
//! The REST backend wraps every payload as `{ success, data }`, sometimes
//! nesting the actual list one level deeper (`data.data`, `data.items`,
//! `data.referrals`, ...). Everything is validated here, once, before it
//! reaches the engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::metrics::MetricSample;
use crate::error::CoreError;

/// Keys under which list endpoints nest their records.
const LIST_KEYS: &[&str] = &["data", "items", "results", "referrals", "jobs", "payouts"];

/// Error body returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error category (e.g., "api_error").
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// The `{ success, data, error }` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Api` when `success` is false and
    /// `CoreError::InvalidData` when a successful response has no data.
    pub fn into_result(self) -> Result<T, CoreError> {
        if !self.success {
            return Err(api_error(self.error.unwrap_or_default()));
        }
        self.data
            .ok_or_else(|| CoreError::InvalidData("successful response without data".into()))
    }
}

fn api_error(body: ApiErrorBody) -> CoreError {
    let message = if body.message.is_empty() {
        "request failed".to_string()
    } else {
        body.message
    };
    CoreError::Api {
        message,
        code: body.code,
    }
}

/// Strips the envelope from a raw response, if there is one.
///
/// A JSON object carrying a boolean `success` is treated as an envelope;
/// anything else is returned as-is.
///
/// # Errors
///
/// Propagates the envelope's error when `success` is false.
pub fn unwrap_envelope(value: &Value) -> Result<&Value, CoreError> {
    let Some(obj) = value.as_object() else {
        return Ok(value);
    };
    let Some(success) = obj.get("success").and_then(Value::as_bool) else {
        return Ok(value);
    };
    if !success {
        let body: ApiErrorBody = obj
            .get("error")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();
        return Err(api_error(body));
    }
    obj.get("data")
        .ok_or_else(|| CoreError::InvalidData("successful response without data".into()))
}

/// Parses a typed payload, with or without an envelope.
///
/// # Errors
///
/// Returns the envelope error, or `CoreError::Serialization` when the
/// payload does not match `T`.
pub fn parse_payload<T: DeserializeOwned>(value: &Value) -> Result<T, CoreError> {
    let payload = unwrap_envelope(value)?;
    Ok(T::deserialize(payload)?)
}

/// Extracts metric samples from any of the list shapes the API returns.
///
/// # Errors
///
/// Returns `CoreError::InvalidData` when no record array can be found and
/// `CoreError::Serialization` when a record is malformed.
pub fn parse_samples(value: &Value) -> Result<Vec<MetricSample>, CoreError> {
    let payload = unwrap_envelope(value)?;
    let list = find_list(payload).ok_or_else(|| {
        CoreError::InvalidData("response does not contain a record list".into())
    })?;

    let samples = list
        .iter()
        .map(MetricSample::deserialize)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = samples.len(), "Parsed metric samples");
    Ok(samples)
}

fn find_list(value: &Value) -> Option<&Vec<Value>> {
    if let Some(list) = value.as_array() {
        return Some(list);
    }
    let obj = value.as_object()?;
    LIST_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
}

// ============================================================================
// Tests
// ============================================================================
