// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Response-shape normalization
//!
//! Nodes wrap collections differently: a bare array, an array under a named
//! field, or an object keyed by id. Each [`Extraction`] recognises one of
//! those envelopes; operations list them in priority order and the first
//! match wins.

use api_client::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// One way of locating the records inside a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The body itself is an array
    DirectArray,
    /// The body is an object holding the array under this field
    NamedArray(&'static str),
    /// The body is an object whose values are the records
    ObjectValues,
}

impl Extraction {
    /// Locate the records, or `None` when the body does not have this shape
    pub fn apply(self, raw: &Value) -> Option<Vec<Value>> {
        match self {
            Self::DirectArray => raw.as_array().cloned(),
            Self::NamedArray(field) => raw.get(field)?.as_array().cloned(),
            Self::ObjectValues => {
                let records: Vec<Value> = raw
                    .as_object()?
                    .values()
                    .filter(|value| value.is_object())
                    .cloned()
                    .collect();
                (!records.is_empty()).then_some(records)
            }
        }
    }
}

/// Run `strategies` in order and return the first match, or an empty sequence
pub fn extract_records(strategies: &[Extraction], raw: &Value) -> Vec<Value> {
    strategies
        .iter()
        .find_map(|strategy| strategy.apply(raw))
        .unwrap_or_default()
}

/// Extract and decode records, skipping the ones that do not decode
pub fn decode_records<T: DeserializeOwned>(
    operation: &str,
    strategies: &[Extraction],
    raw: &Value,
) -> Vec<T> {
    extract_records(strategies, raw)
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(operation, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect()
}

/// Decode a single-object response
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the body is not an object of
/// the expected shape
pub fn decode_object<T: DeserializeOwned>(raw: Value) -> Result<T, ApiError> {
    if !raw.is_object() {
        return Err(ApiError::malformed(format!("expected an object, got {raw}")));
    }
    serde_json::from_value(raw).map_err(|e| ApiError::malformed(e.to_string()))
}

/// Decode a single-entity lookup, normalizing absence to `None`
///
/// `null`, an empty object and an `{ "error": ... }` envelope all mean the
/// entity does not exist.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when a present entity does not decode
pub fn decode_entity<T: DeserializeOwned>(raw: Value) -> Result<Option<T>, ApiError> {
    match &raw {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() || map.contains_key("error") => Ok(None),
        _ => decode_object(raw).map(Some),
    }
}
