//! Sharing
//!
//! A bill travels between devices as one opaque string: the JSON form of
//! [`SharedState`], base64 encoded, carried in the `data` query parameter.

use base64::{Engine as _, prelude::BASE64_STANDARD};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{bill::Bill, uri::encode_component};

/// Query parameter that carries the encoded state.
pub const QUERY_PARAMETER: &str = "data";

/// Errors raised while encoding shared state.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The state could not be serialized.
    #[error("failed to serialize shared state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a friend needs to work out their share, plus who to pay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    /// The bill being split
    #[serde(flatten)]
    pub bill: Bill,

    /// Payee handle for the payment link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venmo_username: Option<String>,
}

impl SharedState {
    /// Wraps a bill with an optional payee.
    pub fn new(bill: Bill, venmo_username: Option<String>) -> Self {
        Self {
            bill,
            venmo_username,
        }
    }

    /// Encodes the state as base64 JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String, ShareError> {
        let json = serde_json::to_string(self)?;

        Ok(BASE64_STANDARD.encode(json))
    }

    /// Decodes state produced by [`SharedState::encode`].
    ///
    /// Malformed input means there is no shared state, so this returns `None`
    /// rather than an error. Items without an id are given one.
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .inspect_err(|error| debug!(%error, "shared state is not valid base64"))
            .ok()?;

        let mut state: Self = serde_json::from_slice(&bytes)
            .inspect_err(|error| debug!(%error, "shared state is not valid JSON"))
            .ok()?;

        state.bill.ensure_item_ids();

        Some(state)
    }

    /// Finds and decodes the `data` parameter of a URL query string.
    ///
    /// Accepts the query with or without its leading `?`.
    pub fn from_query(query: &str) -> Option<Self> {
        let value = query
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| {
                pair.split_once('=')
                    .filter(|(key, _)| *key == QUERY_PARAMETER)
                    .map(|(_, value)| value)
            })?;

        let encoded = percent_decode_str(value)
            .decode_utf8()
            .inspect_err(|error| debug!(%error, "shared state is not valid UTF-8"))
            .ok()?;

        Self::decode(&encoded)
    }

    /// Builds a link to `base` carrying this state.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Json`] if serialization fails.
    pub fn share_url(&self, base: &str) -> Result<String, ShareError> {
        let encoded = self.encode()?;

        Ok(format!(
            "{base}?{QUERY_PARAMETER}={}",
            encode_component(&encoded)
        ))
    }
}
