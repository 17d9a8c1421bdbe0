//! Artifact identifiers.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Random bytes per generated identifier. 8 bytes keeps URLs short
/// (11 characters) while an expected collision needs ~2^32 uploads.
const ID_BYTES: usize = 8;

/// Longest identifier accepted on the read path.
const MAX_ID_LEN: usize = 32;

/// Unique identifier for one intensified artifact.
///
/// Identifiers double as storage keys and URL path segments, so the
/// accepted alphabet is locked to base64url characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Generate a new random identifier.
    ///
    /// Uses the thread-local CSPRNG; identifiers must be unguessable
    /// since knowing one is enough to fetch the artifact.
    pub fn generate() -> Self {
        let bytes: [u8; ID_BYTES] = rand::rng().random();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parse an identifier received from the outside (URL path, storage key).
    pub fn parse(s: &str) -> Result<Self, InvalidImageId> {
        if s.is_empty() || s.len() > MAX_ID_LEN {
            return Err(InvalidImageId(s.to_string()));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidImageId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
#[error("Invalid image id: {0:?}")]
pub struct InvalidImageId(String);
