//! Text-safe encoding of stored bytes for text-based media.
//!
//! Standard base64 with padding, so values written here stay readable by
//! any base64 implementation.

use crate::error::{PersistError, PersistResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub(crate) fn encode_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes the text stored under `key`; surrounding whitespace is ignored.
pub(crate) fn decode_text(key: &str, text: &str) -> PersistResult<Vec<u8>> {
    STANDARD.decode(text.trim()).map_err(|err| {
        PersistError::InvalidArgument(format!("stored value of `{key}` is not base64: {err}"))
    })
}
