//! CSRF key decoding

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// Length in bytes of a decoded CSRF key.
pub const CSRF_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrfKeyError {
    #[error("error decoding CSRF_AUTH_KEY: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("CSRF_AUTH_KEY is not {CSRF_KEY_LEN} bytes, got: {0}")]
    Length(usize),
}

/// Decode base64 in any of the standard or URL alphabets, padded or not.
fn decode_any(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = encoded.trim();
    URL_SAFE
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .or_else(|_| STANDARD.decode(encoded))
}

pub(crate) fn decode_key(encoded: &str) -> Result<[u8; CSRF_KEY_LEN], CsrfKeyError> {
    let bytes = decode_any(encoded)?;
    <[u8; CSRF_KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| CsrfKeyError::Length(bytes.len()))
}
