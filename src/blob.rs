//! URL-safe text form of encoded bytes.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::DecodeError;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Encode bytes as unpadded URL-safe base64
#[must_use]
pub fn encode_text(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a blob written in either base64 alphabet, padded or not.
///
/// Blanks are read as `+`, which is what a standard-alphabet blob turns
/// into after passing through form decoding.
///
/// # Errors
/// Returns [`DecodeError::InvalidText`] if the text is not base64.
pub fn decode_text(text: &str) -> Result<Vec<u8>, DecodeError> {
    let text = text.trim().replace(' ', "+");
    let engine = if text.contains(['+', '/']) {
        &STANDARD_LENIENT
    } else {
        &URL_SAFE_LENIENT
    };
    Ok(engine.decode(text)?)
}
