use crate::error::PantryError;
use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose},
};

/// The only transfer prefix accepted for uploads.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Standard alphabet, padding optional on decode. Browsers always pad, hand-built clients may not.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a `data:image/png;base64,...` string into raw PNG bytes.
///
/// Only the prefix is checked; the bytes are not inspected for a PNG signature.
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, PantryError> {
    let Some(payload) = data_url.strip_prefix(PNG_DATA_URL_PREFIX) else {
        return Err(PantryError::UnsupportedFormat);
    };

    let payload = payload.trim_ascii();
    if payload.is_empty() {
        return Err(PantryError::EmptyImage);
    }

    Ok(LENIENT_STANDARD.decode(payload)?)
}

/// Encode raw PNG bytes as a data URL, the inverse of [`decode_png_data_url`].
pub fn encode_png_data_url(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(PNG_DATA_URL_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    out.push_str(PNG_DATA_URL_PREFIX);
    general_purpose::STANDARD.encode_string(bytes, &mut out);
    out
}
