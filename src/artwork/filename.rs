use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;

pub const ARTWORK_EXTENSION: &str = "png";

/// Build a filename for a new artwork: `art_<unix-millis>_<token>.png`.
///
/// The millisecond prefix keeps directory listings in creation order; the 64-bit random
/// token (URL-safe base64, so always filesystem-safe) separates same-millisecond uploads.
pub fn generate_filename(now: DateTime<Utc>) -> String {
    let token = random_token::<8>();
    format!(
        "art_{millis}_{token}.{ARTWORK_EXTENSION}",
        millis = now.timestamp_millis()
    )
}

/// `N` random bytes as unpadded URL-safe base64.
pub fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
