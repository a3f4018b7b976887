use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose};
use image::RgbImage;

/// Decodes a base64 image, optionally wrapped as a `data:<mime>;base64,` URI,
/// into an 8-bit RGB buffer.
pub fn decode_image_data(image_data: &str) -> Result<RgbImage> {
    let payload = strip_data_uri(image_data);
    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if payload.is_empty() {
        return Err(Error::invalid_input("empty image payload"));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| Error::invalid_input(format!("base64: {e}")))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| Error::invalid_input(format!("image: {e}")))?;

    Ok(image.to_rgb8())
}

/// Everything after the first comma, or the whole string when there is none.
fn strip_data_uri(image_data: &str) -> &str {
    match image_data.split_once(',') {
        Some((_, payload)) => payload,
        None => image_data,
    }
}
