use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, RgbImage};

use crate::{
    error::{Result, TryOnError},
    models::{estimated_decoded_len, EncodedImage},
};

/// Maps a 0.0-1.0 quality onto the encoder's 1-100 scale.
pub fn encoder_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

pub fn encode_jpeg_base64(surface: &RgbImage, quality: f32) -> Result<String> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, encoder_quality(quality));
    surface
        .write_with_encoder(encoder)
        .map_err(|e| TryOnError::InternalError(format!("JPEG encode failed: {}", e)))?;
    Ok(STANDARD.encode(&buf))
}

/// Walks the ladder from highest quality down and keeps the first candidate
/// whose decoded size fits under `max_bytes`.
pub fn encode_within_ceiling(
    surface: &RgbImage,
    ladder: &[f32],
    max_bytes: usize,
) -> Result<(EncodedImage, f32)> {
    let mut smallest = usize::MAX;

    for &quality in ladder {
        let data = encode_jpeg_base64(surface, quality)?;
        let size = estimated_decoded_len(data.len());
        log::debug!(
            "JPEG candidate at quality {:.2}: {} bytes (limit {})",
            quality,
            size,
            max_bytes
        );
        if size <= max_bytes {
            return Ok((EncodedImage::jpeg(data), quality));
        }
        smallest = smallest.min(size);
    }

    Err(TryOnError::ImageTooLarge {
        smallest: if ladder.is_empty() { 0 } else { smallest },
        limit: max_bytes,
    })
}
