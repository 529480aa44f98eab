// SPDX-License-Identifier: MPL-2.0

//! Async photo encoding
//!
//! Finished photos and strips are PNG (lossless). Encoding runs on the
//! blocking pool so the render loop keeps ticking.

use crate::errors::PhotoError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Encoded image data ready for download or display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Self-contained `data:image/png;base64,...` URI
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.data))
    }

    /// Decode back into pixels
    pub fn decode(&self) -> Result<RgbaImage, String> {
        decode_png(&self.data)
    }
}

/// Encode pixels as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {}", e))?;
    Ok(buffer)
}

/// Decode PNG bytes into RGBA pixels
pub fn decode_png(data: &[u8]) -> Result<RgbaImage, String> {
    image::load_from_memory_with_format(data, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| format!("PNG decoding failed: {}", e))
}

/// Encode synchronously into an [`EncodedImage`]
pub fn encode_image(image: &RgbaImage) -> Result<EncodedImage, PhotoError> {
    let data = encode_png(image).map_err(PhotoError::EncodingFailed)?;
    debug!(size = data.len(), "Encoding complete");
    Ok(EncodedImage {
        data,
        width: image.width(),
        height: image.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_data_uri_carries_png_payload() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let encoded = encode_image(&image).unwrap();
        assert_eq!((encoded.width, encoded.height), (3, 2));
        let uri = encoded.data_uri();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), encoded.data);
        assert_eq!(encoded.decode().unwrap(), image);
    }

    #[test]
    fn test_rejects_non_png_bytes() {
        assert!(decode_png(b"not a png").is_err());
    }
}
