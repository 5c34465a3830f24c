//! Base64 and image decoding.
//!
//! Payloads cross the HTTP boundary as base64 text. The alphabet/padding check
//! happens before any image interpretation so the two failure modes stay
//! distinguishable to the status consumer.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::ProcessingError;

/// A decoded pixel buffer plus the source format it arrived in.
/// The format drives the extension of the stored file.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.image.dimensions().1
    }

    /// Preferred file extension for the source format, e.g. "png".
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Strictly decode a base64 payload. Rejects invalid alphabet characters and
/// malformed 4-byte padding.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, ProcessingError> {
    STANDARD
        .decode(text)
        .map_err(|_| ProcessingError::InvalidBase64Padding)
}

/// Interpret raw bytes as an image, guessing the format from magic bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ProcessingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| ProcessingError::BytesAreNotAnImage)?;
    let format = reader.format().ok_or(ProcessingError::BytesAreNotAnImage)?;
    let image = reader
        .decode()
        .map_err(|_| ProcessingError::BytesAreNotAnImage)?;
    Ok(DecodedImage { image, format })
}

/// Re-encode a pixel buffer in the given format.
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ProcessingError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), format)
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;
    Ok(buffer)
}
