//! Image processing for the post-creation pipeline: base64/image decoding
//! and the square-crop transform.

pub mod codec;
pub mod crop;

pub use codec::{decode_base64, decode_image, encode_image, DecodedImage};
pub use crop::crop_to_square;

/// Failures while turning an inbound payload into a stored square image.
///
/// Display strings for the first three variants are part of the wire contract:
/// they end up verbatim in the fallen-task collection.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("invalid base64 padding")]
    InvalidBase64Padding,

    #[error("bytes are not an image")]
    BytesAreNotAnImage,

    #[error("invalid image")]
    InvalidImage,

    #[error("image encoding failed: {0}")]
    Encode(String),
}
