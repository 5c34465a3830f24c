//! Square center-crop with proportional upscale.
//!
//! Normalizes any even-dimensioned image to `target x target`:
//! identity when already at target, integer nearest-neighbour upscale when a
//! side is smaller than target, then an exact `target x target` window around
//! the geometric center.
//!
//! Odd source dimensions are rejected. That restriction comes from the
//! midpoint arithmetic of the system this replaces, not from a product rule;
//! it is preserved as observable behavior.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::ProcessingError;

/// Crop `image` to a `target x target` square.
///
/// Preconditions: both dimensions even, `target >= 1`.
/// Postcondition: output is exactly `target x target`.
/// Idempotent for even `target`: a second pass hits the identity fast path.
/// For odd `target` the window sits one pixel toward the top-left of the true
/// center (integer division of the half-side).
pub fn crop_to_square(image: DynamicImage, target: u32) -> Result<DynamicImage, ProcessingError> {
    let (width, height) = image.dimensions();
    if width % 2 != 0 || height % 2 != 0 {
        return Err(ProcessingError::InvalidImage);
    }
    if width == target && height == target {
        return Ok(image);
    }

    let image = if width < target || height < target {
        increase_proportionally(&image, target / width.min(height) + 1)
    } else {
        image
    };

    let (width, height) = image.dimensions();
    let x = width / 2 - target / 2;
    let y = height / 2 - target / 2;
    Ok(image.crop_imm(x, y, target, target))
}

/// Scale both axes by the same integer factor. Nearest-neighbour keeps the
/// upscale exact, which keeps the crop idempotent pixel-for-pixel.
fn increase_proportionally(image: &DynamicImage, factor: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    image.resize_exact(width * factor, height * factor, FilterType::Nearest)
}
