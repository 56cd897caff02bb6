//! Convenience helpers for loading and saving stamps via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::stamp::OwnedImage;
use crate::util::{FpfsError, FpfsResult};
use std::path::Path;

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> FpfsResult<OwnedImage<u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::from_vec(img.as_raw().clone(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> FpfsResult<OwnedImage<u8>> {
    let img = image::open(path).map_err(|err| FpfsError::ImageIo {
        reason: err.to_string(),
    })?;
    let gray = img.to_luma8();
    owned_from_gray_image(&gray)
}

/// Loads a grayscale image as `f32` pixel values in `[0, 255]`.
pub fn load_gray_image_f32<P: AsRef<Path>>(path: P) -> FpfsResult<OwnedImage<f32>> {
    let gray = load_gray_image(path)?;
    let data = gray.data().iter().map(|&v| f32::from(v)).collect();
    OwnedImage::from_vec(data, gray.width(), gray.height())
}

/// Saves an owned grayscale image to disk; the format follows the extension.
pub fn save_gray_image<P: AsRef<Path>>(img: &OwnedImage<u8>, path: P) -> FpfsResult<()> {
    let buffer = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.data().to_vec(),
    )
    .ok_or(FpfsError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    buffer.save(path).map_err(|err| FpfsError::ImageIo {
        reason: err.to_string(),
    })
}
