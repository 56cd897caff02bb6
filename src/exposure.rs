//! Exposure data: science pixels, mask planes, and the PSF model boundary.

use std::collections::HashMap;

use crate::stamp::OwnedImage;
use crate::util::{FpfsError, FpfsResult};

/// Point in floating-point pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer mask image with named bit planes.
///
/// Each plane name maps to one bit; a pixel's value is the OR of the bits of
/// the planes set there.
#[derive(Clone, Debug)]
pub struct MaskImage {
    data: OwnedImage<i32>,
    planes: HashMap<String, u32>,
}

impl MaskImage {
    /// Creates an all-clear mask with the given plane dictionary.
    ///
    /// Plane bit indices follow the order of `plane_names`.
    pub fn new(width: usize, height: usize, plane_names: &[&str]) -> FpfsResult<Self> {
        let data = OwnedImage::zeros(width, height)?;
        let planes = plane_names
            .iter()
            .enumerate()
            .map(|(bit, name)| (name.to_string(), bit as u32))
            .collect();
        Ok(Self { data, planes })
    }

    /// ORs the bits of the named planes into one bitmask.
    pub fn plane_bitmask<S: AsRef<str>>(&self, names: &[S]) -> FpfsResult<i32> {
        let mut mask = 0i32;
        for name in names {
            let bit = self
                .planes
                .get(name.as_ref())
                .ok_or_else(|| FpfsError::UnknownMaskPlane {
                    name: name.as_ref().to_string(),
                })?;
            mask |= 1i32 << bit;
        }
        Ok(mask)
    }

    /// Sets the named plane's bit at a pixel.
    pub fn set_plane_at(&mut self, x: usize, y: usize, name: &str) -> FpfsResult<()> {
        let bit = self
            .planes
            .get(name)
            .ok_or_else(|| FpfsError::UnknownMaskPlane {
                name: name.to_string(),
            })?;
        let value = self.data.get(x, y).unwrap_or(0) | (1i32 << bit);
        self.data.set(x, y, value);
        Ok(())
    }

    /// Returns the bits of `bitmask` set at a pixel; out-of-bounds reads as 0.
    pub fn masked_value_at(&self, x: i64, y: i64, bitmask: i32) -> i32 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.data
            .get(x as usize, y as usize)
            .map(|v| v & bitmask)
            .unwrap_or(0)
    }

    /// Returns the mask width in pixels.
    pub fn width(&self) -> usize {
        self.data.width()
    }

    /// Returns the mask height in pixels.
    pub fn height(&self) -> usize {
        self.data.height()
    }
}

/// Point-spread-function model attached to an exposure.
pub trait PsfModel {
    /// Realizes a PSF postage stamp centered at `center`.
    ///
    /// The stamp shape is model-defined; callers normalize it before handing
    /// it to the moment engine.
    fn compute_image(&self, center: Point2) -> FpfsResult<OwnedImage<f32>>;
}

/// Circular Gaussian PSF model.
pub struct GaussianPsf {
    sigma_px: f64,
    dim: usize,
}

impl GaussianPsf {
    /// Creates a Gaussian PSF with width `sigma_px` realized on `dim` x `dim`
    /// stamps. `dim` must be odd so the stamp has a center pixel.
    pub fn new(sigma_px: f64, dim: usize) -> FpfsResult<Self> {
        if !(sigma_px.is_finite() && sigma_px > 0.0) {
            return Err(FpfsError::InvalidConfig {
                field: "sigma_px",
                reason: format!("must be positive and finite, got {sigma_px}"),
            });
        }
        if dim == 0 || dim % 2 == 0 {
            return Err(FpfsError::InvalidConfig {
                field: "dim",
                reason: format!("stamp dimension must be odd, got {dim}"),
            });
        }
        Ok(Self { sigma_px, dim })
    }
}

impl PsfModel for GaussianPsf {
    fn compute_image(&self, center: Point2) -> FpfsResult<OwnedImage<f32>> {
        let half = (self.dim / 2) as f64;
        // The stamp center tracks the sub-pixel part of the requested point.
        let cx = half + (center.x - center.x.round());
        let cy = half + (center.y - center.y.round());
        let inv_two_sigma2 = 1.0 / (2.0 * self.sigma_px * self.sigma_px);

        let mut img = OwnedImage::from_fn(self.dim, self.dim, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            (-(dx * dx + dy * dy) * inv_two_sigma2).exp() as f32
        })?;
        let total: f64 = img.data().iter().map(|&v| f64::from(v)).sum();
        if total > 0.0 {
            let norm = (1.0 / total) as f32;
            for y in 0..self.dim {
                for x in 0..self.dim {
                    let v = img.get(x, y).unwrap_or(0.0);
                    img.set(x, y, v * norm);
                }
            }
        }
        Ok(img)
    }
}

/// One exposure's worth of measurement inputs.
pub struct Exposure {
    image: OwnedImage<f32>,
    mask: MaskImage,
    noise: Option<OwnedImage<f32>>,
    psf: Option<Box<dyn PsfModel>>,
}

impl Exposure {
    /// Creates an exposure from science pixels and a mask of the same shape.
    pub fn new(image: OwnedImage<f32>, mask: MaskImage) -> FpfsResult<Self> {
        if image.width() != mask.width() || image.height() != mask.height() {
            return Err(FpfsError::LengthMismatch {
                context: "exposure image vs mask",
                left: image.width() * image.height(),
                right: mask.width() * mask.height(),
            });
        }
        Ok(Self {
            image,
            mask,
            noise: None,
            psf: None,
        })
    }

    /// Attaches a PSF model.
    pub fn with_psf(mut self, psf: Box<dyn PsfModel>) -> Self {
        self.psf = Some(psf);
        self
    }

    /// Attaches a pure-noise realization image.
    pub fn with_noise(mut self, noise: OwnedImage<f32>) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Returns the science image.
    pub fn image(&self) -> &OwnedImage<f32> {
        &self.image
    }

    /// Returns the mask image.
    pub fn mask(&self) -> &MaskImage {
        &self.mask
    }

    /// Returns the noise realization, if attached.
    pub fn noise(&self) -> Option<&OwnedImage<f32>> {
        self.noise.as_ref()
    }

    /// Returns the attached PSF model, if any.
    pub fn psf(&self) -> Option<&dyn PsfModel> {
        self.psf.as_deref()
    }
}
