//! Shared fixtures: a real-space Gaussian-weighted moment engine and a
//! synthetic exposure builder.
//!
//! The fixture engine stands in for the external shapelet engine. It computes
//! simple weighted moments, which is enough to verify that the adapter feeds
//! it the right arrays and copies rows into the right columns.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fpfsmeas::{
    EngineOutput, EngineSchema, Exposure, FpfsError, FpfsPeak, FpfsResult, GaussianPsf,
    ImageView, MaskImage, MomentEngine, MomentRow, OwnedImage, STAMP_SHAPE,
};

pub const ENGINE_COLUMNS: [&str; 7] = ["m00", "m20", "m22c", "m22s", "m40", "m42c", "m42s"];

/// Gaussian-weighted real-space moment engine.
pub struct GaussianMomentEngine {
    schema: EngineSchema,
    sigma_px: f64,
    peak_log: Option<Rc<RefCell<Vec<FpfsPeak>>>>,
}

impl GaussianMomentEngine {
    pub fn new(sigma_px: f64) -> Self {
        Self {
            schema: EngineSchema::new(1, &ENGINE_COLUMNS),
            sigma_px,
            peak_log: None,
        }
    }

    /// Records every peak handed to the engine into the shared log.
    pub fn with_peak_log(mut self, log: Rc<RefCell<Vec<FpfsPeak>>>) -> Self {
        self.peak_log = Some(log);
        self
    }

    fn moments_at(&self, img: ImageView<'_, f32>, x0: i32, y0: i32) -> FpfsResult<MomentRow> {
        let width = img.width() as i64;
        let height = img.height() as i64;
        if i64::from(x0) < 0
            || i64::from(y0) < 0
            || i64::from(x0) >= width
            || i64::from(y0) >= height
        {
            return Err(FpfsError::Engine {
                reason: format!("peak ({x0}, {y0}) outside the {width}x{height} array"),
            });
        }

        let two_sigma2 = 2.0 * self.sigma_px * self.sigma_px;
        let mut m = [0.0f64; 7];
        for y in 0..img.height() {
            let row = img.row(y).expect("row within bounds");
            for (x, &pixel) in row.iter().enumerate() {
                let u = x as f64 - f64::from(x0);
                let v = y as f64 - f64::from(y0);
                let r2 = u * u + v * v;
                let wi = f64::from(pixel) * (-r2 / two_sigma2).exp();
                let s = r2 / two_sigma2;
                let e1 = (u * u - v * v) / two_sigma2;
                let e2 = 2.0 * u * v / two_sigma2;
                m[0] += wi;
                m[1] += wi * s;
                m[2] += wi * e1;
                m[3] += wi * e2;
                m[4] += wi * s * s;
                m[5] += wi * s * e1;
                m[6] += wi * s * e2;
            }
        }
        Ok(MomentRow(m.to_vec()))
    }
}

impl MomentEngine for GaussianMomentEngine {
    fn schema(&self) -> &EngineSchema {
        &self.schema
    }

    fn run_single_psf(
        &self,
        gal: ImageView<'_, f32>,
        psf: ImageView<'_, f32>,
        peaks: &[FpfsPeak],
        noise: Option<ImageView<'_, f32>>,
    ) -> FpfsResult<EngineOutput> {
        // The adapter normalizes every PSF stamp before the call.
        if (psf.height(), psf.width()) != STAMP_SHAPE {
            return Err(FpfsError::Engine {
                reason: format!("unexpected PSF stamp shape {}x{}", psf.height(), psf.width()),
            });
        }
        if let Some(log) = &self.peak_log {
            log.borrow_mut().extend_from_slice(peaks);
        }

        let mut source = Vec::with_capacity(peaks.len());
        for peak in peaks {
            source.push(self.moments_at(gal, peak.x, peak.y)?);
        }
        let noise_rows = match noise {
            Some(noise_img) => {
                let mut rows = Vec::with_capacity(peaks.len());
                for peak in peaks {
                    rows.push(self.moments_at(noise_img, peak.x, peak.y)?);
                }
                Some(rows)
            }
            None => None,
        };
        Ok(EngineOutput {
            source,
            noise: noise_rows,
        })
    }
}

/// Renders an elliptical Gaussian source with second moments
/// `(ixx, iyy, ixy)` onto a zero background.
pub fn gaussian_galaxy(
    width: usize,
    height: usize,
    flux: f64,
    center: (f64, f64),
    ixx: f64,
    iyy: f64,
    ixy: f64,
) -> OwnedImage<f32> {
    let det = ixx * iyy - ixy * ixy;
    let norm = flux / (2.0 * std::f64::consts::PI * det.sqrt());
    OwnedImage::from_fn(width, height, |x, y| {
        let u = x as f64 - center.0;
        let v = y as f64 - center.1;
        let q = (iyy * u * u - 2.0 * ixy * u * v + ixx * v * v) / det;
        (norm * (-0.5 * q).exp()) as f32
    })
    .expect("non-empty galaxy image")
}

pub const MASK_PLANES: [&str; 3] = ["BAD", "SAT", "CR"];

/// A 100x100 exposure holding one Gaussian source at (50, 50) with
/// `ixx = iyy = 2.0`, `ixy = 0.5`, and a Gaussian PSF attached.
pub fn simple_exposure() -> Exposure {
    let image = gaussian_galaxy(100, 100, 300000.0, (50.0, 50.0), 2.0, 2.0, 0.5);
    let mask = MaskImage::new(100, 100, &MASK_PLANES).expect("mask allocation");
    Exposure::new(image, mask)
        .expect("matching image and mask shapes")
        .with_psf(Box::new(GaussianPsf::new(1.2, 21).expect("valid psf")))
}
