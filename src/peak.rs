//! Fixed-layout peak records consumed by the moment engine.

use serde::{Deserialize, Serialize};

use crate::util::{FpfsError, FpfsResult};

/// Detected-source peak in the engine's wire layout.
///
/// Field order is fixed: `(y, x, is_peak, mask_value)`. Coordinates are not
/// bounds-checked here; out-of-range values pass through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpfsPeak {
    /// Peak row (y pixel coordinate).
    pub y: i32,
    /// Peak column (x pixel coordinate).
    pub x: i32,
    /// True peak (1) or artifact (0).
    pub is_peak: i32,
    /// Bad-plane mask bits at the peak pixel; 0 when unmasked.
    pub mask_value: i32,
}

impl FpfsPeak {
    /// Creates a peak with the defaults `is_peak = 1`, `mask_value = 0`.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            y,
            x,
            is_peak: 1,
            mask_value: 0,
        }
    }

    /// Replaces the mask bits carried by the peak.
    pub fn with_mask_value(mut self, mask_value: i32) -> Self {
        self.mask_value = mask_value;
        self
    }
}

/// Packages parallel coordinate slices into one peak record per pair.
pub fn make_peaks(xs: &[i32], ys: &[i32]) -> FpfsResult<Vec<FpfsPeak>> {
    if xs.len() != ys.len() {
        return Err(FpfsError::LengthMismatch {
            context: "peak coordinates",
            left: xs.len(),
            right: ys.len(),
        });
    }
    Ok(xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| FpfsPeak::new(x, y))
        .collect())
}
