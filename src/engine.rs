//! The moment-engine boundary.
//!
//! The shapelet decomposition itself lives in an external engine; this crate
//! only prepares its inputs and copies its outputs. [`MomentEngine`] is the
//! seam, and [`EngineSchema`] is the versioned column contract that replaces
//! the engine's internal name-to-index mapping: plugins snapshot it at
//! construction and check every returned row against it.

use serde::{Deserialize, Serialize};

use crate::peak::FpfsPeak;
use crate::stamp::ImageView;
use crate::util::{FpfsError, FpfsResult};

/// Truncation scale handed to the engine. Placeholder until the engine can
/// derive it from the PSF image.
pub const DEFAULT_KMAX: f64 = 3.05;

/// Detection rotation modes disabled.
pub const DET_NROT_DISABLED: i32 = -1;

/// Versioned column contract published by an engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSchema {
    /// Contract version; bumped whenever the column set changes.
    pub version: u32,
    /// Column names in row order, e.g. `m00`, `m22c`, `m22s`, `m40`.
    pub columns: Vec<String>,
}

impl EngineSchema {
    /// Creates a schema from a column list.
    pub fn new(version: u32, columns: &[&str]) -> Self {
        Self {
            version,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Returns the row index of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of columns per row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One row of moment values, ordered by the engine schema's columns.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentRow(pub Vec<f64>);

impl MomentRow {
    /// Number of values in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value at a column index.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

/// Engine output for one invocation: one source row per input peak and,
/// when a noise realization was supplied, a parallel pure-noise row set.
#[derive(Clone, Debug, Default)]
pub struct EngineOutput {
    /// Moments measured from the science image.
    pub source: Vec<MomentRow>,
    /// Moments measured from pure noise, for noise-bias correction.
    pub noise: Option<Vec<MomentRow>>,
}

/// Parameters the adapter hands to an engine implementation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineParams {
    /// Maximum radial shapelet order (4 or 6).
    pub n_order: u32,
    /// Shapelet Gaussian kernel size in arcsec.
    pub sigma_arcsec: f64,
    /// Pixel scale of the image in arcsec per pixel.
    pub pixel_scale: f64,
    /// Magnitude zero point of the image.
    pub mag_zero: f64,
    /// Fourier truncation scale.
    pub kmax: f64,
    /// Number of detection rotation modes; negative disables detection.
    pub det_nrot: i32,
}

/// External moment-measurement engine.
///
/// Implementations receive the full science array, a PSF stamp already
/// normalized to the fixed engine shape, one peak record per source, and an
/// optional pure-noise realization of the same shape as the science array.
pub trait MomentEngine {
    /// The column contract for rows returned by [`MomentEngine::run_single_psf`].
    fn schema(&self) -> &EngineSchema;

    /// Measures moments at each peak, assuming one PSF for the whole array.
    fn run_single_psf(
        &self,
        gal: ImageView<'_, f32>,
        psf: ImageView<'_, f32>,
        peaks: &[FpfsPeak],
        noise: Option<ImageView<'_, f32>>,
    ) -> FpfsResult<EngineOutput>;
}

/// Checks a row against the contract the plugin snapshotted.
pub(crate) fn check_row(schema: &EngineSchema, row: &MomentRow) -> FpfsResult<()> {
    if row.len() != schema.len() {
        return Err(FpfsError::EngineMismatch {
            expected: schema.len(),
            got: row.len(),
        });
    }
    Ok(())
}
