//! Measurement configuration.

use serde::{Deserialize, Serialize};

use crate::engine::{EngineParams, DEFAULT_KMAX, DET_NROT_DISABLED};
use crate::util::{FpfsError, FpfsResult};

/// Configuration of the FPFS measurement plugin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpfsConfig {
    /// Maximum radial number of shapelets. Only 4 and 6 are supported.
    pub n_order: u32,
    /// Shapelet Gaussian kernel size in arcsec.
    pub sigma_arcsec: f64,
    /// Pixel scale of the image in arcsec per pixel.
    pub pixel_scale: f64,
    /// Magnitude zero point of the image.
    pub mag_zero: f64,
    /// Mask planes used to reject bad pixels.
    pub bad_mask_planes: Vec<String>,
    /// Measure from pure noise for noise bias correction.
    pub measure_from_noise: bool,
}

impl Default for FpfsConfig {
    fn default() -> Self {
        Self {
            n_order: 4,
            sigma_arcsec: 0.52,
            pixel_scale: 0.2,
            mag_zero: 30.0,
            bad_mask_planes: vec!["BAD".to_string(), "SAT".to_string()],
            measure_from_noise: false,
        }
    }
}

impl FpfsConfig {
    /// Validates the configuration. Runs synchronously, before any
    /// measurement.
    pub fn validate(&self) -> FpfsResult<()> {
        if self.n_order != 4 && self.n_order != 6 {
            return Err(FpfsError::InvalidConfig {
                field: "n_order",
                reason: format!("only n = 4 or 6 is supported, got {}", self.n_order),
            });
        }
        if !(self.sigma_arcsec.is_finite() && self.sigma_arcsec > 0.0) {
            return Err(FpfsError::InvalidConfig {
                field: "sigma_arcsec",
                reason: format!("must be positive and finite, got {}", self.sigma_arcsec),
            });
        }
        if !(self.pixel_scale.is_finite() && self.pixel_scale > 0.0) {
            return Err(FpfsError::InvalidConfig {
                field: "pixel_scale",
                reason: format!("must be positive and finite, got {}", self.pixel_scale),
            });
        }
        Ok(())
    }

    /// The parameter set handed to the engine at construction time.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            n_order: self.n_order,
            sigma_arcsec: self.sigma_arcsec,
            pixel_scale: self.pixel_scale,
            mag_zero: self.mag_zero,
            kmax: DEFAULT_KMAX,
            det_nrot: DET_NROT_DISABLED,
        }
    }

    /// Kernel size in pixels.
    pub fn sigma_px(&self) -> f64 {
        self.sigma_arcsec / self.pixel_scale
    }
}

#[cfg(test)]
mod tests {
    use super::FpfsConfig;
    use crate::util::FpfsError;

    #[test]
    fn default_config_is_valid() {
        FpfsConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_unsupported_order() {
        for n_order in [0, 3, 5, 7] {
            let config = FpfsConfig {
                n_order,
                ..FpfsConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(FpfsError::InvalidConfig { field: "n_order", .. })
            ));
        }
        for n_order in [4, 6] {
            let config = FpfsConfig {
                n_order,
                ..FpfsConfig::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn rejects_non_positive_kernel() {
        let config = FpfsConfig {
            sigma_arcsec: 0.0,
            ..FpfsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FpfsError::InvalidConfig {
                field: "sigma_arcsec",
                ..
            })
        ));
    }
}
