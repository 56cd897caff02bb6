//! Error types for fpfsmeas.

use thiserror::Error;

/// Result alias for fpfsmeas operations.
pub type FpfsResult<T> = std::result::Result<T, FpfsError>;

/// Errors that can occur while preparing or running a measurement.
#[derive(Debug, Error, PartialEq)]
pub enum FpfsError {
    /// Image dimensions are zero or overflow the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two parallel inputs disagree in length.
    #[error("length mismatch in {context}: {left} vs {right}")]
    LengthMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },
    /// A configuration field failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// A field with this name is already registered in the schema.
    #[error("duplicate schema field `{name}`")]
    DuplicateField { name: String },
    /// The schema has no field with this name.
    #[error("unknown schema field `{name}`")]
    UnknownField { name: String },
    /// A record was accessed with a key of the wrong field type.
    #[error("field `{name}` is {actual}, accessed as {requested}")]
    FieldTypeMismatch {
        name: String,
        actual: &'static str,
        requested: &'static str,
    },
    /// The mask has no plane with this name.
    #[error("unknown mask plane `{name}`")]
    UnknownMaskPlane { name: String },
    /// No PSF model is attached to the exposure. Fatal for the exposure.
    #[error("no PSF model attached to the exposure")]
    MissingPsf,
    /// The engine returned a row that does not match its declared schema.
    #[error("engine output mismatch: schema has {expected} columns, row has {got}")]
    EngineMismatch { expected: usize, got: usize },
    /// The engine reported a failure for this source.
    #[error("engine failure: {reason}")]
    Engine { reason: String },
    /// Image decoding or encoding failed.
    #[cfg(feature = "image-io")]
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}

impl FpfsError {
    /// Whether the error aborts the whole exposure instead of flagging one
    /// source. Only a missing PSF model qualifies; everything else is routed
    /// to the per-source failure flag by the catalog driver.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FpfsError::MissingPsf)
    }
}
