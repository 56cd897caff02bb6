//! fpfsmeas adapts an external FPFS shapelet-moment engine into a per-source
//! measurement workflow over astronomical exposures.
//!
//! The crate owns the glue: PSF postage stamps are cropped or zero-padded to
//! the fixed shape the engine expects, detected peaks are packaged into the
//! engine's fixed-layout records, output columns are registered from the
//! engine's versioned column contract, and per-source failures are routed to
//! a flag column instead of aborting the catalog. The moment computation
//! itself stays behind the [`MomentEngine`] trait.

pub mod config;
pub mod driver;
pub mod engine;
pub mod exposure;
pub mod peak;
mod plugin;
pub mod schema;
pub mod stamp;
pub(crate) mod trace;
pub mod util;

pub use config::FpfsConfig;
pub use driver::{measure_catalog, CatalogSummary};
pub use engine::{
    EngineOutput, EngineParams, EngineSchema, MomentEngine, MomentRow, DEFAULT_KMAX,
    DET_NROT_DISABLED,
};
pub use exposure::{Exposure, GaussianPsf, MaskImage, Point2, PsfModel};
pub use peak::{make_peaks, FpfsPeak};
pub use plugin::{register_fields, FpfsPlugin, PEAK_CENTER_X, PEAK_CENTER_Y};
pub use schema::{FieldDescriptor, FieldKey, FieldType, Schema, SourceRecord};
pub use stamp::resize::{resize_stamp, resize_to_stamp, STAMP_SHAPE};
pub use stamp::{ImageView, OwnedImage};
pub use util::{FpfsError, FpfsResult};
