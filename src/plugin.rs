//! The FPFS measurement plugin adapter.
//!
//! The plugin registers its output columns against a [`Schema`] once, at
//! construction, and thereafter translates one source record at a time into
//! an engine invocation: package the peak, realize and normalize the PSF
//! stamp, run the engine, copy the result row back into the record.

use crate::config::FpfsConfig;
use crate::engine::{check_row, EngineSchema, MomentEngine, MomentRow};
use crate::exposure::{Exposure, Point2};
use crate::peak::FpfsPeak;
use crate::schema::{FieldDescriptor, FieldKey, FieldType, Schema, SourceRecord};
use crate::stamp::resize::resize_to_stamp;
use crate::trace::{trace_event, trace_span};
use crate::util::{FpfsError, FpfsResult};

/// Host-supplied column holding the peak center x pixel.
pub const PEAK_CENTER_X: &str = "anacal_peak_center_x";
/// Host-supplied column holding the peak center y pixel.
pub const PEAK_CENTER_Y: &str = "anacal_peak_center_y";

/// Builds the output field descriptors the plugin registers for a given
/// configuration and engine column contract.
///
/// The set is a general failure flag, one double column per engine column
/// for the source measurement, and a parallel `noise_` set when
/// `measure_from_noise` is enabled.
pub fn register_fields(
    config: &FpfsConfig,
    name: &str,
    engine_schema: &EngineSchema,
) -> FpfsResult<Vec<FieldDescriptor>> {
    config.validate()?;

    let mut fields = vec![FieldDescriptor::new(
        Schema::join(&[name, "flag"]),
        FieldType::Flag,
        "General failure flag, set if anything went wrong",
    )];
    for column in &engine_schema.columns {
        fields.push(FieldDescriptor::new(
            Schema::join(&[name, "source", column]),
            FieldType::Double,
            format!("FPFS source {column} for source"),
        ));
    }
    if config.measure_from_noise {
        for column in &engine_schema.columns {
            fields.push(FieldDescriptor::new(
                Schema::join(&[name, "noise", column]),
                FieldType::Double,
                format!("FPFS noise {column} for source"),
            ));
        }
    }
    Ok(fields)
}

/// Per-source FPFS measurement plugin.
pub struct FpfsPlugin {
    config: FpfsConfig,
    name: String,
    engine: Box<dyn MomentEngine>,
    engine_schema: EngineSchema,
    failure_key: FieldKey,
    source_keys: Vec<FieldKey>,
    noise_keys: Option<Vec<FieldKey>>,
    peak_x_key: FieldKey,
    peak_y_key: FieldKey,
}

impl FpfsPlugin {
    /// Validates the config, snapshots the engine's column contract, and
    /// registers all output columns. The peak center columns must already be
    /// present in the schema; the output column set is fixed afterwards.
    pub fn new(
        config: FpfsConfig,
        name: &str,
        schema: &mut Schema,
        engine: Box<dyn MomentEngine>,
    ) -> FpfsResult<Self> {
        let engine_schema = engine.schema().clone();
        let descriptors = register_fields(&config, name, &engine_schema)?;

        let mut keys = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            keys.push(schema.add_field(descriptor)?);
        }
        let failure_key = keys[0];
        let n = engine_schema.len();
        let source_keys = keys[1..1 + n].to_vec();
        let noise_keys = config
            .measure_from_noise
            .then(|| keys[1 + n..1 + 2 * n].to_vec());

        let peak_x_key = schema.key(PEAK_CENTER_X)?;
        let peak_y_key = schema.key(PEAK_CENTER_Y)?;

        Ok(Self {
            config,
            name: name.to_string(),
            engine,
            engine_schema,
            failure_key,
            source_keys,
            noise_keys,
            peak_x_key,
            peak_y_key,
        })
    }

    /// Returns the plugin name used as the column prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the engine column contract snapshotted at construction.
    pub fn engine_schema(&self) -> &EngineSchema {
        &self.engine_schema
    }

    /// Returns the key of the general failure flag.
    pub fn failure_key(&self) -> FieldKey {
        self.failure_key
    }

    /// Marks the record as failed. Called by the driver when a non-fatal
    /// measurement error occurs.
    pub fn fail(&self, record: &mut SourceRecord) {
        // The flag column is registered by this plugin; the write cannot miss.
        let _ = record.set_flag(self.failure_key, true);
    }

    /// Measures one source on one exposure and writes its output columns.
    pub fn measure(&self, record: &mut SourceRecord, exposure: &Exposure) -> FpfsResult<()> {
        // Without a PSF model this plugin would fail for every entry.
        let psf = exposure.psf().ok_or(FpfsError::MissingPsf)?;

        let x = record.get_int(self.peak_x_key)?;
        let y = record.get_int(self.peak_y_key)?;
        let _span = trace_span!("measure_source", x = x, y = y).entered();

        let bitmask = exposure.mask().plane_bitmask(&self.config.bad_mask_planes)?;
        let mask_value = exposure
            .mask()
            .masked_value_at(i64::from(x), i64::from(y), bitmask);
        let peaks = [FpfsPeak::new(x, y).with_mask_value(mask_value)];

        let psf_stamp = psf.compute_image(Point2::new(f64::from(x), f64::from(y)))?;
        let psf_stamp = resize_to_stamp(psf_stamp.view())?;

        let noise = self
            .config
            .measure_from_noise
            .then(|| exposure.noise().map(|n| n.view()))
            .flatten();

        let output = self.engine.run_single_psf(
            exposure.image().view(),
            psf_stamp.view(),
            &peaks,
            noise,
        )?;

        let source_row = first_row(&output.source)?;
        check_row(&self.engine_schema, source_row)?;
        for (key, value) in self.source_keys.iter().zip(&source_row.0) {
            record.set_double(*key, *value)?;
        }

        if let (Some(noise_keys), Some(noise_rows)) = (&self.noise_keys, &output.noise) {
            let noise_row = first_row(noise_rows)?;
            check_row(&self.engine_schema, noise_row)?;
            for (key, value) in noise_keys.iter().zip(&noise_row.0) {
                record.set_double(*key, *value)?;
            }
        }

        trace_event!("source_measured", x = x, y = y);
        Ok(())
    }
}

fn first_row(rows: &[MomentRow]) -> FpfsResult<&MomentRow> {
    rows.first().ok_or_else(|| FpfsError::Engine {
        reason: "engine returned no rows for the peak".to_string(),
    })
}
