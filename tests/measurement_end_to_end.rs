//! End-to-end catalog measurement against the fixture engine.
//!
//! The shear numbers below validate column-index plumbing, not the moment
//! algorithm: a symmetric source must come out with g1 consistent with zero
//! simply because the adapter fed the engine the right pixels and copied the
//! right row entries into the right columns.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{simple_exposure, GaussianMomentEngine, MASK_PLANES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fpfsmeas::{
    measure_catalog, Exposure, FieldDescriptor, FieldType, FpfsConfig, FpfsError, FpfsPlugin,
    GaussianPsf, MaskImage, OwnedImage, Schema, SourceRecord, PEAK_CENTER_X, PEAK_CENTER_Y,
};

/// Kernel size in pixels for the default config (0.52 arcsec / 0.2 arcsec).
const SIGMA_PX: f64 = 2.6;

fn host_schema() -> Schema {
    let mut schema = Schema::new();
    for name in [PEAK_CENTER_X, PEAK_CENTER_Y] {
        schema
            .add_field(FieldDescriptor::new(name, FieldType::Int, "peak center"))
            .unwrap();
    }
    schema
}

fn record_at(schema: &Schema, x: i32, y: i32) -> SourceRecord {
    let mut record = schema.make_record();
    record.set_int(schema.key(PEAK_CENTER_X).unwrap(), x).unwrap();
    record.set_int(schema.key(PEAK_CENTER_Y).unwrap(), y).unwrap();
    record
}

fn source_value(schema: &Schema, record: &SourceRecord, column: &str) -> f64 {
    record
        .get_double(schema.key(&format!("fpfs_source_{column}")).unwrap())
        .unwrap()
}

#[test]
fn symmetric_source_yields_zero_g1() {
    let mut schema = host_schema();
    let config = FpfsConfig::default();
    let engine = GaussianMomentEngine::new(config.sigma_px());
    let plugin = FpfsPlugin::new(config, "fpfs", &mut schema, Box::new(engine)).unwrap();

    let exposure = simple_exposure();
    let mut catalog = vec![record_at(&schema, 50, 50)];
    let summary = measure_catalog(&plugin, &mut catalog, &exposure).unwrap();
    assert_eq!(summary.measured, 1);
    assert_eq!(summary.failed, 0);

    let record = &catalog[0];
    assert!(!record.get_flag(plugin.failure_key()).unwrap());

    let m00 = source_value(&schema, record, "m00");
    let m22c = source_value(&schema, record, "m22c");
    let m22s = source_value(&schema, record, "m22s");
    let m40 = source_value(&schema, record, "m40");

    assert!(m00 > 0.0);
    assert!(m00 - m40 > 0.0);

    // ixx == iyy makes the source symmetric under a coordinate swap, so the
    // cos-mode ellipticity cancels; ixy > 0 leaves the sin mode positive.
    let g1_estimate = m22c / (m00 - m40);
    let g2_estimate = m22s / (m00 - m40);
    assert!(g2_estimate > 0.0);
    assert!(g1_estimate.abs() < 1e-7);
}

#[test]
fn missing_psf_is_fatal_for_the_exposure() {
    let mut schema = host_schema();
    let plugin = FpfsPlugin::new(
        FpfsConfig::default(),
        "fpfs",
        &mut schema,
        Box::new(GaussianMomentEngine::new(SIGMA_PX)),
    )
    .unwrap();

    let image = common::gaussian_galaxy(100, 100, 300000.0, (50.0, 50.0), 2.0, 2.0, 0.5);
    let mask = MaskImage::new(100, 100, &MASK_PLANES).unwrap();
    let exposure = Exposure::new(image, mask).unwrap();

    let mut catalog = vec![record_at(&schema, 50, 50)];
    let err = measure_catalog(&plugin, &mut catalog, &exposure).err().unwrap();
    assert_eq!(err, FpfsError::MissingPsf);
    assert!(err.is_fatal());
    // The failure flag is untouched; the fatal path aborts the exposure.
    assert!(!catalog[0].get_flag(plugin.failure_key()).unwrap());
}

#[test]
fn per_source_failure_does_not_abort_the_catalog() {
    let mut schema = host_schema();
    let plugin = FpfsPlugin::new(
        FpfsConfig::default(),
        "fpfs",
        &mut schema,
        Box::new(GaussianMomentEngine::new(SIGMA_PX)),
    )
    .unwrap();

    let exposure = simple_exposure();
    // The first peak is outside the array; the engine rejects it.
    let mut catalog = vec![record_at(&schema, 999, 50), record_at(&schema, 50, 50)];
    let summary = measure_catalog(&plugin, &mut catalog, &exposure).unwrap();
    assert_eq!(summary.measured, 1);
    assert_eq!(summary.failed, 1);

    assert!(catalog[0].get_flag(plugin.failure_key()).unwrap());
    assert!(source_value(&schema, &catalog[0], "m00").is_nan());

    assert!(!catalog[1].get_flag(plugin.failure_key()).unwrap());
    assert!(source_value(&schema, &catalog[1], "m00") > 0.0);
}

#[test]
fn bad_plane_bits_reach_the_peak_record() {
    let mut schema = host_schema();
    let log = Rc::new(RefCell::new(Vec::new()));
    let engine = GaussianMomentEngine::new(SIGMA_PX).with_peak_log(Rc::clone(&log));
    let plugin = FpfsPlugin::new(FpfsConfig::default(), "fpfs", &mut schema, Box::new(engine))
        .unwrap();

    let image = common::gaussian_galaxy(100, 100, 300000.0, (50.0, 50.0), 2.0, 2.0, 0.5);
    let mut mask = MaskImage::new(100, 100, &MASK_PLANES).unwrap();
    mask.set_plane_at(50, 50, "SAT").unwrap();
    mask.set_plane_at(50, 50, "CR").unwrap();
    let exposure = Exposure::new(image, mask)
        .unwrap()
        .with_psf(Box::new(GaussianPsf::new(1.2, 21).unwrap()));

    let mut catalog = vec![record_at(&schema, 50, 50)];
    measure_catalog(&plugin, &mut catalog, &exposure).unwrap();

    let peaks = log.borrow();
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].x, 50);
    assert_eq!(peaks[0].y, 50);
    assert_eq!(peaks[0].is_peak, 1);
    // Only the configured bad planes survive the bit test: SAT is bit 1,
    // CR is not in bad_mask_planes.
    assert_eq!(peaks[0].mask_value, 1 << 1);
}

#[test]
fn noise_row_populates_noise_columns() {
    let mut schema = host_schema();
    let config = FpfsConfig {
        measure_from_noise: true,
        ..FpfsConfig::default()
    };
    let plugin = FpfsPlugin::new(
        config,
        "fpfs",
        &mut schema,
        Box::new(GaussianMomentEngine::new(SIGMA_PX)),
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let noise = OwnedImage::from_fn(100, 100, |_, _| rng.random_range(-1.0f32..1.0)).unwrap();
    let exposure = simple_exposure().with_noise(noise);

    let mut catalog = vec![record_at(&schema, 50, 50)];
    let summary = measure_catalog(&plugin, &mut catalog, &exposure).unwrap();
    assert_eq!(summary.measured, 1);

    let record = &catalog[0];
    let noise_m00 = record
        .get_double(schema.key("fpfs_noise_m00").unwrap())
        .unwrap();
    assert!(noise_m00.is_finite());
    // The source row still comes from the science image.
    assert!(source_value(&schema, record, "m00") > 0.0);
}

#[test]
fn noise_columns_stay_nan_without_a_noise_image() {
    let mut schema = host_schema();
    let config = FpfsConfig {
        measure_from_noise: true,
        ..FpfsConfig::default()
    };
    let plugin = FpfsPlugin::new(
        config,
        "fpfs",
        &mut schema,
        Box::new(GaussianMomentEngine::new(SIGMA_PX)),
    )
    .unwrap();

    let exposure = simple_exposure();
    let mut catalog = vec![record_at(&schema, 50, 50)];
    measure_catalog(&plugin, &mut catalog, &exposure).unwrap();

    let noise_m00 = catalog[0]
        .get_double(schema.key("fpfs_noise_m00").unwrap())
        .unwrap();
    assert!(noise_m00.is_nan());
}
