//! Catalog measurement loop.
//!
//! Mirrors the host framework's failure routing: a fatal error aborts the
//! exposure, anything else sets the failing record's flag and the loop moves
//! on to the next source.

use crate::exposure::Exposure;
use crate::plugin::FpfsPlugin;
use crate::schema::SourceRecord;
use crate::trace::{trace_event, trace_span};
use crate::util::FpfsResult;

/// Outcome counts for one catalog pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    /// Records measured successfully.
    pub measured: usize,
    /// Records flagged as failed.
    pub failed: usize,
}

/// Runs the plugin over every record of a catalog against one exposure.
///
/// Per-source errors are recorded through [`FpfsPlugin::fail`] and do not
/// abort processing of the remaining sources. Fatal errors (a missing PSF
/// model) propagate immediately.
pub fn measure_catalog(
    plugin: &FpfsPlugin,
    catalog: &mut [SourceRecord],
    exposure: &Exposure,
) -> FpfsResult<CatalogSummary> {
    let _span = trace_span!("measure_catalog", sources = catalog.len()).entered();

    let mut summary = CatalogSummary::default();
    for record in catalog.iter_mut() {
        match plugin.measure(record, exposure) {
            Ok(()) => summary.measured += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                let reason = err.to_string();
                trace_event!("source_failed", reason = reason.as_str());
                plugin.fail(record);
                summary.failed += 1;
            }
        }
    }

    trace_event!(
        "catalog_measured",
        measured = summary.measured,
        failed = summary.failed,
    );
    Ok(summary)
}
