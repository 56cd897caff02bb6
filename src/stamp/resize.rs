//! Postage-stamp resizing to a fixed target shape.
//!
//! The moment engine consumes PSF stamps of one fixed shape. Realized PSF
//! images come in whatever shape the PSF model produces, so each stamp is
//! cropped or zero-padded here, per axis, before crossing the engine
//! boundary.
//!
//! Crops take the centered slice and leave an odd remainder on the trailing
//! side. Pads split the deficit with the larger half on the leading (index-0)
//! side. Both conventions match the upstream engine's expectations.

use crate::stamp::{ImageView, OwnedImage};
use crate::util::FpfsResult;

/// Default stamp shape `(height, width)` expected by the moment engine.
pub const STAMP_SHAPE: (usize, usize) = (64, 64);

/// Crop window or pad offsets for one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AxisFit {
    /// First input index kept (crop) — 0 when padding.
    src_start: usize,
    /// Number of input elements kept.
    src_len: usize,
    /// Output offset where the kept elements land — 0 when cropping.
    dst_start: usize,
}

fn fit_axis(input: usize, target: usize) -> AxisFit {
    if input > target {
        AxisFit {
            src_start: (input - target) / 2,
            src_len: target,
            dst_start: 0,
        }
    } else {
        let pad = target - input;
        let pad_after = pad / 2;
        AxisFit {
            src_start: 0,
            src_len: input,
            dst_start: pad - pad_after,
        }
    }
}

/// Crops or zero-pads `input` to exactly `target` = `(height, width)`.
///
/// Cropping and padding are independent per axis and may combine in a single
/// call (crop one axis, pad the other). A 64x64 input against the default
/// target is the identity.
pub fn resize_stamp<T: Copy + Default>(
    input: ImageView<'_, T>,
    target: (usize, usize),
) -> FpfsResult<OwnedImage<T>> {
    let (target_height, target_width) = target;
    let fit_h = fit_axis(input.height(), target_height);
    let fit_w = fit_axis(input.width(), target_width);

    let mut out = OwnedImage::zeros(target_width, target_height)?;
    for dy in 0..fit_h.src_len {
        let row = input
            .row(fit_h.src_start + dy)
            .expect("row index bounded by input height");
        let src = &row[fit_w.src_start..fit_w.src_start + fit_w.src_len];
        for (dx, &value) in src.iter().enumerate() {
            out.set(fit_w.dst_start + dx, fit_h.dst_start + dy, value);
        }
    }
    Ok(out)
}

/// Resizes to the default engine stamp shape.
pub fn resize_to_stamp<T: Copy + Default>(input: ImageView<'_, T>) -> FpfsResult<OwnedImage<T>> {
    resize_stamp(input, STAMP_SHAPE)
}
