use std::num::NonZeroUsize;

use super::GEO_WEIGHT_SUM;
use crate::{clip::ClipRange, params::IF_INTERNAL_OFFS, util::Pel};

pub(crate) fn blend(
    clip: &ClipRange,
    src0: &[Pel],
    src0_stride: usize,
    src1: &[Pel],
    src1_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    mask: &[u8],
    mask_stride: usize,
    mask_step: usize,
) {
    let width = width.get();
    let shift = clip.frac_bits() as i32 + 3;
    let offset = (1 << (shift - 1)) + (IF_INTERNAL_OFFS << 3);
    let total = i32::from(GEO_WEIGHT_SUM);

    for y in 0..height.get() {
        let row0 = &src0[y * src0_stride..][..width];
        let row1 = &src1[y * src1_stride..][..width];
        let mask_row = &mask[y * mask_stride..];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for (x, ((out, &a), &b)) in dst_row.iter_mut().zip(row0).zip(row1).enumerate() {
            let w = i32::from(mask_row[x * mask_step]);
            let val = (w * i32::from(a) + (total - w) * i32::from(b) + offset) >> shift;
            *out = clip.clip(val);
        }
    }
}
