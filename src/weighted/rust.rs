use std::num::NonZeroUsize;

use super::WeightedParams;
use crate::{clip::ClipRange, params::IF_INTERNAL_OFFS, util::Pel};

pub(crate) fn weight_bi(
    clip: &ClipRange,
    src0: &[Pel],
    src0_stride: usize,
    src1: &[Pel],
    src1_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    wp0: &WeightedParams,
    wp1: &WeightedParams,
) {
    let width = width.get();
    let shift = wp0.shift + clip.frac_bits() as i32;
    let round = (1 << shift) >> 1;
    let bias = round + wp0.offset * (1 << (shift - 1));
    let (w0, w1) = (wp0.w, wp1.w);

    for y in 0..height.get() {
        let row0 = &src0[y * src0_stride..][..width];
        let row1 = &src1[y * src1_stride..][..width];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for ((out, &a), &b) in dst_row.iter_mut().zip(row0).zip(row1) {
            let a = i32::from(a) + IF_INTERNAL_OFFS;
            let b = i32::from(b) + IF_INTERNAL_OFFS;
            *out = clip.clip((w0 * a + w1 * b + bias) >> shift);
        }
    }
}

pub(crate) fn weight_uni(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    wp: &WeightedParams,
) {
    if wp.w != 1 << wp.shift {
        weight_uni_scaled(clip, src, src_stride, dst, dst_stride, width, height, wp);
    } else if wp.offset == 0 {
        weight_uni_unity::<false>(clip, src, src_stride, dst, dst_stride, width, height, wp);
    } else {
        weight_uni_unity::<true>(clip, src, src_stride, dst, dst_stride, width, height, wp);
    }
}

/// `clip(((w * (s + bias) + round) >> shift) + offset)`
pub(crate) fn weight_uni_scaled(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    wp: &WeightedParams,
) {
    let width = width.get();
    let shift = wp.shift + clip.frac_bits() as i32;
    let round = (1 << shift) >> 1;

    for y in 0..height.get() {
        let src_row = &src[y * src_stride..][..width];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for (out, &s) in dst_row.iter_mut().zip(src_row) {
            let s = i32::from(s) + IF_INTERNAL_OFFS;
            *out = clip.clip(((wp.w * s + round) >> shift) + wp.offset);
        }
    }
}

/// Unit weight: only the precision conversion and, with `OFFSET`, the offset.
pub(crate) fn weight_uni_unity<const OFFSET: bool>(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    wp: &WeightedParams,
) {
    let width = width.get();
    let shift = clip.frac_bits() as i32;
    let round = (1 << shift) >> 1;

    for y in 0..height.get() {
        let src_row = &src[y * src_stride..][..width];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for (out, &s) in dst_row.iter_mut().zip(src_row) {
            let val = (i32::from(s) + IF_INTERNAL_OFFS + round) >> shift;
            *out = if OFFSET {
                clip.clip(val + wp.offset)
            } else {
                clip.clip(val)
            };
        }
    }
}
