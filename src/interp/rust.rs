use std::num::NonZeroUsize;

use super::{dmvr_coeffs, dmvr_rounding, filter_rounding};
use crate::{
    clip::ClipRange,
    params::IF_INTERNAL_OFFS,
    util::{Pel, left_shift_round, right_shift_round},
};

/// Applies an `N`-tap filter along one axis. `src` starts at the first tap
/// of the first output sample.
pub(crate) fn filter<const N: usize, const VERTICAL: bool, const FIRST: bool, const LAST: bool>(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    taps: &[i16],
) {
    debug_assert_eq!(taps.len(), N);
    let (shift, offset) = filter_rounding(clip.bit_depth, FIRST, LAST);
    let mut coeffs = [0i32; N];
    for (c, &t) in coeffs.iter_mut().zip(taps) {
        *c = i32::from(t);
    }
    convolve::<N, VERTICAL, LAST>(
        clip, src, src_stride, dst, dst_stride, width, height, &coeffs, shift, offset,
    );
}

/// Bilinear refinement filter. Never produces output samples.
pub(crate) fn filter_dmvr<const VERTICAL: bool, const FIRST: bool>(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    taps: &[i16],
) {
    let (shift, offset) = dmvr_rounding(clip.bit_depth, FIRST);
    let coeffs = dmvr_coeffs(taps);
    convolve::<2, VERTICAL, false>(
        clip, src, src_stride, dst, dst_stride, width, height, &coeffs, shift, offset,
    );
}

fn convolve<const N: usize, const VERTICAL: bool, const CLIP: bool>(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    coeffs: &[i32; N],
    shift: i32,
    offset: i32,
) {
    let width = width.get();
    let height = height.get();
    let step = if VERTICAL { src_stride } else { 1 };
    debug_assert!(src.len() >= (height - 1) * src_stride + width + (N - 1) * step);
    debug_assert!(dst.len() >= (height - 1) * dst_stride + width);

    for y in 0..height {
        let src_row = &src[y * src_stride..];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for (x, out) in dst_row.iter_mut().enumerate() {
            let mut sum = 0i32;
            for k in 0..N {
                sum += coeffs[k] * i32::from(src_row[x + k * step]);
            }
            let val = (sum + offset) >> shift;
            *out = if CLIP { clip.clip(val) } else { val as Pel };
        }
    }
}

/// Integer-position pass. Only converts between native and internal
/// precision.
pub(crate) fn copy<const FIRST: bool, const LAST: bool>(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
) {
    let width = width.get();
    let head_room = clip.frac_bits() as i32;

    for y in 0..height.get() {
        let src_row = &src[y * src_stride..][..width];
        let dst_row = &mut dst[y * dst_stride..][..width];
        if FIRST == LAST {
            dst_row.copy_from_slice(src_row);
        } else if FIRST {
            for (out, &s) in dst_row.iter_mut().zip(src_row) {
                *out = (left_shift_round(i32::from(s), head_room) - IF_INTERNAL_OFFS) as Pel;
            }
        } else {
            for (out, &s) in dst_row.iter_mut().zip(src_row) {
                *out = clip.clip(right_shift_round(i32::from(s) + IF_INTERNAL_OFFS, head_room));
            }
        }
    }
}

/// Converts native samples to the 10-bit refinement precision.
pub(crate) fn copy_dmvr(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
) {
    let width = width.get();
    let bit_depth = i32::from(clip.bit_depth);

    for y in 0..height.get() {
        let src_row = &src[y * src_stride..][..width];
        let dst_row = &mut dst[y * dst_stride..][..width];
        for (out, &s) in dst_row.iter_mut().zip(src_row) {
            let s = i32::from(s);
            let val = if bit_depth > 10 {
                (s + (1 << (bit_depth - 11))) >> (bit_depth - 10)
            } else {
                s << (10 - bit_depth)
            };
            *out = val as Pel;
        }
    }
}
