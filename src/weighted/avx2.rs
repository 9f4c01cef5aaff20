#![allow(clippy::undocumented_unsafe_blocks)]

use std::{arch::x86_64::*, num::NonZeroUsize};

use super::WeightedParams;
use crate::{
    clip::ClipRange,
    interp::avx2::{load_epi16_as_epi32, store_epi32_as_epi16},
    params::IF_INTERNAL_OFFS,
    util::Pel,
};

#[target_feature(enable = "avx2")]
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
    let height = height.get();
    assert!(src0.len() >= (height - 1) * src0_stride + width);
    assert!(src1.len() >= (height - 1) * src1_stride + width);
    assert!(dst.len() >= (height - 1) * dst_stride + width);

    let shift = wp0.shift + clip.frac_bits() as i32;
    let round = (1 << shift) >> 1;
    let bias = round + wp0.offset * (1 << (shift - 1));
    let (w0, w1) = (wp0.w, wp1.w);

    unsafe {
        let vw0 = _mm256_set1_epi32(w0);
        let vw1 = _mm256_set1_epi32(w1);
        let voffs = _mm256_set1_epi32(IF_INTERNAL_OFFS);
        let vbias = _mm256_set1_epi32(bias);
        let vshift = _mm_cvtsi32_si128(shift);
        let vmin = _mm256_set1_epi32(clip.min);
        let vmax = _mm256_set1_epi32(clip.max);

        for y in 0..height {
            let a = src0.as_ptr().add(y * src0_stride);
            let b = src1.as_ptr().add(y * src1_stride);
            let d = dst.as_mut_ptr().add(y * dst_stride);
            let mut x = 0;

            while x + 8 <= width {
                let va = _mm256_add_epi32(load_epi16_as_epi32(a.add(x)), voffs);
                let vb = _mm256_add_epi32(load_epi16_as_epi32(b.add(x)), voffs);
                let sum = _mm256_add_epi32(
                    _mm256_add_epi32(_mm256_mullo_epi32(va, vw0), _mm256_mullo_epi32(vb, vw1)),
                    vbias,
                );
                let val = _mm256_sra_epi32(sum, vshift);
                store_epi32_as_epi16(
                    d.add(x),
                    _mm256_min_epi32(_mm256_max_epi32(val, vmin), vmax),
                );
                x += 8;
            }

            while x < width {
                let va = i32::from(*a.add(x)) + IF_INTERNAL_OFFS;
                let vb = i32::from(*b.add(x)) + IF_INTERNAL_OFFS;
                *d.add(x) = clip.clip((w0 * va + w1 * vb + bias) >> shift);
                x += 1;
            }
        }
    }
}

/// All three scalar branches reduce to
/// `clip(((w * (s + bias) + round) >> shift) + offset)`; unit weights use
/// `w = 1` and the bare precision shift.
#[target_feature(enable = "avx2")]
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
    let width = width.get();
    let height = height.get();
    assert!(src.len() >= (height - 1) * src_stride + width);
    assert!(dst.len() >= (height - 1) * dst_stride + width);

    let (weight, shift) = if wp.w != 1 << wp.shift {
        (wp.w, wp.shift + clip.frac_bits() as i32)
    } else {
        (1, clip.frac_bits() as i32)
    };
    let round = (1 << shift) >> 1;
    let offset = wp.offset;

    unsafe {
        let vw = _mm256_set1_epi32(weight);
        let voffs = _mm256_set1_epi32(IF_INTERNAL_OFFS);
        let vround = _mm256_set1_epi32(round);
        let voffset = _mm256_set1_epi32(offset);
        let vshift = _mm_cvtsi32_si128(shift);
        let vmin = _mm256_set1_epi32(clip.min);
        let vmax = _mm256_set1_epi32(clip.max);

        for y in 0..height {
            let s = src.as_ptr().add(y * src_stride);
            let d = dst.as_mut_ptr().add(y * dst_stride);
            let mut x = 0;

            while x + 8 <= width {
                let v = _mm256_add_epi32(load_epi16_as_epi32(s.add(x)), voffs);
                let scaled = _mm256_add_epi32(_mm256_mullo_epi32(v, vw), vround);
                let val = _mm256_add_epi32(_mm256_sra_epi32(scaled, vshift), voffset);
                store_epi32_as_epi16(
                    d.add(x),
                    _mm256_min_epi32(_mm256_max_epi32(val, vmin), vmax),
                );
                x += 8;
            }

            while x < width {
                let v = i32::from(*s.add(x)) + IF_INTERNAL_OFFS;
                *d.add(x) = clip.clip(((weight * v + round) >> shift) + offset);
                x += 1;
            }
        }
    }
}
