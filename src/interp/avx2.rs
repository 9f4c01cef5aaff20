#![allow(clippy::undocumented_unsafe_blocks)]

use std::{arch::x86_64::*, num::NonZeroUsize};

use super::{dmvr_coeffs, dmvr_rounding, filter_rounding};
use crate::{clip::ClipRange, params::IF_INTERNAL_OFFS, util::Pel};

#[target_feature(enable = "avx2")]
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
    unsafe {
        convolve::<N, VERTICAL, LAST>(
            clip, src, src_stride, dst, dst_stride, width, height, &coeffs, shift, offset,
        );
    }
}

#[target_feature(enable = "avx2")]
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
    unsafe {
        convolve::<2, VERTICAL, false>(
            clip, src, src_stride, dst, dst_stride, width, height, &coeffs, shift, offset,
        );
    }
}

/// Packs eight 32-bit lanes to 16 bits and stores them.
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn store_epi32_as_epi16(dst: *mut Pel, v: __m256i) {
    // packs works per 128-bit lane: [v0..v3 v0..v3 | v4..v7 v4..v7]
    let packed = _mm256_packs_epi32(v, v);
    let ordered = _mm256_permute4x64_epi64(packed, 0b1000);
    _mm_storeu_si128(dst as *mut __m128i, _mm256_castsi256_si128(ordered));
}

/// Loads eight samples sign-extended to 32 bits.
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn load_epi16_as_epi32(src: *const Pel) -> __m256i {
    _mm256_cvtepi16_epi32(_mm_loadu_si128(src as *const __m128i))
}

#[target_feature(enable = "avx2")]
unsafe fn convolve<const N: usize, const VERTICAL: bool, const CLIP: bool>(
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
    assert!(src.len() >= (height - 1) * src_stride + width + (N - 1) * step);
    assert!(dst.len() >= (height - 1) * dst_stride + width);

    let mut vcoeffs = [_mm256_setzero_si256(); N];
    for k in 0..N {
        vcoeffs[k] = _mm256_set1_epi32(coeffs[k]);
    }
    let voffset = _mm256_set1_epi32(offset);
    let vshift = _mm_cvtsi32_si128(shift);
    let vmin = _mm256_set1_epi32(clip.min);
    let vmax = _mm256_set1_epi32(clip.max);

    let src_ptr = src.as_ptr();
    let dst_ptr = dst.as_mut_ptr();
    for y in 0..height {
        let s = src_ptr.add(y * src_stride);
        let d = dst_ptr.add(y * dst_stride);
        let mut x = 0;

        while x + 8 <= width {
            let mut acc = _mm256_setzero_si256();
            for k in 0..N {
                let v = load_epi16_as_epi32(s.add(x + k * step));
                acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(v, vcoeffs[k]));
            }
            let mut val = _mm256_sra_epi32(_mm256_add_epi32(acc, voffset), vshift);
            if CLIP {
                val = _mm256_min_epi32(_mm256_max_epi32(val, vmin), vmax);
            }
            store_epi32_as_epi16(d.add(x), val);
            x += 8;
        }

        // Remaining columns with scalar code
        while x < width {
            let mut sum = 0i32;
            for k in 0..N {
                sum += coeffs[k] * i32::from(*s.add(x + k * step));
            }
            let val = (sum + offset) >> shift;
            *d.add(x) = if CLIP { clip.clip(val) } else { val as Pel };
            x += 1;
        }
    }
}

#[target_feature(enable = "avx2")]
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
    let height = height.get();
    assert!(src.len() >= (height - 1) * src_stride + width);
    assert!(dst.len() >= (height - 1) * dst_stride + width);

    if FIRST == LAST {
        for y in 0..height {
            dst[y * dst_stride..][..width].copy_from_slice(&src[y * src_stride..][..width]);
        }
        return;
    }

    let head_room = clip.frac_bits() as i32;
    unsafe {
        let vshift = _mm_cvtsi32_si128(head_room);
        let vbias = _mm256_set1_epi32(IF_INTERNAL_OFFS);
        let vround = _mm256_set1_epi32(IF_INTERNAL_OFFS + (1 << (head_room - 1)));
        let vmin = _mm256_set1_epi32(clip.min);
        let vmax = _mm256_set1_epi32(clip.max);

        for y in 0..height {
            let s = src.as_ptr().add(y * src_stride);
            let d = dst.as_mut_ptr().add(y * dst_stride);
            let mut x = 0;
            while x + 8 <= width {
                let v = load_epi16_as_epi32(s.add(x));
                let val = if FIRST {
                    _mm256_sub_epi32(_mm256_sll_epi32(v, vshift), vbias)
                } else {
                    let val = _mm256_sra_epi32(_mm256_add_epi32(v, vround), vshift);
                    _mm256_min_epi32(_mm256_max_epi32(val, vmin), vmax)
                };
                store_epi32_as_epi16(d.add(x), val);
                x += 8;
            }

            while x < width {
                let v = i32::from(*s.add(x));
                *d.add(x) = if FIRST {
                    ((v << head_room) - IF_INTERNAL_OFFS) as Pel
                } else {
                    clip.clip((v + IF_INTERNAL_OFFS + (1 << (head_room - 1))) >> head_room)
                };
                x += 1;
            }
        }
    }
}
