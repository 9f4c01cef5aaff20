#![allow(clippy::undocumented_unsafe_blocks)]

use std::{arch::x86_64::*, num::NonZeroUsize};

use super::GEO_WEIGHT_SUM;
use crate::{
    clip::ClipRange,
    interp::avx2::{load_epi16_as_epi32, store_epi32_as_epi16},
    params::IF_INTERNAL_OFFS,
    util::Pel,
};

#[target_feature(enable = "avx2")]
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
    let height = height.get();
    assert!(src0.len() >= (height - 1) * src0_stride + width);
    assert!(src1.len() >= (height - 1) * src1_stride + width);
    assert!(dst.len() >= (height - 1) * dst_stride + width);
    assert!(mask.len() >= (height - 1) * mask_stride + (width - 1) * mask_step + 1);

    let shift = clip.frac_bits() as i32 + 3;
    let offset = (1 << (shift - 1)) + (IF_INTERNAL_OFFS << 3);
    let total = i32::from(GEO_WEIGHT_SUM);

    unsafe {
        let vtotal = _mm256_set1_epi32(total);
        let voffset = _mm256_set1_epi32(offset);
        let vshift = _mm_cvtsi32_si128(shift);
        let vmin = _mm256_set1_epi32(clip.min);
        let vmax = _mm256_set1_epi32(clip.max);

        for y in 0..height {
            let a = src0.as_ptr().add(y * src0_stride);
            let b = src1.as_ptr().add(y * src1_stride);
            let m = mask.as_ptr().add(y * mask_stride);
            let d = dst.as_mut_ptr().add(y * dst_stride);
            let mut x = 0;

            while x + 8 <= width {
                let vw = if mask_step == 1 {
                    _mm256_cvtepu8_epi32(_mm_loadl_epi64(m.add(x) as *const __m128i))
                } else {
                    // subsampled chroma: weights are not contiguous
                    let mut lanes = [0i32; 8];
                    for (i, lane) in lanes.iter_mut().enumerate() {
                        *lane = i32::from(*m.add((x + i) * mask_step));
                    }
                    _mm256_loadu_si256(lanes.as_ptr() as *const __m256i)
                };
                let va = load_epi16_as_epi32(a.add(x));
                let vb = load_epi16_as_epi32(b.add(x));
                let sum = _mm256_add_epi32(
                    _mm256_add_epi32(
                        _mm256_mullo_epi32(va, vw),
                        _mm256_mullo_epi32(vb, _mm256_sub_epi32(vtotal, vw)),
                    ),
                    voffset,
                );
                let val = _mm256_sra_epi32(sum, vshift);
                store_epi32_as_epi16(
                    d.add(x),
                    _mm256_min_epi32(_mm256_max_epi32(val, vmin), vmax),
                );
                x += 8;
            }

            while x < width {
                let w = i32::from(*m.add(x * mask_step));
                let val = (w * i32::from(*a.add(x)) + (total - w) * i32::from(*b.add(x)) + offset)
                    >> shift;
                *d.add(x) = clip.clip(val);
                x += 1;
            }
        }
    }
}
