#![allow(clippy::unwrap_used, reason = "allow in test files")]

use std::sync::Arc;

use parameterized::parameterized;
use pastey::paste;
use rand::Rng;

use super::*;
use crate::{
    observer::ReadCounter,
    tables::{CHROMA_FILTER, LUMA_FILTER},
    tests::{nz, random_samples, test_rng},
};

macro_rules! create_tests {
    ($module:ident) => {
        paste! {
            #[test]
            fn [<test_half_pel_constant_ $module>]() {
                let clip = ClipRange::new(10).unwrap();
                let stride = 16;
                let src = vec![512i16; stride * 8];
                let mut dst = vec![0i16; 8 * 8];
                verify_asm!($module, filter::<8, false, true, true>(
                    &clip, &src, stride, &mut dst, 8, nz(8), nz(8), &LUMA_FILTER[8]
                ));
                assert!(dst.iter().all(|&v| v == 512));
            }

            #[test]
            fn [<test_first_pass_removes_bias_ $module>]() {
                // 10-bit: head room 4, so 512 becomes (512 << 4) - 8192 = 0
                let clip = ClipRange::new(10).unwrap();
                let src = vec![512i16; 16 * 4];
                let mut dst = vec![1i16; 9 * 4];
                verify_asm!($module, filter::<8, false, true, false>(
                    &clip, &src, 16, &mut dst, 9, nz(9), nz(4), &LUMA_FILTER[5]
                ));
                assert!(dst.iter().all(|&v| v == 0));
            }

            #[test]
            fn [<test_vertical_impulse_ $module>]() {
                // Identity taps move the impulse up by the one-row rewind.
                let clip = ClipRange::new(8).unwrap();
                let stride = 8;
                let mut src = vec![0i16; stride * 11];
                src[7 * stride] = 64;
                let mut dst = vec![0i16; 8 * 8];
                verify_asm!($module, filter::<4, true, true, true>(
                    &clip, &src, stride, &mut dst, 8, nz(8), nz(8), &CHROMA_FILTER[0]
                ));
                // identity taps: row y reads rows y..y+3, centre at y+1
                assert_eq!(dst[6 * 8], 64);
                assert_eq!(dst[5 * 8], 0);
                assert_eq!(dst[6 * 8 + 1], 0);
            }

            #[test]
            fn [<test_last_pass_clips_ $module>]() {
                let clip = ClipRange::with_bounds(16, 235, 8).unwrap();
                let src: Vec<i16> = (0..16 * 2).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
                let mut dst = vec![0i16; 9 * 2];
                verify_asm!($module, filter::<8, false, true, true>(
                    &clip, &src, 16, &mut dst, 9, nz(9), nz(2), &LUMA_FILTER[8]
                ));
                assert!(dst.iter().all(|&v| (16..=235).contains(&v)));
            }

            #[test]
            fn [<test_copy_round_trip_ $module>]() {
                let clip = ClipRange::new(10).unwrap();
                let mut rng = test_rng();
                let src = random_samples(&mut rng, 12 * 5, 10);
                let mut mid = vec![0i16; 12 * 5];
                let mut dst = vec![0i16; 12 * 5];
                verify_asm!($module, copy::<true, false>(
                    &clip, &src, 12, &mut mid, 12, nz(12), nz(5)
                ));
                for (&m, &s) in mid.iter().zip(&src) {
                    assert_eq!(i32::from(m), (i32::from(s) << 4) - 8192);
                }
                verify_asm!($module, copy::<false, true>(
                    &clip, &mid, 12, &mut dst, 12, nz(12), nz(5)
                ));
                assert_eq!(dst, src);
            }

            #[test]
            fn [<test_dmvr_constant_ $module>]() {
                // 8-bit 100 becomes 400 at 10-bit refinement precision
                let clip = ClipRange::new(8).unwrap();
                let src = vec![100i16; 17 * 8];
                let mut mid = vec![0i16; 16 * 8];
                verify_asm!($module, filter_dmvr::<false, true>(
                    &clip, &src, 17, &mut mid, 16, nz(16), nz(8), &crate::tables::BILINEAR_FILTER[5]
                ));
                assert!(mid.iter().all(|&v| v == 400));

                let mut dst = vec![0i16; 16 * 7];
                verify_asm!($module, filter_dmvr::<true, false>(
                    &clip, &mid, 16, &mut dst, 16, nz(16), nz(7), &crate::tables::BILINEAR_FILTER[11]
                ));
                assert!(dst.iter().all(|&v| v == 400));
            }
        }
    };
}

create_tests!(rust);

#[cfg(target_feature = "avx2")]
create_tests!(avx2);

fn padded_plane(value: impl Fn(usize, usize) -> i16, size: usize, border: usize) -> (Vec<i16>, usize) {
    let stride = size + 2 * border;
    let data = (0..stride * stride)
        .map(|i| value(i % stride, i / stride))
        .collect();
    (data, stride)
}

#[test]
fn test_scenario_half_pel_constant_10bit() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let (plane, stride) = padded_plane(|_, _| 512, 8, 4);
    let src = RefWindow::at(&plane, stride, 4, 4).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    let mut tmp = vec![0i16; scratch_len(FilterVariant::Default, ComponentId::Y, nz(8), nz(8))];

    filter
        .filter_2d(
            ComponentId::Y,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            8,
            8,
            true,
            &mut tmp,
        )
        .unwrap();
    assert!(out.iter().all(|&v| v == 512));
}

#[test]
fn test_dc_gain_every_variant() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let variants = [
        FilterVariant::Default,
        FilterVariant::Affine,
        FilterVariant::ResampleHalf,
        FilterVariant::ResampleDouble,
        FilterVariant::AffineResampleHalf,
        FilterVariant::AffineResampleDouble,
        FilterVariant::HalfPelAlternate,
    ];
    let mut rng = test_rng();
    for bit_depth in 8..=12u8 {
        let clip = ClipRange::new(bit_depth).unwrap();
        let value = rng.random_range(0..(1i16 << bit_depth));
        let (plane, stride) = padded_plane(|_, _| value, 8, 4);
        let src = RefWindow::at(&plane, stride, 4, 4).unwrap();
        for variant in variants {
            for comp in [ComponentId::Y, ComponentId::Cb] {
                let positions = tables::frac_positions(comp);
                for frac_x in (0..positions).step_by(3) {
                    let frac_y = (frac_x * 7 + 1) % positions;
                    let mut out = vec![0i16; 64];
                    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
                    let mut tmp = vec![0i16; 8 * 15];
                    filter
                        .filter_2d(
                            comp, variant, &clip, &src, &mut dst, frac_x, frac_y, true, &mut tmp,
                        )
                        .unwrap();
                    assert!(
                        out.iter().all(|&v| v == value),
                        "{variant:?} {comp:?} ({frac_x}, {frac_y}) at {bit_depth}-bit"
                    );
                }
            }
        }
    }
}

#[test]
fn test_intermediate_output_precision() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let (plane, stride) = padded_plane(|_, _| 300, 8, 4);
    let src = RefWindow::at(&plane, stride, 4, 4).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    let mut tmp = vec![0i16; 8 * 15];
    filter
        .filter_2d(
            ComponentId::Y,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            3,
            11,
            false,
            &mut tmp,
        )
        .unwrap();
    assert!(out.iter().all(|&v| i32::from(v) == (300 << 4) - IF_INTERNAL_OFFS));
}

/// Direct 2D convolution with the outer product of both tap sets. At 8-bit
/// the intermediate pass loses nothing, so the separable result must match.
fn direct_2d(
    plane: &[i16],
    stride: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
    taps_x: &[i16],
    taps_y: &[i16],
) -> Vec<i16> {
    let half = taps_x.len() / 2 - 1;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0i64;
            for (j, &cy) in taps_y.iter().enumerate() {
                for (i, &cx) in taps_x.iter().enumerate() {
                    let s = plane[(y0 + y + j - half) * stride + x0 + x + i - half];
                    sum += i64::from(cx) * i64::from(cy) * i64::from(s);
                }
            }
            out.push(((sum + 2048) >> 12).clamp(0, 255) as i16);
        }
    }
    out
}

#[parameterized(
    width = { 8, 16, 32, 64, 8, 64 },
    height = { 8, 16, 32, 64, 64, 8 }
)]
fn separable_matches_direct_2d(width: usize, height: usize) {
    let filter = InterpolationFilter::new(KernelSet::global());
    let clip = ClipRange::new(8).unwrap();
    let mut rng = test_rng();
    let border = 4;
    let stride = width + 2 * border;
    let plane = random_samples(&mut rng, stride * (height + 2 * border), 8);
    let src = RefWindow::at(&plane, stride, border, border).unwrap();

    for (frac_x, frac_y) in [(1, 15), (8, 8), (5, 3), (12, 9)] {
        let mut out = vec![0i16; width * height];
        let mut dst = PlaneMut::new(&mut out, width, nz(width), nz(height)).unwrap();
        let mut tmp = vec![0i16; width * (height + 7)];
        filter
            .filter_2d(
                ComponentId::Y,
                FilterVariant::Default,
                &clip,
                &src,
                &mut dst,
                frac_x,
                frac_y,
                true,
                &mut tmp,
            )
            .unwrap();
        let expected = direct_2d(
            &plane,
            stride,
            border,
            border,
            width,
            height,
            &LUMA_FILTER[frac_x],
            &LUMA_FILTER[frac_y],
        );
        assert_eq!(out, expected, "frac ({frac_x}, {frac_y})");
    }
}

#[test]
fn test_observer_leaves_output_unchanged() {
    let mut filter = InterpolationFilter::new(KernelSet::global());
    let clip = ClipRange::new(10).unwrap();
    let mut rng = test_rng();
    let plane = random_samples(&mut rng, 32 * 32, 10);
    let src = RefWindow::at(&plane, 32, 8, 8).unwrap();
    let mut tmp = vec![0i16; 16 * 23];

    let mut run = |filter: &InterpolationFilter<'_>| {
        let mut out = vec![0i16; 16 * 16];
        let mut dst = PlaneMut::new(&mut out, 16, nz(16), nz(16)).unwrap();
        filter
            .filter_2d(
                ComponentId::Y,
                FilterVariant::Default,
                &clip,
                &src,
                &mut dst,
                6,
                10,
                true,
                &mut tmp,
            )
            .unwrap();
        out
    };

    let plain = run(&filter);
    let counter = Arc::new(ReadCounter::new());
    filter.attach_observer(Arc::clone(&counter) as Arc<dyn BandwidthObserver>);
    let observed = run(&filter);
    assert_eq!(plain, observed);
    // one first pass covering the full 8-tap support
    assert_eq!(counter.reads(), 1);
    assert_eq!(counter.samples(), 23 * 23);

    assert!(filter.detach_observer().is_some());
    assert_eq!(run(&filter), plain);
    assert_eq!(counter.reads(), 1);
}

#[test]
fn test_observer_counts_copy_region() {
    let mut filter = InterpolationFilter::new(KernelSet::reference());
    let counter = Arc::new(ReadCounter::new());
    filter.attach_observer(Arc::clone(&counter) as Arc<dyn BandwidthObserver>);
    let clip = ClipRange::new(8).unwrap();
    let plane = vec![10i16; 32 * 32];
    let src = RefWindow::at(&plane, 32, 8, 8).unwrap();
    let mut out = vec![0i16; 8 * 4];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(4)).unwrap();
    filter
        .filter_hor(
            ComponentId::Cb,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            0,
            true,
        )
        .unwrap();
    assert_eq!(out, vec![10; 32]);
    assert_eq!(counter.samples(), 32);
}

#[test]
fn test_resampling_filters_integer_position() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(8).unwrap();
    let (plane, stride) = padded_plane(|x, _| if x == 8 { 200 } else { 0 }, 8, 4);
    let src = RefWindow::at(&plane, stride, 4, 4).unwrap();

    let mut default_out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut default_out, 8, nz(8), nz(8)).unwrap();
    filter
        .filter_hor(ComponentId::Y, FilterVariant::Default, &clip, &src, &mut dst, 0, true)
        .unwrap();
    let mut resampled = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut resampled, 8, nz(8), nz(8)).unwrap();
    filter
        .filter_hor(
            ComponentId::Y,
            FilterVariant::ResampleDouble,
            &clip,
            &src,
            &mut dst,
            0,
            true,
        )
        .unwrap();

    assert_eq!(default_out[4], 200);
    assert_eq!(default_out[3], 0);
    // the smoothing taps spread the impulse to its neighbours
    assert!(resampled[4] < 200);
    assert!(resampled[3] > 0);
}

#[test]
fn test_alternate_half_pel_smooths() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(8).unwrap();
    let (plane, stride) = padded_plane(|x, _| if x < 8 { 0 } else { 255 }, 8, 4);
    let src = RefWindow::at(&plane, stride, 4, 4).unwrap();

    let run = |variant| {
        let mut out = vec![0i16; 64];
        let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
        filter
            .filter_hor(ComponentId::Y, variant, &clip, &src, &mut dst, 8, true)
            .unwrap();
        out
    };
    let sharp = run(FilterVariant::Default);
    let smooth = run(FilterVariant::HalfPelAlternate);
    assert_ne!(sharp, smooth);
    // non-negative taps never ring on a step edge
    assert_eq!(&smooth[..8], &[0, 12, 48, 128, 207, 243, 255, 255]);
    assert_eq!(&sharp[..4], &[0, 12, 0, 128]);
}

#[test]
fn test_dmvr_copy_and_bilinear() {
    let filter = InterpolationFilter::new(KernelSet::global());
    let clip = ClipRange::new(12).unwrap();
    let plane = vec![2049i16; 24 * 24];
    let src = RefWindow::at(&plane, 24, 4, 4).unwrap();
    let mut tmp = vec![0i16; 16 * 17];

    for (frac_x, frac_y) in [(0, 0), (3, 0), (0, 9), (4, 12)] {
        let mut out = vec![0i16; 16 * 16];
        let mut dst = PlaneMut::new(&mut out, 16, nz(16), nz(16)).unwrap();
        filter
            .filter_dmvr(&clip, &src, &mut dst, frac_x, frac_y, &mut tmp)
            .unwrap();
        // 12-bit 2049 rounds to 512 at 10-bit
        assert!(out.iter().all(|&v| v == 512), "({frac_x}, {frac_y})");
    }
}

#[test]
fn test_dmvr_has_no_output_pass() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let plane = vec![0i16; 32 * 32];
    let src = RefWindow::at(&plane, 32, 8, 8).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    assert_eq!(
        filter.filter_hor(ComponentId::Y, FilterVariant::Dmvr, &clip, &src, &mut dst, 4, true),
        Err(McError::UnsupportedVariant {
            variant: FilterVariant::Dmvr,
            comp: ComponentId::Y
        })
    );
}

#[test]
fn test_rejects_missing_border() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let plane = vec![0i16; 16 * 16];
    let src = RefWindow::at(&plane, 16, 2, 4).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    assert_eq!(
        filter.filter_hor(
            ComponentId::Y,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            4,
            true
        ),
        Err(McError::SupportOutOfBounds)
    );
    // the 4-tap chroma filter only needs one column on the left
    assert!(
        filter
            .filter_hor(
                ComponentId::Cb,
                FilterVariant::Default,
                &clip,
                &src,
                &mut dst,
                4,
                true
            )
            .is_ok()
    );
}

#[test]
fn test_rejects_small_scratch() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let plane = vec![0i16; 32 * 32];
    let src = RefWindow::at(&plane, 32, 8, 8).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    let mut tmp = vec![0i16; 64];
    assert_eq!(
        filter.filter_2d(
            ComponentId::Y,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            4,
            4,
            true,
            &mut tmp
        ),
        Err(McError::BufferTooSmall {
            needed: 8 * 15,
            available: 64
        })
    );
}

#[test]
fn test_rejects_fraction_out_of_range() {
    let filter = InterpolationFilter::new(KernelSet::reference());
    let clip = ClipRange::new(10).unwrap();
    let plane = vec![0i16; 32 * 32];
    let src = RefWindow::at(&plane, 32, 8, 8).unwrap();
    let mut out = vec![0i16; 64];
    let mut dst = PlaneMut::new(&mut out, 8, nz(8), nz(8)).unwrap();
    assert!(matches!(
        filter.filter_ver(
            ComponentId::Y,
            FilterVariant::Default,
            &clip,
            &src,
            &mut dst,
            16,
            true,
            true
        ),
        Err(McError::FracOutOfRange { .. })
    ));
}

#[test]
fn test_rounding_parameters() {
    // 10-bit: head room 4
    assert_eq!(filter_rounding(10, true, true), (6, 32));
    assert_eq!(filter_rounding(10, true, false), (2, -8192 << 2));
    assert_eq!(filter_rounding(10, false, true), (10, 512 + (8192 << 6)));
    assert_eq!(filter_rounding(10, false, false), (6, 0));
    assert_eq!(dmvr_rounding(8, true), (2, 2));
    assert_eq!(dmvr_rounding(12, true), (6, 32));
    assert_eq!(dmvr_rounding(10, false), (4, 8));
}
