//! Registry of the compute kernels used by the prediction engines.
//!
//! A [`KernelSet`] holds exactly one implementation for every kernel shape
//! the engines request: each (tap family, direction, first pass, last pass)
//! combination of the interpolation filter, the integer-position copies, the
//! weighted-prediction combiners and the geometric blender. It is built once
//! and shared by reference; selecting an implementation never happens on the
//! hot path.


use std::{num::NonZeroUsize, sync::OnceLock};

use anyhow::{Result, anyhow, bail};
use cfg_if::cfg_if;
use log::debug;

use crate::{
    clip::ClipRange,
    geo, interp,
    params::{Direction, TapFamily},
    util::Pel,
    weighted::{self, WeightedParams},
};

/// One filter pass along one axis. `src` starts at the first tap of the first
/// output sample.
pub type FilterFn = fn(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    taps: &[i16],
);

/// An integer-position pass.
pub type CopyFn = fn(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
);

pub type WeightBiFn = fn(
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
);

pub type WeightUniFn = fn(
    clip: &ClipRange,
    src: &[Pel],
    src_stride: usize,
    dst: &mut [Pel],
    dst_stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
    wp: &WeightedParams,
);

/// Blends two intermediate blocks with per-sample weights from `mask`. Mask
/// sample `(x, y)` lives at `y * mask_stride + x * mask_step`.
pub type GeoBlendFn = fn(
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
);

/// Instruction set the registered kernels were written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KernelLevel {
    #[default]
    Scalar,
    Avx2,
}

/// Families that can produce output samples, in [`TapFamily`] order.
const FULL_FAMILIES: usize = 3;

#[derive(Debug, Clone, Copy)]
struct FilterTable {
    /// `[family][first][last]`
    families: [[[FilterFn; 2]; 2]; FULL_FAMILIES],
    /// `[first]`; the refinement path never produces output samples.
    dmvr: [FilterFn; 2],
}

/// The immutable set of kernels shared by every prediction engine.
#[derive(Debug, Clone, Copy)]
pub struct KernelSet {
    level: KernelLevel,
    /// `[direction]`
    filter: [FilterTable; 2],
    /// `[first][last]`
    copy: [[CopyFn; 2]; 2],
    copy_dmvr: CopyFn,
    weight_bi: WeightBiFn,
    weight_uni: WeightUniFn,
    geo_blend: GeoBlendFn,
}

macro_rules! filter_family {
    ($module:ident, $taps:literal, $vertical:literal) => {
        [
            [
                $module::filter::<$taps, $vertical, false, false>,
                $module::filter::<$taps, $vertical, false, true>,
            ],
            [
                $module::filter::<$taps, $vertical, true, false>,
                $module::filter::<$taps, $vertical, true, true>,
            ],
        ]
    };
}

macro_rules! filter_table {
    ($module:ident, $vertical:literal) => {
        FilterTable {
            families: [
                filter_family!($module, 8, $vertical),
                filter_family!($module, 6, $vertical),
                filter_family!($module, 4, $vertical),
            ],
            dmvr: [
                $module::filter_dmvr::<$vertical, false>,
                $module::filter_dmvr::<$vertical, true>,
            ],
        }
    };
}

static REFERENCE: KernelSet = KernelSet::scalar();

impl KernelSet {
    /// Portable kernels. Always available.
    #[must_use]
    pub const fn scalar() -> Self {
        use interp::rust;

        Self {
            level: KernelLevel::Scalar,
            filter: [filter_table!(rust, false), filter_table!(rust, true)],
            copy: [
                [rust::copy::<false, false>, rust::copy::<false, true>],
                [rust::copy::<true, false>, rust::copy::<true, true>],
            ],
            copy_dmvr: rust::copy_dmvr,
            weight_bi: weighted::rust::weight_bi,
            weight_uni: weighted::rust::weight_uni,
            geo_blend: geo::rust::blend,
        }
    }

    /// The best kernels the running CPU supports.
    #[must_use]
    pub fn native() -> Self {
        cfg_if! {
            if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
                if crate::util::has_avx2() {
                    debug!("using AVX2 prediction kernels");
                    return Self::avx2();
                }
            }
        }

        debug!("using scalar prediction kernels");
        Self::scalar()
    }

    /// The process-wide kernel set, selected on first use.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<KernelSet> = OnceLock::new();
        GLOBAL.get_or_init(Self::native)
    }

    /// The scalar kernels vectorized output is checked against.
    #[must_use]
    pub fn reference() -> &'static Self {
        &REFERENCE
    }

    #[cfg(target_arch = "x86_64")]
    #[cfg_attr(feature = "no_simd", allow(dead_code))]
    fn avx2() -> Self {
        Self {
            level: KernelLevel::Avx2,
            filter: [filter_table!(avx2, false), filter_table!(avx2, true)],
            copy: [
                [avx2::copy::<false, false>, avx2::copy::<false, true>],
                [avx2::copy::<true, false>, avx2::copy::<true, true>],
            ],
            copy_dmvr: interp::rust::copy_dmvr,
            weight_bi: avx2::weight_bi,
            weight_uni: avx2::weight_uni,
            geo_blend: avx2::geo_blend,
        }
    }

    #[must_use]
    pub const fn level(&self) -> KernelLevel {
        self.level
    }

    /// The filter kernel for one pass.
    ///
    /// The refinement family has no output-precision pass; `last` is
    /// ignored for it.
    #[must_use]
    pub fn filter(&self, dir: Direction, family: TapFamily, first: bool, last: bool) -> FilterFn {
        let table = &self.filter[dir as usize];
        match family {
            TapFamily::TwoDmvr => {
                debug_assert!(!last);
                table.dmvr[usize::from(first)]
            }
            _ => table.families[family as usize][usize::from(first)][usize::from(last)],
        }
    }

    #[must_use]
    pub fn copy(&self, first: bool, last: bool, dmvr: bool) -> CopyFn {
        if dmvr && first && !last {
            self.copy_dmvr
        } else {
            self.copy[usize::from(first)][usize::from(last)]
        }
    }

    #[must_use]
    pub const fn weight_bi(&self) -> WeightBiFn {
        self.weight_bi
    }

    #[must_use]
    pub const fn weight_uni(&self) -> WeightUniFn {
        self.weight_uni
    }

    #[must_use]
    pub const fn geo_blend(&self) -> GeoBlendFn {
        self.geo_blend
    }
}

/// Safe entry points for the AVX2 kernels. Only reachable through the set
/// built by [`KernelSet::native`] after AVX2 support was detected.
#[cfg(target_arch = "x86_64")]
mod avx2 {
    use std::num::NonZeroUsize;

    use crate::{clip::ClipRange, geo, interp, util::Pel, weighted::WeightedParams};

    pub(super) fn filter<
        const N: usize,
        const VERTICAL: bool,
        const FIRST: bool,
        const LAST: bool,
    >(
        clip: &ClipRange,
        src: &[Pel],
        src_stride: usize,
        dst: &mut [Pel],
        dst_stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
        taps: &[i16],
    ) {
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            interp::avx2::filter::<N, VERTICAL, FIRST, LAST>(
                clip, src, src_stride, dst, dst_stride, width, height, taps,
            );
        }
    }

    pub(super) fn filter_dmvr<const VERTICAL: bool, const FIRST: bool>(
        clip: &ClipRange,
        src: &[Pel],
        src_stride: usize,
        dst: &mut [Pel],
        dst_stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
        taps: &[i16],
    ) {
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            interp::avx2::filter_dmvr::<VERTICAL, FIRST>(
                clip, src, src_stride, dst, dst_stride, width, height, taps,
            );
        }
    }

    pub(super) fn copy<const FIRST: bool, const LAST: bool>(
        clip: &ClipRange,
        src: &[Pel],
        src_stride: usize,
        dst: &mut [Pel],
        dst_stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
    ) {
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            interp::avx2::copy::<FIRST, LAST>(
                clip, src, src_stride, dst, dst_stride, width, height,
            );
        }
    }

    pub(super) fn weight_bi(
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
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            crate::weighted::avx2::weight_bi(
                clip,
                src0,
                src0_stride,
                src1,
                src1_stride,
                dst,
                dst_stride,
                width,
                height,
                wp0,
                wp1,
            );
        }
    }

    pub(super) fn weight_uni(
        clip: &ClipRange,
        src: &[Pel],
        src_stride: usize,
        dst: &mut [Pel],
        dst_stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
        wp: &WeightedParams,
    ) {
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            crate::weighted::avx2::weight_uni(
                clip, src, src_stride, dst, dst_stride, width, height, wp,
            );
        }
    }

    pub(super) fn geo_blend(
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
        // SAFETY: AVX2 support was checked before this kernel was registered.
        unsafe {
            geo::avx2::blend(
                clip,
                src0,
                src0_stride,
                src1,
                src1_stride,
                dst,
                dst_stride,
                width,
                height,
                mask,
                mask_stride,
                mask_step,
            );
        }
    }
}

/// Assembles a [`KernelSet`] slot by slot.
///
/// Every slot must be filled before [`KernelSetBuilder::build`] succeeds.
/// Starting from an existing set with [`KernelSetBuilder::from_set`] and
/// overriding individual slots is the usual way to test a new kernel.
#[derive(Debug, Clone, Default)]
pub struct KernelSetBuilder {
    level: KernelLevel,
    filter: [[[[Option<FilterFn>; 2]; 2]; FULL_FAMILIES]; 2],
    dmvr: [[Option<FilterFn>; 2]; 2],
    copy: [[Option<CopyFn>; 2]; 2],
    copy_dmvr: Option<CopyFn>,
    weight_bi: Option<WeightBiFn>,
    weight_uni: Option<WeightUniFn>,
    geo_blend: Option<GeoBlendFn>,
}

impl KernelSetBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new(level: KernelLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// A builder with every slot taken from `set`.
    #[must_use]
    pub fn from_set(set: &KernelSet) -> Self {
        let mut builder = Self::new(set.level);
        for dir in 0..2 {
            for family in 0..FULL_FAMILIES {
                for first in 0..2 {
                    for last in 0..2 {
                        builder.filter[dir][family][first][last] =
                            Some(set.filter[dir].families[family][first][last]);
                    }
                }
            }
            for first in 0..2 {
                builder.dmvr[dir][first] = Some(set.filter[dir].dmvr[first]);
            }
        }
        for first in 0..2 {
            for last in 0..2 {
                builder.copy[first][last] = Some(set.copy[first][last]);
            }
        }
        builder.copy_dmvr = Some(set.copy_dmvr);
        builder.weight_bi = Some(set.weight_bi);
        builder.weight_uni = Some(set.weight_uni);
        builder.geo_blend = Some(set.geo_blend);
        builder
    }

    /// Registers the filter kernel for one pass shape.
    ///
    /// # Errors
    /// The refinement family cannot be registered for an output pass.
    pub fn filter(
        mut self,
        dir: Direction,
        family: TapFamily,
        first: bool,
        last: bool,
        kernel: FilterFn,
    ) -> Result<Self> {
        if family == TapFamily::TwoDmvr {
            if last {
                bail!("The {family:?} family has no output pass; cannot register first={first} last=true.");
            }
            self.dmvr[dir as usize][usize::from(first)] = Some(kernel);
        } else {
            self.filter[dir as usize][family as usize][usize::from(first)][usize::from(last)] =
                Some(kernel);
        }
        Ok(self)
    }

    #[must_use]
    pub fn copy(mut self, first: bool, last: bool, kernel: CopyFn) -> Self {
        self.copy[usize::from(first)][usize::from(last)] = Some(kernel);
        self
    }

    #[must_use]
    pub fn copy_dmvr(mut self, kernel: CopyFn) -> Self {
        self.copy_dmvr = Some(kernel);
        self
    }

    #[must_use]
    pub fn weight_bi(mut self, kernel: WeightBiFn) -> Self {
        self.weight_bi = Some(kernel);
        self
    }

    #[must_use]
    pub fn weight_uni(mut self, kernel: WeightUniFn) -> Self {
        self.weight_uni = Some(kernel);
        self
    }

    #[must_use]
    pub fn geo_blend(mut self, kernel: GeoBlendFn) -> Self {
        self.geo_blend = Some(kernel);
        self
    }

    /// # Errors
    /// Fails naming the first slot left empty.
    pub fn build(self) -> Result<KernelSet> {
        let mut set = KernelSet::scalar();
        set.level = self.level;

        for (dir, direction) in [Direction::Horizontal, Direction::Vertical]
            .into_iter()
            .enumerate()
        {
            for family in TapFamily::ALL {
                for first in [false, true] {
                    for last in [false, true] {
                        let (f, l) = (usize::from(first), usize::from(last));
                        let kernel = match family {
                            TapFamily::TwoDmvr if last => continue,
                            TapFamily::TwoDmvr => self.dmvr[dir][f],
                            _ => self.filter[dir][family as usize][f][l],
                        }
                        .ok_or_else(|| {
                            anyhow!(
                                "No filter kernel registered for {direction:?} {family:?} first={first} last={last}."
                            )
                        })?;
                        match family {
                            TapFamily::TwoDmvr => set.filter[dir].dmvr[f] = kernel,
                            _ => set.filter[dir].families[family as usize][f][l] = kernel,
                        }
                    }
                }
            }
        }

        for first in [false, true] {
            for last in [false, true] {
                set.copy[usize::from(first)][usize::from(last)] = self.copy
                    [usize::from(first)][usize::from(last)]
                .ok_or_else(|| {
                    anyhow!("No copy kernel registered for first={first} last={last}.")
                })?;
            }
        }
        set.copy_dmvr = self
            .copy_dmvr
            .ok_or_else(|| anyhow!("No refinement copy kernel registered."))?;
        set.weight_bi = self
            .weight_bi
            .ok_or_else(|| anyhow!("No bi-directional weighting kernel registered."))?;
        set.weight_uni = self
            .weight_uni
            .ok_or_else(|| anyhow!("No uni-directional weighting kernel registered."))?;
        set.geo_blend = self
            .geo_blend
            .ok_or_else(|| anyhow!("No geometric blend kernel registered."))?;

        Ok(set)
    }
}

/// Re-runs a kernel call with the reference kernels and asserts both wrote
/// the same samples into `dst`.
#[cfg(feature = "check_asm")]
pub(crate) fn cross_check(
    kernels: &KernelSet,
    dst: &crate::block::PlaneMut<'_>,
    run: impl FnOnce(&KernelSet, &mut [Pel]),
) {
    if kernels.level() == KernelLevel::Scalar {
        return;
    }

    let width = dst.width().get();
    let height = dst.height().get();
    let stride = dst.stride();
    let mut expected = vec![0; crate::util::plane_extent(stride, width, height)];
    run(KernelSet::reference(), &mut expected);
    for y in 0..height {
        assert_eq!(
            &dst.data()[y * stride..][..width],
            &expected[y * stride..][..width],
            "{:?} kernel diverged from scalar at row {}",
            kernels.level(),
            y
        );
    }
}
