pub(crate) mod rust;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;

#[cfg(test)]
mod tests;

use std::{num::NonZeroUsize, sync::Arc};

use log::trace;

use crate::{
    block::{PlaneMut, RefWindow},
    clip::ClipRange,
    error::McError,
    kernels::KernelSet,
    observer::{BandwidthObserver, ReadRegion},
    params::{
        ComponentId, Direction, FilterVariant, IF_FILTER_PREC, IF_FILTER_PREC_BILINEAR,
        IF_INTERNAL_OFFS, IF_INTERNAL_PREC_BILINEAR, TapFamily, internal_frac_bits,
    },
    tables::{self, is_identity},
    util::Pel,
};

/// Shift and rounding offset of a filter pass.
///
/// A pass that produces output samples rounds to the nearest value and, when
/// it reads intermediates, adds the bias back. A pass that produces
/// intermediates only removes the bias; it does not round.
#[must_use]
pub(crate) const fn filter_rounding(bit_depth: u8, first: bool, last: bool) -> (i32, i32) {
    let head_room = internal_frac_bits(bit_depth) as i32;
    let prec = IF_FILTER_PREC as i32;
    if last {
        let shift = prec + if first { 0 } else { head_room };
        let offset = (1 << (shift - 1)) + if first { 0 } else { IF_INTERNAL_OFFS << prec };
        (shift, offset)
    } else {
        let shift = prec - if first { head_room } else { 0 };
        let offset = if first { -IF_INTERNAL_OFFS << shift } else { 0 };
        (shift, offset)
    }
}

/// Shift and rounding offset of a refinement pass. Both passes round; the
/// first converts native samples to the 10-bit refinement precision.
#[must_use]
pub(crate) const fn dmvr_rounding(bit_depth: u8, first: bool) -> (i32, i32) {
    let shift = if first {
        IF_FILTER_PREC_BILINEAR as i32 - (IF_INTERNAL_PREC_BILINEAR as i32 - bit_depth as i32)
    } else {
        4
    };
    (shift, 1 << (shift - 1))
}

/// Refinement taps are stored at 6-bit precision and applied at 4-bit.
#[inline]
#[must_use]
pub(crate) fn dmvr_coeffs(taps: &[i16]) -> [i32; 2] {
    let shift = IF_FILTER_PREC - IF_FILTER_PREC_BILINEAR;
    [i32::from(taps[0]) >> shift, i32::from(taps[1]) >> shift]
}

/// Samples of scratch memory [`InterpolationFilter::filter_2d`] needs for a
/// `width` x `height` block.
#[must_use]
pub fn scratch_len(
    variant: FilterVariant,
    comp: ComponentId,
    width: NonZeroUsize,
    height: NonZeroUsize,
) -> usize {
    let taps = variant.family(comp.is_luma()).taps();
    width.get() * (height.get() + taps - 1)
}

/// Fractional-sample interpolation of reference blocks.
///
/// Produces either output samples (clipped to the component's range) or
/// 14-bit intermediates for a later weighting stage. All work is delegated to
/// the kernels of a [`KernelSet`]; this type resolves tap sets, validates the
/// filter support and reports reads to an attached observer.
#[derive(Clone)]
pub struct InterpolationFilter<'k> {
    kernels: &'k KernelSet,
    observer: Option<Arc<dyn BandwidthObserver>>,
}

impl std::fmt::Debug for InterpolationFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolationFilter")
            .field("kernels", &self.kernels.level())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl InterpolationFilter<'static> {
    /// An engine using the process-wide kernel set.
    #[must_use]
    pub fn native() -> Self {
        Self::new(KernelSet::global())
    }
}

impl<'k> InterpolationFilter<'k> {
    #[must_use]
    pub const fn new(kernels: &'k KernelSet) -> Self {
        Self {
            kernels,
            observer: None,
        }
    }

    #[must_use]
    pub const fn kernels(&self) -> &'k KernelSet {
        self.kernels
    }

    /// Reports every reference region read by a first pass to `observer`.
    /// Replaces any observer attached earlier.
    pub fn attach_observer(&mut self, observer: Arc<dyn BandwidthObserver>) {
        trace!("attaching bandwidth observer");
        self.observer = Some(observer);
    }

    pub fn detach_observer(&mut self) -> Option<Arc<dyn BandwidthObserver>> {
        trace!("detaching bandwidth observer");
        self.observer.take()
    }

    /// Horizontal interpolation of the block at the window origin. Always a
    /// first pass.
    ///
    /// # Errors
    /// - [`McError::FracOutOfRange`] or [`McError::UnsupportedVariant`] for
    ///   an invalid tap set selection
    /// - [`McError::UnsupportedVariant`] when a refinement pass is asked for
    ///   output samples
    /// - [`McError::SupportOutOfBounds`] when the plane border is too small
    pub fn filter_hor(
        &self,
        comp: ComponentId,
        variant: FilterVariant,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        frac: usize,
        is_last: bool,
    ) -> Result<(), McError> {
        self.filter_axis(
            Direction::Horizontal,
            comp,
            variant,
            clip,
            src,
            dst,
            frac,
            true,
            is_last,
        )
    }

    /// Vertical interpolation of the block at the window origin. With
    /// `is_first == false` the window is expected to hold intermediates.
    ///
    /// # Errors
    /// Same as [`Self::filter_hor`].
    pub fn filter_ver(
        &self,
        comp: ComponentId,
        variant: FilterVariant,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        frac: usize,
        is_first: bool,
        is_last: bool,
    ) -> Result<(), McError> {
        self.filter_axis(
            Direction::Vertical,
            comp,
            variant,
            clip,
            src,
            dst,
            frac,
            is_first,
            is_last,
        )
    }

    /// Full interpolation of a block at (`frac_x`, `frac_y`).
    ///
    /// Integer positions along an axis skip that axis. When both axes filter,
    /// the horizontal pass writes `height + taps - 1` rows of intermediates
    /// into `tmp` (see [`scratch_len`]) and the vertical pass reads them back.
    ///
    /// # Errors
    /// Same as [`Self::filter_hor`], plus [`McError::BufferTooSmall`] if
    /// `tmp` is too short.
    pub fn filter_2d(
        &self,
        comp: ComponentId,
        variant: FilterVariant,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        frac_x: usize,
        frac_y: usize,
        is_last: bool,
        tmp: &mut [Pel],
    ) -> Result<(), McError> {
        let family = variant.family(comp.is_luma());
        if is_last && !family.supports_last() {
            return Err(McError::UnsupportedVariant { variant, comp });
        }
        let taps_x = tables::taps(variant, comp, frac_x)?;
        let taps_y = tables::taps(variant, comp, frac_y)?;
        let dmvr = family == TapFamily::TwoDmvr;

        match (is_identity(taps_x), is_identity(taps_y)) {
            (true, true) => self.copy(clip, src, dst, true, is_last, dmvr),
            (false, true) => self.pass(
                Direction::Horizontal,
                family,
                true,
                is_last,
                clip,
                src,
                dst.reborrow(),
                taps_x,
            ),
            (true, false) => self.pass(
                Direction::Vertical,
                family,
                true,
                is_last,
                clip,
                src,
                dst.reborrow(),
                taps_y,
            ),
            (false, false) => {
                let half = taps_y.len() / 2 - 1;
                let width = dst.width();
                let rows = dst.height().saturating_add(taps_y.len() - 1);
                let needed = width.get() * rows.get();
                if tmp.len() < needed {
                    return Err(McError::BufferTooSmall {
                        needed,
                        available: tmp.len(),
                    });
                }

                let above = src.shifted_up(half)?;
                let intermediate = PlaneMut::new(&mut tmp[..needed], width.get(), width, rows)?;
                self.pass(
                    Direction::Horizontal,
                    family,
                    true,
                    false,
                    clip,
                    &above,
                    intermediate,
                    taps_x,
                )?;

                let window = RefWindow::new(&tmp[..needed], width.get(), half * width.get())?;
                self.pass(
                    Direction::Vertical,
                    family,
                    false,
                    is_last,
                    clip,
                    &window,
                    dst.reborrow(),
                    taps_y,
                )
            }
        }
    }

    /// Bilinear interpolation for decoder-side motion vector refinement.
    /// Produces 10-bit refinement-precision samples, never output samples.
    ///
    /// # Errors
    /// Same as [`Self::filter_2d`].
    pub fn filter_dmvr(
        &self,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        frac_x: usize,
        frac_y: usize,
        tmp: &mut [Pel],
    ) -> Result<(), McError> {
        self.filter_2d(
            ComponentId::Y,
            FilterVariant::Dmvr,
            clip,
            src,
            dst,
            frac_x,
            frac_y,
            false,
            tmp,
        )
    }

    fn filter_axis(
        &self,
        dir: Direction,
        comp: ComponentId,
        variant: FilterVariant,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        frac: usize,
        is_first: bool,
        is_last: bool,
    ) -> Result<(), McError> {
        let family = variant.family(comp.is_luma());
        if is_last && !family.supports_last() {
            return Err(McError::UnsupportedVariant { variant, comp });
        }
        let taps = tables::taps(variant, comp, frac)?;
        if is_identity(taps) {
            return self.copy(
                clip,
                src,
                dst,
                is_first,
                is_last,
                family == TapFamily::TwoDmvr,
            );
        }
        self.pass(
            dir,
            family,
            is_first,
            is_last,
            clip,
            src,
            dst.reborrow(),
            taps,
        )
    }

    fn report(&self, region: ReadRegion) {
        if let Some(observer) = &self.observer {
            observer.on_read(region);
        }
    }

    fn pass(
        &self,
        dir: Direction,
        family: TapFamily,
        first: bool,
        last: bool,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        mut dst: PlaneMut<'_>,
        taps: &[i16],
    ) -> Result<(), McError> {
        let n = taps.len();
        debug_assert_eq!(n, family.taps());
        let half = n / 2 - 1;
        let width = dst.width();
        let height = dst.height();
        let (left, above, span_w, span_h) = match dir {
            Direction::Horizontal => (half, 0, width.get() + n - 1, height.get()),
            Direction::Vertical => (0, half, width.get(), height.get() + n - 1),
        };
        let start = src.support(left, above, span_w, span_h)?;
        if first {
            self.report(ReadRegion {
                start,
                stride: src.stride(),
                width: span_w,
                height: span_h,
            });
        }

        let src_stride = src.stride();
        let src = &src.data()[start..];
        let dst_stride = dst.stride();
        let kernel = self.kernels.filter(dir, family, first, last);
        kernel(
            clip,
            src,
            src_stride,
            dst.data_mut(),
            dst_stride,
            width,
            height,
            taps,
        );

        #[cfg(feature = "check_asm")]
        crate::kernels::cross_check(self.kernels, &dst, |reference, expected| {
            reference.filter(dir, family, first, last)(
                clip, src, src_stride, expected, dst_stride, width, height, taps,
            );
        });

        Ok(())
    }

    fn copy(
        &self,
        clip: &ClipRange,
        src: &RefWindow<'_>,
        dst: &mut PlaneMut<'_>,
        first: bool,
        last: bool,
        dmvr: bool,
    ) -> Result<(), McError> {
        let width = dst.width();
        let height = dst.height();
        let start = src.support(0, 0, width.get(), height.get())?;
        if first {
            self.report(ReadRegion {
                start,
                stride: src.stride(),
                width: width.get(),
                height: height.get(),
            });
        }

        let src_stride = src.stride();
        let src = &src.data()[start..];
        let dst_stride = dst.stride();
        let kernel = self.kernels.copy(first, last, dmvr);
        kernel(clip, src, src_stride, dst.data_mut(), dst_stride, width, height);

        #[cfg(feature = "check_asm")]
        crate::kernels::cross_check(self.kernels, dst, |reference, expected| {
            reference.copy(first, last, dmvr)(
                clip, src, src_stride, expected, dst_stride, width, height,
            );
        });

        Ok(())
    }
}
