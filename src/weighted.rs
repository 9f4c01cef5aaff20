pub(crate) mod rust;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;


use smallvec::SmallVec;

use crate::{
    block::{UnitBuf, UnitBufMut},
    clip::ClipRangeSet,
    error::McError,
    kernels::KernelSet,
    params::{
        ChromaFormat, ComponentId, ComponentSelect, MAX_BIT_DEPTH, MAX_NUM_COMPONENT,
        MIN_BIT_DEPTH, RefPicList,
    },
};

/// Explicit weighting parameters of one component of one reference picture,
/// as signaled in the slice header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WpScalingParam {
    pub coded_weight: i32,
    pub coded_offset: i32,
    pub log2_weight_denom: u32,
    /// Whether weights were signaled. Absent weights carry the default
    /// weight `1 << log2_weight_denom` and a zero offset.
    pub present: bool,
}

impl WpScalingParam {
    #[must_use]
    pub const fn new(coded_weight: i32, coded_offset: i32, log2_weight_denom: u32) -> Self {
        Self {
            coded_weight,
            coded_offset,
            log2_weight_denom,
            present: true,
        }
    }

    /// Parameters of a reference picture without signaled weights.
    #[must_use]
    pub const fn absent(log2_weight_denom: u32) -> Self {
        Self {
            coded_weight: 1 << log2_weight_denom,
            coded_offset: 0,
            log2_weight_denom,
            present: false,
        }
    }
}

/// Weighting parameters of one component, derived from [`WpScalingParam`]
/// by [`derive_weighting`]. These are what the combiners consume.
///
/// There is no other way to build one:
///
/// ```compile_fail
/// let _ = vvc_mcp::WeightedParams::default();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedParams {
    pub(crate) w: i32,
    pub(crate) o: i32,
    pub(crate) offset: i32,
    pub(crate) shift: i32,
    pub(crate) round: i32,
}

impl WeightedParams {
    #[must_use]
    pub const fn weight(&self) -> i32 {
        self.w
    }

    /// This reference's own offset, scaled to the component bit depth.
    #[must_use]
    pub const fn scaled_offset(&self) -> i32 {
        self.o
    }

    /// The offset applied after weighting. For bi-prediction, the sum of both
    /// references' offsets.
    #[must_use]
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    #[must_use]
    pub const fn shift(&self) -> i32 {
        self.shift
    }

    #[must_use]
    pub const fn round(&self) -> i32 {
        self.round
    }
}

/// Derived parameters, one entry per derived component.
pub type ComponentWeights = SmallVec<[WeightedParams; MAX_NUM_COMPONENT]>;

/// Picture-level weighted-prediction state: the signaled parameters of every
/// reference picture of both lists plus the flags that govern derivation.
#[derive(Debug, Clone)]
pub struct SliceWeights {
    lists: [Vec<[WpScalingParam; MAX_NUM_COMPONENT]>; 2],
    chroma_format: ChromaFormat,
    luma_bit_depth: u8,
    chroma_bit_depth: u8,
    /// Weighted bi-prediction is enabled for the picture.
    pub wp_bi_pred: bool,
    /// Offsets are coded at full bit-depth precision instead of 8-bit.
    pub high_precision_offsets: bool,
}

impl SliceWeights {
    /// # Errors
    /// Fails for bit depths outside 8..=12.
    pub fn new(
        chroma_format: ChromaFormat,
        luma_bit_depth: u8,
        chroma_bit_depth: u8,
    ) -> Result<Self, McError> {
        for bit_depth in [luma_bit_depth, chroma_bit_depth] {
            if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
                return Err(McError::UnsupportedBitDepth(bit_depth));
            }
        }
        Ok(Self {
            lists: [Vec::new(), Vec::new()],
            chroma_format,
            luma_bit_depth,
            chroma_bit_depth,
            wp_bi_pred: false,
            high_precision_offsets: false,
        })
    }

    /// Stores the parameters of reference `ref_idx` in `list`. Unset
    /// reference indices below it are filled with absent parameters.
    pub fn set(
        &mut self,
        list: RefPicList,
        ref_idx: usize,
        params: [WpScalingParam; MAX_NUM_COMPONENT],
    ) {
        let entries = &mut self.lists[list as usize];
        if entries.len() <= ref_idx {
            let fill = [WpScalingParam::absent(params[0].log2_weight_denom); MAX_NUM_COMPONENT];
            entries.resize(ref_idx + 1, fill);
        }
        entries[ref_idx] = params;
    }

    #[must_use]
    pub fn get(
        &self,
        list: RefPicList,
        ref_idx: usize,
    ) -> Option<&[WpScalingParam; MAX_NUM_COMPONENT]> {
        self.lists[list as usize].get(ref_idx)
    }

    #[must_use]
    pub const fn chroma_format(&self) -> ChromaFormat {
        self.chroma_format
    }

    #[must_use]
    pub const fn bit_depth(&self, comp: ComponentId) -> u8 {
        if comp.is_luma() {
            self.luma_bit_depth
        } else {
            self.chroma_bit_depth
        }
    }

    fn lookup(
        &self,
        list: RefPicList,
        ref_idx: i32,
    ) -> Result<&[WpScalingParam; MAX_NUM_COMPONENT], McError> {
        let idx = usize::try_from(ref_idx).map_err(|_| McError::NegativeRefIdx(ref_idx))?;
        self.get(list, idx).ok_or(McError::MissingWeights(idx))
    }

    /// Components that take part in weighting: those of the chroma format, up
    /// to and including `max_comp`.
    fn components(&self, max_comp: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        ComponentId::ALL
            .into_iter()
            .take(self.chroma_format.num_components())
            .filter(move |comp| comp.index() <= max_comp.index())
    }

    /// `max_comp`, lowered to the last component the chroma format carries.
    fn last_component(&self, max_comp: ComponentId) -> ComponentId {
        let last = self.chroma_format.num_components() - 1;
        ComponentId::ALL[last.min(max_comp.index())]
    }

    fn offset_scale(&self, comp: ComponentId) -> i32 {
        if self.high_precision_offsets {
            1
        } else {
            1 << (self.bit_depth(comp) - 8)
        }
    }
}

/// Derives the weighting parameters for a block that references `ref_idx0`
/// in list 0 and `ref_idx1` in list 1. A negative index means the list is
/// unused.
///
/// Bi-prediction returns parameters for both lists, sharing one shift,
/// rounding term and combined offset. Uni-prediction returns parameters for
/// the used list only.
///
/// # Errors
/// - [`McError::NoReference`] if both indices are negative
/// - [`McError::WeightedBiPredDisabled`] for bi-prediction while weighted
///   bi-prediction is disabled for the picture
/// - [`McError::MissingWeights`] if a referenced entry was never set
pub fn derive_weighting(
    ref_idx0: i32,
    ref_idx1: i32,
    slice: &SliceWeights,
    max_comp: ComponentId,
) -> Result<(Option<ComponentWeights>, Option<ComponentWeights>), McError> {
    if ref_idx0 < 0 && ref_idx1 < 0 {
        return Err(McError::NoReference);
    }

    let bi_pred = ref_idx0 >= 0 && ref_idx1 >= 0;
    if bi_pred && !slice.wp_bi_pred {
        return Err(McError::WeightedBiPredDisabled);
    }

    if bi_pred {
        let wp0 = slice.lookup(RefPicList::L0, ref_idx0)?;
        let wp1 = slice.lookup(RefPicList::L1, ref_idx1)?;
        let mut out0 = ComponentWeights::new();
        let mut out1 = ComponentWeights::new();
        for comp in slice.components(max_comp) {
            let scale = slice.offset_scale(comp);
            let (p0, p1) = (&wp0[comp.index()], &wp1[comp.index()]);
            let o0 = p0.coded_offset * scale;
            let o1 = p1.coded_offset * scale;
            let shared = WeightedParams {
                w: 0,
                o: 0,
                offset: o0 + o1,
                shift: p0.log2_weight_denom as i32 + 1,
                round: 1 << p0.log2_weight_denom,
            };
            out0.push(WeightedParams {
                w: p0.coded_weight,
                o: o0,
                ..shared
            });
            out1.push(WeightedParams {
                w: p1.coded_weight,
                o: o1,
                ..shared
            });
        }
        return Ok((Some(out0), Some(out1)));
    }

    let (list, ref_idx) = if ref_idx0 >= 0 {
        (RefPicList::L0, ref_idx0)
    } else {
        (RefPicList::L1, ref_idx1)
    };
    let wp = slice.lookup(list, ref_idx)?;
    let derived = slice
        .components(max_comp)
        .map(|comp| {
            let p = &wp[comp.index()];
            let offset = p.coded_offset * slice.offset_scale(comp);
            WeightedParams {
                w: p.coded_weight,
                o: offset,
                offset,
                shift: p.log2_weight_denom as i32,
                round: (1 << p.log2_weight_denom) >> 1,
            }
        })
        .collect();

    Ok(match list {
        RefPicList::L0 => (Some(derived), None),
        RefPicList::L1 => (None, Some(derived)),
    })
}

/// Resolves the range of components a call operates on.
fn component_range(
    select: ComponentSelect,
    max_comp: ComponentId,
) -> Result<std::ops::RangeInclusive<usize>, McError> {
    if select.contains(ComponentSelect::LUMA_ONLY | ComponentSelect::CHROMA_ONLY) {
        return Err(McError::ConflictingComponentSelect);
    }
    let first = usize::from(select.contains(ComponentSelect::CHROMA_ONLY));
    let last = if select.contains(ComponentSelect::LUMA_ONLY) {
        0
    } else {
        max_comp.index()
    };
    Ok(first..=last)
}

/// Explicit weighted prediction of uni- and bi-predicted blocks.
#[derive(Debug, Clone, Copy)]
pub struct WeightPrediction<'k> {
    kernels: &'k KernelSet,
}

impl WeightPrediction<'static> {
    #[must_use]
    pub fn native() -> Self {
        Self::new(KernelSet::global())
    }
}

impl<'k> WeightPrediction<'k> {
    #[must_use]
    pub const fn new(kernels: &'k KernelSet) -> Self {
        Self { kernels }
    }

    /// Combines two blocks of intermediates into output samples:
    /// `clip((w0 * (s0 + bias) + w1 * (s1 + bias) + round + offset * 2^(shift - 1)) >> shift)`
    /// where `shift` adds the bit-depth head room to the derived shift.
    ///
    /// # Errors
    /// - [`McError::ConflictingComponentSelect`]
    /// - [`McError::DimensionMismatch`] if the planes of one component differ
    ///   in size
    /// - [`McError::MissingComponentWeights`] if a selected component has no
    ///   derived parameters
    pub fn add_weight_bi(
        &self,
        src0: &UnitBuf<'_>,
        src1: &UnitBuf<'_>,
        clip: &ClipRangeSet,
        wp0: &[WeightedParams],
        wp1: &[WeightedParams],
        dst: &mut UnitBufMut<'_>,
        max_comp: ComponentId,
        select: ComponentSelect,
    ) -> Result<(), McError> {
        let range = component_range(select, max_comp)?;
        let kernel = self.kernels.weight_bi();

        for index in range.take_while(|&c| c < src0.len()) {
            let comp = ComponentId::ALL[index];
            let (Some(p0), Some(p1)) = (wp0.get(index), wp1.get(index)) else {
                return Err(McError::MissingComponentWeights(comp));
            };
            let (Some(s0), Some(s1)) = (src0.get(comp), src1.get(comp)) else {
                return Err(McError::DimensionMismatch("missing source plane"));
            };
            let d = dst
                .get_mut(comp)
                .ok_or(McError::DimensionMismatch("missing destination plane"))?;
            if s0.width() != d.width()
                || s0.height() != d.height()
                || s1.width() != d.width()
                || s1.height() != d.height()
            {
                return Err(McError::DimensionMismatch("weighted bi-prediction planes"));
            }

            let range = clip.component(comp);
            let (width, height, dst_stride) = (d.width(), d.height(), d.stride());
            kernel(
                &range,
                s0.data(),
                s0.stride(),
                s1.data(),
                s1.stride(),
                d.data_mut(),
                dst_stride,
                width,
                height,
                p0,
                p1,
            );

            #[cfg(feature = "check_asm")]
            crate::kernels::cross_check(self.kernels, d, |reference, expected| {
                reference.weight_bi()(
                    &range,
                    s0.data(),
                    s0.stride(),
                    s1.data(),
                    s1.stride(),
                    expected,
                    dst_stride,
                    width,
                    height,
                    p0,
                    p1,
                );
            });
        }
        Ok(())
    }

    /// Converts one block of intermediates into weighted output samples.
    ///
    /// # Errors
    /// Same as [`Self::add_weight_bi`].
    pub fn add_weight_uni(
        &self,
        src: &UnitBuf<'_>,
        clip: &ClipRangeSet,
        wp: &[WeightedParams],
        dst: &mut UnitBufMut<'_>,
        max_comp: ComponentId,
        select: ComponentSelect,
    ) -> Result<(), McError> {
        let range = component_range(select, max_comp)?;
        let kernel = self.kernels.weight_uni();

        for index in range.take_while(|&c| c < src.len()) {
            let comp = ComponentId::ALL[index];
            let p = wp
                .get(index)
                .ok_or(McError::MissingComponentWeights(comp))?;
            let s = src
                .get(comp)
                .ok_or(McError::DimensionMismatch("missing source plane"))?;
            let d = dst
                .get_mut(comp)
                .ok_or(McError::DimensionMismatch("missing destination plane"))?;
            if s.width() != d.width() || s.height() != d.height() {
                return Err(McError::DimensionMismatch("weighted uni-prediction planes"));
            }

            let range = clip.component(comp);
            let (width, height, dst_stride) = (d.width(), d.height(), d.stride());
            kernel(
                &range,
                s.data(),
                s.stride(),
                d.data_mut(),
                dst_stride,
                width,
                height,
                p,
            );

            #[cfg(feature = "check_asm")]
            crate::kernels::cross_check(self.kernels, d, |reference, expected| {
                reference.weight_uni()(
                    &range,
                    s.data(),
                    s.stride(),
                    expected,
                    dst_stride,
                    width,
                    height,
                    p,
                );
            });
        }
        Ok(())
    }

    /// Weighted prediction of a block with reference indices `ref_idx`
    /// (list 0, list 1; negative when unused). With one valid index this
    /// degrades to uni-prediction from that list; with none it does nothing.
    ///
    /// # Errors
    /// - [`McError::WeightedBiPredDisabled`] if weighted bi-prediction is
    ///   disabled for the picture
    /// - any error of [`derive_weighting`] or [`Self::add_weight_bi`]
    pub fn weighted_prediction_bi(
        &self,
        slice: &SliceWeights,
        ref_idx: [i32; 2],
        src0: &UnitBuf<'_>,
        src1: &UnitBuf<'_>,
        clip: &ClipRangeSet,
        dst: &mut UnitBufMut<'_>,
        max_comp: ComponentId,
        select: ComponentSelect,
    ) -> Result<(), McError> {
        if !slice.wp_bi_pred {
            return Err(McError::WeightedBiPredDisabled);
        }
        let [ref_idx0, ref_idx1] = ref_idx;
        if ref_idx0 < 0 && ref_idx1 < 0 {
            return Ok(());
        }
        let max_comp = slice.last_component(max_comp);

        match derive_weighting(ref_idx0, ref_idx1, slice, max_comp)? {
            (Some(wp0), Some(wp1)) => {
                self.add_weight_bi(src0, src1, clip, &wp0, &wp1, dst, max_comp, select)
            }
            (Some(wp0), None) => self.add_weight_uni(src0, clip, &wp0, dst, max_comp, select),
            (None, Some(wp1)) => self.add_weight_uni(src1, clip, &wp1, dst, max_comp, select),
            (None, None) => Ok(()),
        }
    }

    /// Weighted prediction from reference `ref_idx` of `list`.
    ///
    /// # Errors
    /// - [`McError::NegativeRefIdx`] if `ref_idx` is negative
    /// - any error of [`derive_weighting`] or [`Self::add_weight_uni`]
    pub fn weighted_prediction_uni(
        &self,
        slice: &SliceWeights,
        list: RefPicList,
        ref_idx: i32,
        src: &UnitBuf<'_>,
        clip: &ClipRangeSet,
        dst: &mut UnitBufMut<'_>,
        max_comp: ComponentId,
        select: ComponentSelect,
    ) -> Result<(), McError> {
        if ref_idx < 0 {
            return Err(McError::NegativeRefIdx(ref_idx));
        }
        let max_comp = slice.last_component(max_comp);

        let derived = match list {
            RefPicList::L0 => derive_weighting(ref_idx, -1, slice, max_comp)?.0,
            RefPicList::L1 => derive_weighting(-1, ref_idx, slice, max_comp)?.1,
        };
        match derived {
            Some(wp) => self.add_weight_uni(src, clip, &wp, dst, max_comp, select),
            None => Ok(()),
        }
    }
}
