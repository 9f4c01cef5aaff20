#[cfg(test)]
mod tests;

use crate::{
    error::McError,
    params::{ComponentId, MAX_BIT_DEPTH, MAX_NUM_COMPONENT, MIN_BIT_DEPTH, internal_frac_bits},
    util::Pel,
};

/// Output bounds of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRange {
    pub min: i32,
    pub max: i32,
    pub bit_depth: u8,
}

impl ClipRange {
    /// The full range `0..=(1 << bit_depth) - 1`.
    pub fn new(bit_depth: u8) -> Result<Self, McError> {
        if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
            return Err(McError::UnsupportedBitDepth(bit_depth));
        }
        Self::with_bounds(0, (1 << bit_depth) - 1, bit_depth)
    }

    /// A range narrower than the bit depth allows, e.g. for studio-swing
    /// output.
    pub fn with_bounds(min: i32, max: i32, bit_depth: u8) -> Result<Self, McError> {
        if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
            return Err(McError::UnsupportedBitDepth(bit_depth));
        }
        if min < 0 || min > max || max >= 1 << bit_depth {
            return Err(McError::InvalidClipBounds {
                min,
                max,
                bit_depth,
            });
        }
        Ok(Self {
            min,
            max,
            bit_depth,
        })
    }

    #[inline]
    #[must_use]
    pub fn clip(&self, value: i32) -> Pel {
        value.clamp(self.min, self.max) as Pel
    }

    /// `max(2, 14 - bit_depth)`.
    #[inline]
    #[must_use]
    pub const fn frac_bits(&self) -> u32 {
        internal_frac_bits(self.bit_depth)
    }
}

/// Per-component clip bounds of one prediction operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRangeSet {
    comp: [ClipRange; MAX_NUM_COMPONENT],
    /// Whether the explicit bounds apply. When unset, every component is
    /// clipped to its full bit-depth range.
    pub used: bool,
    /// Whether chroma is clipped with its own bounds.
    pub chroma: bool,
}

impl ClipRangeSet {
    /// Full-range clipping at the given luma and chroma bit depths.
    pub fn new(luma_bit_depth: u8, chroma_bit_depth: u8) -> Result<Self, McError> {
        let luma = ClipRange::new(luma_bit_depth)?;
        let chroma = ClipRange::new(chroma_bit_depth)?;
        Ok(Self {
            comp: [luma, chroma, chroma],
            used: false,
            chroma: false,
        })
    }

    #[must_use]
    pub const fn with_ranges(comp: [ClipRange; MAX_NUM_COMPONENT], chroma: bool) -> Self {
        Self {
            comp,
            used: true,
            chroma,
        }
    }

    /// The bounds that apply to `comp`.
    #[must_use]
    pub fn component(&self, comp: ComponentId) -> ClipRange {
        let range = self.comp[comp.index()];
        if self.used && (comp.is_luma() || self.chroma) {
            range
        } else {
            ClipRange {
                min: 0,
                max: (1 << range.bit_depth) - 1,
                bit_depth: range.bit_depth,
            }
        }
    }
}
