
use bitflags::bitflags;

use anyhow::{Result, bail};

/// Number of bits for internal precision
pub const IF_INTERNAL_PREC: u32 = 14;
/// Log2 of the sum of filter taps
pub const IF_FILTER_PREC: u32 = 6;
/// Bias subtracted from intermediate samples so they are centred on zero
pub const IF_INTERNAL_OFFS: i32 = 1 << (IF_INTERNAL_PREC - 1);
/// Internal precision of the decoder-side refinement path
pub const IF_INTERNAL_PREC_BILINEAR: u32 = 10;
/// Coefficient precision of the decoder-side refinement path. Keeps
/// intermediates within 16 bits for the vectorized kernels.
pub const IF_FILTER_PREC_BILINEAR: u32 = 4;

pub const MIN_BIT_DEPTH: u8 = 8;
/// Highest bit depth whose 14-bit intermediates fit a [`crate::Pel`] for
/// every tap set.
pub const MAX_BIT_DEPTH: u8 = 12;

pub const NTAPS_LUMA: usize = 8;
pub const NTAPS_LUMA_AFFINE: usize = 6;
pub const NTAPS_CHROMA: usize = 4;
pub const NTAPS_BILINEAR: usize = 2;

pub const MV_FRAC_BITS_LUMA: u32 = 4;
pub const MV_FRAC_BITS_CHROMA: u32 = MV_FRAC_BITS_LUMA + 1;
pub const LUMA_FRAC_POSITIONS: usize = 1 << MV_FRAC_BITS_LUMA;
pub const CHROMA_FRAC_POSITIONS: usize = 1 << MV_FRAC_BITS_CHROMA;

pub const MAX_NUM_COMPONENT: usize = 3;

/// Fractional bits between native samples and the 14-bit internal
/// representation. Never below 2, so high bit depths still keep some headroom.
#[must_use]
pub const fn internal_frac_bits(bit_depth: u8) -> u32 {
    let bits = IF_INTERNAL_PREC as i32 - bit_depth as i32;
    if bits < 2 { 2 } else { bits as u32 }
}

/// Selects the coefficient table and rounding rule of an interpolation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterVariant {
    Default = 0,
    /// Decoder-side motion vector refinement, 2-tap at reduced precision.
    Dmvr = 1,
    Affine = 2,
    /// Reference picture resampling, scaling ratio up to 1.5x.
    ResampleHalf = 3,
    /// Reference picture resampling, scaling ratio up to 2x.
    ResampleDouble = 4,
    AffineResampleHalf = 5,
    AffineResampleDouble = 6,
    /// Smoothing taps at the luma half-sample position.
    HalfPelAlternate = 7,
}

impl TryFrom<i64> for FilterVariant {
    type Error = anyhow::Error;

    fn try_from(val: i64) -> Result<Self> {
        Ok(match val {
            0 => Self::Default,
            1 => Self::Dmvr,
            2 => Self::Affine,
            3 => Self::ResampleHalf,
            4 => Self::ResampleDouble,
            5 => Self::AffineResampleHalf,
            6 => Self::AffineResampleDouble,
            7 => Self::HalfPelAlternate,
            _ => bail!("Invalid value for filter variant, must be 0-7, got {val}."),
        })
    }
}

impl FilterVariant {
    /// The tap family used for the given channel.
    #[must_use]
    pub const fn family(self, luma: bool) -> TapFamily {
        if !luma {
            return TapFamily::Four;
        }
        match self {
            Self::Dmvr => TapFamily::TwoDmvr,
            Self::Affine | Self::AffineResampleHalf | Self::AffineResampleDouble => TapFamily::Six,
            Self::Default | Self::ResampleHalf | Self::ResampleDouble | Self::HalfPelAlternate => {
                TapFamily::Eight
            }
        }
    }
}

/// The closed set of kernel shapes. Every (family, first, last) combination
/// that the engine requests has exactly one registered implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapFamily {
    Eight = 0,
    Six = 1,
    Four = 2,
    TwoDmvr = 3,
}

impl TapFamily {
    pub const COUNT: usize = 4;
    pub const ALL: [TapFamily; Self::COUNT] = [Self::Eight, Self::Six, Self::Four, Self::TwoDmvr];

    #[must_use]
    pub const fn taps(self) -> usize {
        match self {
            Self::Eight => NTAPS_LUMA,
            Self::Six => NTAPS_LUMA_AFFINE,
            Self::Four => NTAPS_CHROMA,
            Self::TwoDmvr => NTAPS_BILINEAR,
        }
    }

    /// Whether the family can produce output-precision samples. The refinement
    /// path only ever produces intermediates.
    #[must_use]
    pub const fn supports_last(self) -> bool {
        !matches!(self, Self::TwoDmvr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal = 0,
    Vertical = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Y = 0,
    Cb = 1,
    Cr = 2,
}

impl ComponentId {
    pub const ALL: [ComponentId; MAX_NUM_COMPONENT] = [Self::Y, Self::Cb, Self::Cr];

    #[must_use]
    pub const fn is_luma(self) -> bool {
        matches!(self, Self::Y)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for ComponentId {
    type Error = anyhow::Error;

    fn try_from(val: usize) -> Result<Self> {
        Ok(match val {
            0 => Self::Y,
            1 => Self::Cb,
            2 => Self::Cr,
            _ => bail!("Invalid component index, must be 0-2, got {val}."),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaFormat {
    Monochrome = 0,
    Yuv420 = 1,
    Yuv422 = 2,
    Yuv444 = 3,
}

impl TryFrom<i64> for ChromaFormat {
    type Error = anyhow::Error;

    fn try_from(val: i64) -> Result<Self> {
        Ok(match val {
            0 => Self::Monochrome,
            1 => Self::Yuv420,
            2 => Self::Yuv422,
            3 => Self::Yuv444,
            _ => bail!("Invalid value for chroma format, must be 0-3, got {val}."),
        })
    }
}

impl ChromaFormat {
    #[must_use]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Monochrome => 1,
            _ => MAX_NUM_COMPONENT,
        }
    }

    /// log2 of the horizontal subsampling factor of `comp`.
    #[must_use]
    pub const fn scale_x(self, comp: ComponentId) -> u32 {
        match (self, comp) {
            (_, ComponentId::Y) => 0,
            (Self::Yuv420 | Self::Yuv422, _) => 1,
            _ => 0,
        }
    }

    /// log2 of the vertical subsampling factor of `comp`.
    #[must_use]
    pub const fn scale_y(self, comp: ComponentId) -> u32 {
        match (self, comp) {
            (_, ComponentId::Y) => 0,
            (Self::Yuv420, _) => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefPicList {
    L0 = 0,
    L1 = 1,
}

bitflags! {
    /// Restricts a weighted-prediction call to a subset of components.
    /// Empty means every component; both flags at once is a contract error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComponentSelect: u8 {
        const LUMA_ONLY = 0x01;
        const CHROMA_ONLY = 0x02;
    }
}
