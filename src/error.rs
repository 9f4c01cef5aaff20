use crate::params::{ComponentId, FilterVariant};

/// Contract violations reported by the prediction entry points.
///
/// Every variant indicates a defect in an upstream collaborator (parser,
/// motion vector derivation, buffer management). None of them are expected
/// while decoding a conforming stream.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum McError {
    #[error("Both reference picture list indices are negative")]
    NoReference,

    #[error("Negative reference picture list index: {0}")]
    NegativeRefIdx(i32),

    #[error("Weighted bi-prediction requested but disabled for this picture")]
    WeightedBiPredDisabled,

    #[error("No weighting parameters signaled for reference index {0}")]
    MissingWeights(usize),

    #[error("No derived weighting parameters for component {0:?}")]
    MissingComponentWeights(ComponentId),

    #[error("Luma-only and chroma-only cannot both be selected")]
    ConflictingComponentSelect,

    #[error("Bit depth {0} outside supported range 8..=12")]
    UnsupportedBitDepth(u8),

    #[error("Invalid clip bounds: min = {min}, max = {max}, bit depth = {bit_depth}")]
    InvalidClipBounds { min: i32, max: i32, bit_depth: u8 },

    #[error("Fractional position {frac} out of range for a {positions}-position table")]
    FracOutOfRange { frac: usize, positions: usize },

    #[error("Filter variant {variant:?} has no tap set for component {comp:?}")]
    UnsupportedVariant {
        variant: FilterVariant,
        comp: ComponentId,
    },

    #[error("Filter support region is outside the reference plane")]
    SupportOutOfBounds,

    #[error("Buffer too small: need {needed} samples, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Stride {stride} is smaller than width {width}")]
    StrideTooSmall { stride: usize, width: usize },

    #[error("Block dimensions do not match: {0}")]
    DimensionMismatch(&'static str),

    #[error("Invalid geometric partition: angle = {angle}, distance = {distance}")]
    InvalidGeoPartition { angle: u8, distance: u8 },

    #[error("Invalid geometric partition mode: {0}")]
    InvalidGeoMode(u8),

    #[error("Unsupported geometric block size {width}x{height}")]
    UnsupportedGeoSize { width: usize, height: usize },
}
