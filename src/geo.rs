//! Geometric partition blending.
//!
//! A geometric partition splits a block along a straight line given by an
//! angle and a distance from the block centre. The two uni-predicted blocks
//! are blended with per-sample weights `w` and `8 - w` that ramp across the
//! split line.

pub(crate) mod rust;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;


use std::sync::OnceLock;

use log::debug;

use crate::{
    block::{PlaneMut, PlaneRef},
    clip::ClipRange,
    error::McError,
    kernels::KernelSet,
    params::{ChromaFormat, ComponentId},
};

pub const GEO_NUM_ANGLES: usize = 32;
pub const GEO_NUM_DISTANCES: usize = 4;
pub const GEO_NUM_PARTITION_MODES: usize = 64;
pub const GEO_MIN_SIZE_LOG2: u32 = 3;
pub const GEO_MAX_SIZE_LOG2: u32 = 6;
/// Total blending weight of the two predictions at every sample.
pub const GEO_WEIGHT_SUM: u8 = 8;

const NUM_SIZES: usize = (GEO_MAX_SIZE_LOG2 - GEO_MIN_SIZE_LOG2 + 1) as usize;

/// Displacement of the split line per angle step.
const DIS_LUT: [i32; GEO_NUM_ANGLES] = [
    8, 8, 8, 8, 4, 4, 2, 1, 0, -1, -2, -4, -4, -8, -8, -8, //
    -8, -8, -8, -8, -4, -4, -2, -1, 0, 1, 2, 4, 4, 8, 8, 8,
];

/// Angles with a usable split line. The others repeat a line at a
/// neighbouring angle.
const ANGLE_USED: [bool; GEO_NUM_ANGLES] = [
    true, false, true, true, true, true, false, false, //
    true, false, false, true, true, true, true, false, //
    true, false, true, true, true, true, false, false, //
    true, false, false, true, true, true, true, false,
];

const fn partition_valid(angle: usize, distance: usize) -> bool {
    angle < GEO_NUM_ANGLES
        && distance < GEO_NUM_DISTANCES
        && ANGLE_USED[angle]
        // distance 0 past the half turn repeats the line of angle - 16
        && !(distance == 0 && angle >= 16)
        // through the centre, horizontal and vertical splits only use odd distances
        && !(angle % 8 == 0 && distance % 2 == 0)
}

/// `(angle, distance)` of each split mode, in signaling order.
const SPLIT_MODES: [(u8, u8); GEO_NUM_PARTITION_MODES] = {
    let mut modes = [(0, 0); GEO_NUM_PARTITION_MODES];
    let mut count = 0;
    let mut angle = 0;
    while angle < GEO_NUM_ANGLES {
        let mut distance = 0;
        while distance < GEO_NUM_DISTANCES {
            if partition_valid(angle, distance) {
                modes[count] = (angle as u8, distance as u8);
                count += 1;
            }
            distance += 1;
        }
        angle += 1;
    }
    assert!(count == GEO_NUM_PARTITION_MODES);
    modes
};

/// A split line, identified by its angle index (0..32) and distance index
/// (0..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoPartition {
    angle: u8,
    distance: u8,
}

impl GeoPartition {
    /// # Errors
    /// Fails for pairs that are not one of the 64 split modes.
    pub const fn new(angle: u8, distance: u8) -> Result<Self, McError> {
        if partition_valid(angle as usize, distance as usize) {
            Ok(Self { angle, distance })
        } else {
            Err(McError::InvalidGeoPartition { angle, distance })
        }
    }

    /// The partition of signaled split mode `split_dir`.
    ///
    /// # Errors
    /// Fails if `split_dir` is 64 or more.
    pub const fn from_split_dir(split_dir: u8) -> Result<Self, McError> {
        if split_dir as usize >= GEO_NUM_PARTITION_MODES {
            return Err(McError::InvalidGeoMode(split_dir));
        }
        let (angle, distance) = SPLIT_MODES[split_dir as usize];
        Ok(Self { angle, distance })
    }

    #[must_use]
    pub const fn angle(self) -> u8 {
        self.angle
    }

    #[must_use]
    pub const fn distance(self) -> u8 {
        self.distance
    }

    /// Every split mode, in signaling order.
    pub fn all() -> impl Iterator<Item = Self> {
        SPLIT_MODES
            .into_iter()
            .map(|(angle, distance)| Self { angle, distance })
    }
}

fn size_index(size: usize) -> Option<usize> {
    if !size.is_power_of_two() {
        return None;
    }
    let log2 = size.trailing_zeros();
    (GEO_MIN_SIZE_LOG2..=GEO_MAX_SIZE_LOG2)
        .contains(&log2)
        .then(|| (log2 - GEO_MIN_SIZE_LOG2) as usize)
}

/// Weight of the first prediction at luma sample `(x, y)`.
fn mask_weight(partition: GeoPartition, width: i32, height: i32, x: i32, y: i32) -> u8 {
    let angle = i32::from(partition.angle);
    let distance = i32::from(partition.distance);

    let dis_x = DIS_LUT[angle as usize];
    let dis_y = DIS_LUT[((angle + 8) % 32) as usize];
    let flip = !(13..=27).contains(&angle);
    let shift_hor = !(angle % 16 == 8 || (angle % 16 != 0 && height >= width));

    let step = |size: i32| {
        let d = (distance * size) >> 3;
        if angle < 16 { d } else { -d }
    };
    let (offset_x, offset_y) = if shift_hor {
        ((-width >> 1) + step(width), -height >> 1)
    } else {
        (-width >> 1, (-height >> 1) + step(height))
    };

    let idx = (((x + offset_x) << 1) + 1) * dis_x + (((y + offset_y) << 1) + 1) * dis_y;
    let idx = if flip { 32 + idx } else { 32 - idx };
    ((idx + 4) >> 3).clamp(0, i32::from(GEO_WEIGHT_SUM)) as u8
}

fn build_mask(partition: GeoPartition, width: usize, height: usize) -> Box<[u8]> {
    debug!(
        "building geometric mask: angle {}, distance {}, {}x{}",
        partition.angle, partition.distance, width, height
    );
    let (w, h) = (width as i32, height as i32);
    (0..h)
        .flat_map(|y| (0..w).map(move |x| mask_weight(partition, w, h, x, y)))
        .collect()
}

/// Weights of the first prediction for a luma block of `width` x `height`,
/// row-major with stride `width`. The second prediction's weight is
/// `8 - w` at every sample.
///
/// Masks are built on first use and kept for the life of the process.
///
/// # Errors
/// Fails unless both dimensions are powers of two in 8..=64.
pub fn geo_mask(
    partition: GeoPartition,
    width: usize,
    height: usize,
) -> Result<&'static [u8], McError> {
    const SLOTS: usize = GEO_NUM_ANGLES * GEO_NUM_DISTANCES * NUM_SIZES * NUM_SIZES;
    static MASKS: [OnceLock<Box<[u8]>>; SLOTS] = [const { OnceLock::new() }; SLOTS];

    let (Some(wi), Some(hi)) = (size_index(width), size_index(height)) else {
        return Err(McError::UnsupportedGeoSize { width, height });
    };
    let slot = ((usize::from(partition.angle) * GEO_NUM_DISTANCES
        + usize::from(partition.distance))
        * NUM_SIZES
        + wi)
        * NUM_SIZES
        + hi;
    Ok(MASKS[slot].get_or_init(|| build_mask(partition, width, height)))
}

/// Blends two intermediate blocks of component `comp` along `partition`.
///
/// `dst` gives the block size of the component; the luma size the mask is
/// derived from follows from the chroma format. Chroma reuses the luma mask
/// subsampled at the component's scale.
///
/// # Errors
/// - [`McError::UnsupportedGeoSize`] if the luma block is not 8..=64 in
///   powers of two
/// - [`McError::DimensionMismatch`] if the sources differ in size from `dst`
pub fn weighted_geo_blk(
    kernels: &KernelSet,
    partition: GeoPartition,
    comp: ComponentId,
    chroma_format: ChromaFormat,
    clip: &ClipRange,
    src0: &PlaneRef<'_>,
    src1: &PlaneRef<'_>,
    dst: &mut PlaneMut<'_>,
) -> Result<(), McError> {
    if src0.width() != dst.width()
        || src0.height() != dst.height()
        || src1.width() != dst.width()
        || src1.height() != dst.height()
    {
        return Err(McError::DimensionMismatch("geometric blend planes"));
    }

    let scale_x = chroma_format.scale_x(comp);
    let scale_y = chroma_format.scale_y(comp);
    let luma_width = dst.width().get() << scale_x;
    let luma_height = dst.height().get() << scale_y;
    let mask = geo_mask(partition, luma_width, luma_height)?;
    let mask_step = 1 << scale_x;
    let mask_stride = luma_width << scale_y;

    let (width, height, dst_stride) = (dst.width(), dst.height(), dst.stride());
    kernels.geo_blend()(
        clip,
        src0.data(),
        src0.stride(),
        src1.data(),
        src1.stride(),
        dst.data_mut(),
        dst_stride,
        width,
        height,
        mask,
        mask_stride,
        mask_step,
    );

    #[cfg(feature = "check_asm")]
    crate::kernels::cross_check(kernels, dst, |reference, expected| {
        reference.geo_blend()(
            clip,
            src0.data(),
            src0.stride(),
            src1.data(),
            src1.stride(),
            expected,
            dst_stride,
            width,
            height,
            mask,
            mask_stride,
            mask_step,
        );
    });

    Ok(())
}
