
/// A sample at native bit depth, or an intermediate at 14-bit internal
/// precision with [`crate::params::IF_INTERNAL_OFFS`] removed.
pub type Pel = i16;

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");

#[cfg(target_arch = "x86_64")]
pub use cpuid_avx2::get as has_avx2;

/// Left shift for non-negative `shift`; otherwise a rounded right shift by
/// `-shift`.
#[inline]
#[must_use]
pub const fn left_shift_round(value: i32, shift: i32) -> i32 {
    if shift >= 0 {
        value << shift
    } else {
        (value + (1 << (-shift - 1))) >> -shift
    }
}

/// Rounded right shift for positive `shift`; otherwise a plain left shift by
/// `-shift` with no rounding addend.
#[inline]
#[must_use]
pub const fn right_shift_round(value: i32, shift: i32) -> i32 {
    if shift > 0 {
        (value + (1 << (shift - 1))) >> shift
    } else {
        value << -shift
    }
}

/// Number of samples a `width` x `height` view with `stride` spans.
#[inline]
#[must_use]
pub const fn plane_extent(stride: usize, width: usize, height: usize) -> usize {
    (height - 1) * stride + width
}
