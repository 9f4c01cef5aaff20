#![allow(clippy::unwrap_used, reason = "allow in test files")]

use super::*;

#[test]
fn test_full_range() {
    let range = ClipRange::new(10).unwrap();
    assert_eq!(range.min, 0);
    assert_eq!(range.max, 1023);
    assert_eq!(range.frac_bits(), 4);
    assert_eq!(range.clip(-5), 0);
    assert_eq!(range.clip(2000), 1023);
    assert_eq!(range.clip(512), 512);
}

#[test]
fn test_frac_bits_floor() {
    assert_eq!(ClipRange::new(8).unwrap().frac_bits(), 6);
    assert_eq!(ClipRange::new(12).unwrap().frac_bits(), 2);
}

#[test]
fn test_rejects_bit_depth() {
    assert_eq!(ClipRange::new(7), Err(McError::UnsupportedBitDepth(7)));
    assert_eq!(ClipRange::new(16), Err(McError::UnsupportedBitDepth(16)));
}

#[test]
fn test_rejects_inverted_bounds() {
    assert!(matches!(
        ClipRange::with_bounds(100, 50, 8),
        Err(McError::InvalidClipBounds { .. })
    ));
    assert!(matches!(
        ClipRange::with_bounds(0, 256, 8),
        Err(McError::InvalidClipBounds { .. })
    ));
    assert!(matches!(
        ClipRange::with_bounds(-1, 10, 8),
        Err(McError::InvalidClipBounds { .. })
    ));
}

#[test]
fn test_set_unused_is_full_range() {
    let narrow = ClipRange::with_bounds(16, 235, 8).unwrap();
    let set = ClipRangeSet::with_ranges([narrow; 3], false);
    assert_eq!(set.component(ComponentId::Y), narrow);
    // chroma falls back to full range unless enabled
    assert_eq!(set.component(ComponentId::Cb).max, 255);

    let set = ClipRangeSet::with_ranges([narrow; 3], true);
    assert_eq!(set.component(ComponentId::Cr), narrow);

    let set = ClipRangeSet::new(10, 8).unwrap();
    assert_eq!(set.component(ComponentId::Y).max, 1023);
    assert_eq!(set.component(ComponentId::Cb).max, 255);
}
