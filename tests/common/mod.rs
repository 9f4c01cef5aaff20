#![allow(dead_code)]

use std::num::NonZeroUsize;

use anyhow::{Result, bail};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128StarStar;
use vvc_mcp::{Pel, RefWindow};

#[derive(Debug, Clone, Copy)]
pub enum ContentType {
    Flat(Pel),
    /// Horizontal ramp rising by 4 per sample across the padded plane,
    /// saturating at the maximum sample value.
    Gradient,
    /// 8x8 squares of black and white.
    Checkerboard,
    Noise { seed: u64 },
}

/// A reference picture whose border holds generated samples too, laid out
/// the way the prediction engine expects padded planes.
#[derive(Debug, Clone)]
pub struct RefPlane {
    pub data: Vec<Pel>,
    pub stride: usize,
    pub width: usize,
    pub height: usize,
    pub border: usize,
}

impl RefPlane {
    pub fn generate(
        width: usize,
        height: usize,
        border: usize,
        bit_depth: u8,
        content: ContentType,
    ) -> Self {
        let stride = width + 2 * border;
        let rows = height + 2 * border;
        let max = (1 << bit_depth) - 1;
        let mut rng = match content {
            ContentType::Noise { seed } => Xoshiro128StarStar::seed_from_u64(seed),
            _ => Xoshiro128StarStar::seed_from_u64(0),
        };

        let mut data = Vec::with_capacity(stride * rows);
        for y in 0..rows {
            for x in 0..stride {
                let value = match content {
                    ContentType::Flat(v) => i32::from(v),
                    ContentType::Gradient => (4 * x as i32).min(max),
                    ContentType::Checkerboard => {
                        if (x / 8 + y / 8) % 2 == 0 {
                            0
                        } else {
                            max
                        }
                    }
                    ContentType::Noise { .. } => rng.random_range(0..=max),
                };
                data.push(value as Pel);
            }
        }

        Self {
            data,
            stride,
            width,
            height,
            border,
        }
    }

    /// A window whose origin is picture sample `(x, y)`.
    pub fn window(&self, x: usize, y: usize) -> Result<RefWindow<'_>> {
        Ok(RefWindow::at(
            &self.data,
            self.stride,
            x + self.border,
            y + self.border,
        )?)
    }
}

pub fn nz(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

/// Fails with the first differing samples when two blocks differ.
pub fn assert_blocks_match(
    expected: &[Pel],
    actual: &[Pel],
    width: usize,
    stride: usize,
    context: &str,
) -> Result<()> {
    let mut differences = Vec::new();
    for (i, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        if i % stride < width && e != a {
            differences.push((i % stride, i / stride, e, a));
            if differences.len() == 10 {
                break;
            }
        }
    }

    if !differences.is_empty() {
        bail!(
            "{}\nFirst differences (x, y, expected, actual): {:?}",
            context,
            differences
        );
    }
    Ok(())
}
