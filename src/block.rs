
use std::num::NonZeroUsize;

use smallvec::SmallVec;

use crate::{
    error::McError,
    params::{ComponentId, MAX_NUM_COMPONENT},
    util::{Pel, plane_extent},
};

fn check_layout(
    len: usize,
    stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
) -> Result<(), McError> {
    if stride < width.get() {
        return Err(McError::StrideTooSmall {
            stride,
            width: width.get(),
        });
    }
    let needed = plane_extent(stride, width.get(), height.get());
    if len < needed {
        return Err(McError::BufferTooSmall {
            needed,
            available: len,
        });
    }
    Ok(())
}

/// A borrowed, read-only block of samples.
#[derive(Debug, Clone, Copy)]
pub struct PlaneRef<'a> {
    data: &'a [Pel],
    stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
}

impl<'a> PlaneRef<'a> {
    /// # Errors
    /// Fails if `stride < width` or `data` cannot hold `height` rows.
    pub fn new(
        data: &'a [Pel],
        stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
    ) -> Result<Self, McError> {
        check_layout(data.len(), stride, width, height)?;
        Ok(Self {
            data,
            stride,
            width,
            height,
        })
    }

    #[must_use]
    pub const fn data(&self) -> &'a [Pel] {
        self.data
    }

    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn width(&self) -> NonZeroUsize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> NonZeroUsize {
        self.height
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &'a [Pel] {
        let data = self.data;
        let start = y * self.stride;
        &data[start..start + self.width.get()]
    }
}

/// A borrowed, writable block of samples. The engine writes predictions into
/// it in place.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    data: &'a mut [Pel],
    stride: usize,
    width: NonZeroUsize,
    height: NonZeroUsize,
}

impl<'a> PlaneMut<'a> {
    /// # Errors
    /// Fails if `stride < width` or `data` cannot hold `height` rows.
    pub fn new(
        data: &'a mut [Pel],
        stride: usize,
        width: NonZeroUsize,
        height: NonZeroUsize,
    ) -> Result<Self, McError> {
        check_layout(data.len(), stride, width, height)?;
        Ok(Self {
            data,
            stride,
            width,
            height,
        })
    }

    #[must_use]
    pub fn data(&self) -> &[Pel] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [Pel] {
        &mut *self.data
    }

    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn width(&self) -> NonZeroUsize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> NonZeroUsize {
        self.height
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Pel] {
        let start = y * self.stride;
        &self.data[start..start + self.width.get()]
    }

    /// Reborrows the block with a shorter lifetime.
    pub fn reborrow(&mut self) -> PlaneMut<'_> {
        PlaneMut {
            data: &mut *self.data,
            stride: self.stride,
            width: self.width,
            height: self.height,
        }
    }
}

/// A reference plane with a block anchored at `origin`.
///
/// The plane is expected to carry a border around the picture so the filter
/// support of every block stays inside `data`. Requests that reach past the
/// plane are rejected rather than clamped.
#[derive(Debug, Clone, Copy)]
pub struct RefWindow<'a> {
    data: &'a [Pel],
    stride: usize,
    origin: usize,
}

impl<'a> RefWindow<'a> {
    /// # Errors
    /// Fails if `origin` is outside `data` or `stride` is zero.
    pub fn new(data: &'a [Pel], stride: usize, origin: usize) -> Result<Self, McError> {
        if stride == 0 {
            return Err(McError::StrideTooSmall { stride, width: 1 });
        }
        if origin >= data.len() {
            return Err(McError::SupportOutOfBounds);
        }
        Ok(Self {
            data,
            stride,
            origin,
        })
    }

    /// A window anchored at column `x`, row `y` of the plane.
    ///
    /// # Errors
    /// Fails if the position is outside `data` or `x` is past the stride.
    pub fn at(data: &'a [Pel], stride: usize, x: usize, y: usize) -> Result<Self, McError> {
        if x >= stride {
            return Err(McError::SupportOutOfBounds);
        }
        Self::new(data, stride, y * stride + x)
    }

    #[must_use]
    pub const fn data(&self) -> &'a [Pel] {
        self.data
    }

    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn origin(&self) -> usize {
        self.origin
    }

    /// The same window moved `rows` rows up.
    pub(crate) fn shifted_up(&self, rows: usize) -> Result<Self, McError> {
        let origin = self
            .origin
            .checked_sub(rows * self.stride)
            .ok_or(McError::SupportOutOfBounds)?;
        Ok(Self { origin, ..*self })
    }

    /// Index of the first sample of a `width` x `height` region that starts
    /// `left` columns and `above` rows before the origin.
    ///
    /// # Errors
    /// [`McError::SupportOutOfBounds`] if any part of the region falls
    /// outside the plane.
    pub(crate) fn support(
        &self,
        left: usize,
        above: usize,
        width: usize,
        height: usize,
    ) -> Result<usize, McError> {
        let col = self.origin % self.stride;
        let row = self.origin / self.stride;
        if col < left || row < above || col - left + width > self.stride {
            return Err(McError::SupportOutOfBounds);
        }
        let start = (row - above) * self.stride + col - left;
        if start + plane_extent(self.stride, width, height) > self.data.len() {
            return Err(McError::SupportOutOfBounds);
        }
        Ok(start)
    }
}

/// Read-only planes of one prediction unit, indexed by component.
#[derive(Debug, Clone, Default)]
pub struct UnitBuf<'a> {
    planes: SmallVec<[PlaneRef<'a>; MAX_NUM_COMPONENT]>,
}

impl<'a> UnitBuf<'a> {
    #[must_use]
    pub fn new(planes: impl IntoIterator<Item = PlaneRef<'a>>) -> Self {
        Self {
            planes: planes.into_iter().take(MAX_NUM_COMPONENT).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    #[must_use]
    pub fn get(&self, comp: ComponentId) -> Option<&PlaneRef<'a>> {
        self.planes.get(comp.index())
    }
}

/// Writable planes of one prediction unit, indexed by component.
#[derive(Debug, Default)]
pub struct UnitBufMut<'a> {
    planes: SmallVec<[PlaneMut<'a>; MAX_NUM_COMPONENT]>,
}

impl<'a> UnitBufMut<'a> {
    #[must_use]
    pub fn new(planes: impl IntoIterator<Item = PlaneMut<'a>>) -> Self {
        Self {
            planes: planes.into_iter().take(MAX_NUM_COMPONENT).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    #[must_use]
    pub fn get(&self, comp: ComponentId) -> Option<&PlaneMut<'a>> {
        self.planes.get(comp.index())
    }

    pub fn get_mut(&mut self, comp: ComponentId) -> Option<&mut PlaneMut<'a>> {
        self.planes.get_mut(comp.index())
    }
}
