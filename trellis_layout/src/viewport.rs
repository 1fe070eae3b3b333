// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clipping viewport a layout places items into.

use crate::axis::{Axis, PerAxis};

bitflags::bitflags! {
    /// Which axes the viewport clips.
    ///
    /// An axis that is not clipped behaves as unbounded regardless of the
    /// configured size, which is how an unconstrained scrolling list is
    /// expressed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClipAxes: u8 {
        /// Clip along [`Axis::X`].
        const X = 1 << 0;
        /// Clip along [`Axis::Y`].
        const Y = 1 << 1;
        /// Clip along [`Axis::Z`].
        const Z = 1 << 2;
    }
}

impl ClipAxes {
    /// The flag for one axis.
    #[must_use]
    pub const fn of(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
            Axis::Z => Self::Z,
        }
    }
}

/// Visible extent of a layout along each axis, plus the accumulated scroll.
///
/// Extents are centered on the layout origin: an extent `e` along an axis
/// spans `[-e / 2, e / 2]`. A non-finite size or an unset clip flag both mean
/// "unbounded along that axis".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Configured size per axis. `f32::INFINITY` means unbounded.
    pub size: PerAxis,
    /// Accumulated scroll translation per axis.
    pub shift: PerAxis,
    /// Which axes actually clip.
    pub clip: ClipAxes,
}

impl Viewport {
    /// A viewport clipping all three axes to `size`.
    #[must_use]
    pub const fn new(size: PerAxis) -> Self {
        Self {
            size,
            shift: PerAxis::splat(0.0),
            clip: ClipAxes::all(),
        }
    }

    /// A viewport that clips nothing.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            size: PerAxis::splat(f32::INFINITY),
            shift: PerAxis::splat(0.0),
            clip: ClipAxes::empty(),
        }
    }

    /// The clipping extent along `axis`, or `f32::INFINITY` when unbounded.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f32 {
        if self.clip.contains(ClipAxes::of(axis)) {
            self.size.get(axis)
        } else {
            f32::INFINITY
        }
    }

    /// Returns `true` when the viewport clips `axis` to a finite extent.
    #[must_use]
    pub fn is_bounded(&self, axis: Axis) -> bool {
        self.extent(axis).is_finite()
    }

    /// Records a scroll translation along `axis`.
    pub fn shift_by(&mut self, amount: f32, axis: Axis) {
        let current = self.shift.get(axis);
        self.shift.set(axis, current + amount);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClipAxes, Viewport};
    use crate::axis::{Axis, PerAxis};

    #[test]
    fn unclipped_axis_is_unbounded() {
        let mut vp = Viewport::new(PerAxis::splat(10.0));
        assert!(vp.is_bounded(Axis::X));
        assert_eq!(vp.extent(Axis::X), 10.0);

        vp.clip.remove(ClipAxes::X);
        assert!(!vp.is_bounded(Axis::X));
        assert_eq!(vp.extent(Axis::X), f32::INFINITY);
        assert!(vp.is_bounded(Axis::Y));
    }

    #[test]
    fn shift_accumulates() {
        let mut vp = Viewport::new(PerAxis::splat(10.0));
        vp.shift_by(2.0, Axis::X);
        vp.shift_by(-0.5, Axis::X);
        assert_eq!(vp.shift.get(Axis::X), 1.5);
        assert_eq!(vp.shift.get(Axis::Y), 0.0);
    }
}
