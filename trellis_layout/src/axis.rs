// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axes, orientations, and alignment policies shared by all layout variants.

/// One of the three layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The horizontal axis.
    X,
    /// The vertical axis.
    Y,
    /// The depth axis.
    Z,
}

impl Axis {
    /// All axes, in `X`, `Y`, `Z` order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Sign applied when a cache offset becomes a world position component.
    ///
    /// The host scene graph this engine was built for has `+x` right, `+y` up,
    /// and `+z` toward the viewer, while layout offsets grow rightward,
    /// *downward*, and *away*; `Y` and `Z` flip.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::X => 1.0,
            Self::Y | Self::Z => -1.0,
        }
    }
}

/// One `f32` per axis.
///
/// Used for viewport sizes, divider paddings, and static child offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerAxis {
    /// Value along [`Axis::X`].
    pub x: f32,
    /// Value along [`Axis::Y`].
    pub y: f32,
    /// Value along [`Axis::Z`].
    pub z: f32,
}

impl PerAxis {
    /// Creates a value from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Creates a value with every component set to `v`.
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Returns the component along `axis`.
    #[must_use]
    pub const fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Sets the component along `axis`.
    pub const fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }

    /// Applies `f` to every component.
    #[must_use]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }
}

/// Which axis a layout sequences its items along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Items run along `X`. The default.
    #[default]
    Horizontal,
    /// Items run along `Y`.
    Vertical,
    /// Items run along `Z`.
    Stack,
}

impl Orientation {
    /// The axis this orientation sequences along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::X,
            Self::Vertical => Axis::Y,
            Self::Stack => Axis::Z,
        }
    }
}

/// Scan direction along the orientation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward higher data indices.
    Forward,
    /// Toward lower data indices.
    Backward,
}

/// How items pack within the viewport along the orientation axis.
///
/// Most gravities only make sense for one orientation (`Left`/`Right` for
/// [`Orientation::Horizontal`], `Top`/`Bottom` for [`Orientation::Vertical`],
/// `Front`/`Back` for [`Orientation::Stack`]) and only when the viewport is
/// bounded along that axis. `Center` is always valid; `Fill` needs a bounded
/// viewport but works for any orientation. Incompatible combinations are not
/// errors: the layout falls back to `Center` until the conflict is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gravity {
    /// Pack from the left edge (horizontal only).
    Left,
    /// Pack toward the right edge (horizontal only).
    Right,
    /// Pack from the top edge (vertical only).
    Top,
    /// Pack toward the bottom edge (vertical only).
    Bottom,
    /// Pack from the front (stack only).
    Front,
    /// Pack toward the back (stack only).
    Back,
    /// Center the run of items. The default, and the only gravity valid for
    /// an unbounded viewport.
    #[default]
    Center,
    /// Keep item sizes but stretch the gaps so the run fills the viewport.
    Fill,
}

impl Gravity {
    /// Gravities that pack from the leading edge of the viewport.
    #[must_use]
    pub const fn is_leading(self) -> bool {
        matches!(self, Self::Left | Self::Top | Self::Front | Self::Fill)
    }

    /// Gravities that pack toward the trailing edge of the viewport.
    #[must_use]
    pub const fn is_trailing(self) -> bool {
        matches!(self, Self::Right | Self::Bottom | Self::Back)
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, Gravity, Orientation, PerAxis};

    #[test]
    fn orientation_selects_axis() {
        assert_eq!(Orientation::Horizontal.axis(), Axis::X);
        assert_eq!(Orientation::Vertical.axis(), Axis::Y);
        assert_eq!(Orientation::Stack.axis(), Axis::Z);
    }

    #[test]
    fn per_axis_get_set_roundtrip() {
        let mut v = PerAxis::splat(1.0);
        v.set(Axis::Y, 3.0);
        assert_eq!(v.get(Axis::X), 1.0);
        assert_eq!(v.get(Axis::Y), 3.0);
        assert_eq!(v.map(|c| c * 2.0).get(Axis::Y), 6.0);
    }

    #[test]
    fn gravity_edge_classification() {
        assert!(Gravity::Left.is_leading());
        assert!(Gravity::Fill.is_leading());
        assert!(Gravity::Back.is_trailing());
        assert!(!Gravity::Center.is_leading());
        assert!(!Gravity::Center.is_trailing());
    }
}
