// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The degenerate layout: static positions, no measurement.

use crate::axis::{Axis, PerAxis};
use crate::container::Container;

/// Positions every item at the configured static offsets.
///
/// Nothing is measured or cached; hosts use this when item placement is
/// decided elsewhere and the layout only needs to write a common transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLayout {
    offset: PerAxis,
}

impl AbsoluteLayout {
    /// A layout placing every item at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The static offset along `axis`.
    #[must_use]
    pub const fn offset(&self, axis: Axis) -> f32 {
        self.offset.get(axis)
    }

    /// Sets the static offset along `axis`. Always accepted.
    pub fn set_offset(&mut self, amount: f32, axis: Axis) -> bool {
        self.offset.set(axis, amount);
        true
    }

    /// Writes the static position into the item's transform.
    pub fn layout_child<C: Container>(&self, index: usize, container: &mut C) -> bool {
        let Some(item) = container.item_mut(index) else {
            return false;
        };
        item.set_position_xyz(
            Axis::X.factor() * self.offset.x,
            Axis::Y.factor() * self.offset.y,
            Axis::Z.factor() * self.offset.z,
        );
        item.transform_changed();
        true
    }

    /// Lays out every item.
    pub fn layout_children<C: Container>(&self, container: &mut C) {
        for index in 0..container.len() {
            self.layout_child(index, container);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AbsoluteLayout;
    use crate::axis::Axis;
    use crate::test_support::Panel;

    #[test]
    fn writes_static_offsets_with_axis_factors() {
        let mut panel = Panel::uniform(2, 1.0);
        let mut layout = AbsoluteLayout::new();
        layout.set_offset(3.0, Axis::Y);
        layout.layout_children(&mut panel);

        assert_eq!(panel.position_of(0, Axis::Y), -3.0);
        assert_eq!(panel.position_of(1, Axis::Y), -3.0);
        assert_eq!(panel.position_of(0, Axis::X), 0.0);
        assert!(!layout.layout_child(5, &mut panel));
    }
}
