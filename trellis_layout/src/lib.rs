// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Layout: sequential, grid, and curved layout algorithms for
//! 3D widget containers.
//!
//! A layout owns no items. It measures and positions items held by a
//! host-owned [`Container`], referencing them by integer index and touching
//! the scene graph only through the [`LayoutItem`] trait. Per-item geometry
//! is cached incrementally in [`trellis_cache`] so streaming hosts can grow
//! the measured range as the user scrolls instead of re-measuring the world.
//!
//! Five variants cover the layout shapes the system supports:
//!
//! - [`AbsoluteLayout`] — static positions, no measurement.
//! - [`LinearLayout`] — items in sequence along one axis, with gravity,
//!   dividers, and viewport culling.
//! - [`GridLayout`] — two chunked linear decompositions (rows and columns)
//!   over the same items.
//! - [`RingLayout`] / [`ArchLayout`] — linear placement in an angular
//!   domain, positioning items by rotation about the ring center.
//!
//! The [`Layout`] enum packages the variants behind one container-facing
//! surface for hosts that select a layout at runtime.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod absolute;
mod axis;
mod container;
mod grid;
mod linear;
mod ring;
mod viewport;

pub use absolute::AbsoluteLayout;
pub use axis::{Axis, Direction, Gravity, Orientation, PerAxis};
pub use container::{Container, LayoutItem};
pub use grid::{ChunkBreaker, GridLayout};
pub use linear::LinearLayout;
pub use ring::{ArchLayout, InvalidRadius, RingLayout, angle_of_arc, arc_of_angle};
pub use viewport::{ClipAxes, Viewport};

/// A layout variant behind the common container-facing surface.
///
/// Hosts that know their layout statically use the variant types directly;
/// this enum serves the ones that pick a layout from configuration. Variant
/// specific configuration (ring radius, grid shape) happens on the concrete
/// type before wrapping.
#[derive(Debug, Clone)]
pub enum Layout {
    /// Static positions only.
    Absolute(AbsoluteLayout),
    /// Single-axis sequence.
    Linear(LinearLayout),
    /// Row and column decomposition.
    Grid(GridLayout),
    /// Angular sequence around a ring.
    Ring(RingLayout),
    /// Angular sequence on a vertical arch.
    Arch(ArchLayout),
}

impl From<AbsoluteLayout> for Layout {
    fn from(layout: AbsoluteLayout) -> Self {
        Self::Absolute(layout)
    }
}

impl From<LinearLayout> for Layout {
    fn from(layout: LinearLayout) -> Self {
        Self::Linear(layout)
    }
}

impl From<GridLayout> for Layout {
    fn from(layout: GridLayout) -> Self {
        Self::Grid(layout)
    }
}

impl From<RingLayout> for Layout {
    fn from(layout: RingLayout) -> Self {
        Self::Ring(layout)
    }
}

impl From<ArchLayout> for Layout {
    fn from(layout: ArchLayout) -> Self {
        Self::Arch(layout)
    }
}

impl Layout {
    /// Measures one item. Returns whether it lies in the viewport.
    pub fn measure_child<C: Container>(&mut self, index: usize, container: &C) -> bool {
        match self {
            Self::Absolute(_) => index < container.len(),
            Self::Linear(layout) => layout.measure_child(index, container),
            Self::Grid(layout) => layout.measure_child(index, container),
            Self::Ring(layout) => layout.measure_child(index, container),
            Self::Arch(layout) => layout.ring_mut().measure_child(index, container),
        }
    }

    /// Measures every item and finishes the pass. Returns whether the
    /// measured set fits the viewport.
    pub fn measure_all<C: Container>(&mut self, container: &C) -> bool {
        match self {
            Self::Absolute(_) => true,
            Self::Linear(layout) => layout.measure_all(container),
            Self::Grid(layout) => layout.measure_all(container),
            Self::Ring(layout) => layout.measure_all(container),
            Self::Arch(layout) => layout.ring_mut().measure_all(container),
        }
    }

    /// Measures from `center` until the viewport is covered.
    pub fn measure_until_full<C: Container>(
        &mut self,
        center: Option<usize>,
        container: &C,
    ) -> bool {
        match self {
            Self::Absolute(_) => true,
            Self::Linear(layout) => layout.measure_until_full(center, container),
            Self::Grid(layout) => layout.measure_until_full(center, container),
            Self::Ring(layout) => layout.measure_until_full(center, container),
            Self::Arch(layout) => layout.ring_mut().measure_until_full(center, container),
        }
    }

    /// Measures the next unmeasured item in `direction`; returns the change
    /// in occupied size.
    pub fn pre_measure_next<C: Container>(&mut self, direction: Direction, container: &C) -> f32 {
        match self {
            Self::Absolute(_) => 0.0,
            Self::Linear(layout) => layout.pre_measure_next(direction, container),
            Self::Grid(layout) => layout.pre_measure_next(direction, container),
            Self::Ring(layout) => layout.pre_measure_next(direction, container),
            Self::Arch(layout) => layout.ring_mut().pre_measure_next(direction, container),
        }
    }

    /// Writes one item's computed transform into the container.
    pub fn layout_child<C: Container>(&self, index: usize, container: &mut C) -> bool {
        match self {
            Self::Absolute(layout) => layout.layout_child(index, container),
            Self::Linear(layout) => layout.layout_child(index, container),
            Self::Grid(layout) => layout.layout_child(index, container),
            Self::Ring(layout) => layout.layout_child(index, container),
            Self::Arch(layout) => layout.ring().layout_child(index, container),
        }
    }

    /// Lays out every placed item.
    pub fn layout_children<C: Container>(&self, container: &mut C) {
        match self {
            Self::Absolute(layout) => layout.layout_children(container),
            Self::Linear(layout) => layout.layout_children(container),
            Self::Grid(layout) => layout.layout_children(container),
            Self::Ring(layout) => layout.layout_children(container),
            Self::Arch(layout) => layout.ring().layout_children(container),
        }
    }

    /// Discards all cached geometry.
    pub fn invalidate(&mut self) {
        match self {
            Self::Absolute(_) => {}
            Self::Linear(layout) => layout.invalidate(),
            Self::Grid(layout) => layout.invalidate(),
            Self::Ring(layout) => layout.invalidate(),
            Self::Arch(layout) => layout.ring_mut().invalidate(),
        }
    }

    /// Forgets one item so the next pass re-measures it.
    pub fn invalidate_item(&mut self, index: usize) {
        match self {
            Self::Absolute(_) => {}
            Self::Linear(layout) => layout.invalidate_item(index),
            Self::Grid(layout) => layout.invalidate_item(index),
            Self::Ring(layout) => layout.invalidate_item(index),
            Self::Arch(layout) => layout.ring_mut().invalidate_item(index),
        }
    }

    /// Whether the item overlaps the viewport.
    #[must_use]
    pub fn in_viewport(&self, index: usize) -> bool {
        match self {
            Self::Absolute(_) => true,
            Self::Linear(layout) => layout.in_viewport(index),
            Self::Grid(layout) => layout.in_viewport(index),
            Self::Ring(layout) => layout.in_viewport(index),
            Self::Arch(layout) => layout.ring().in_viewport(index),
        }
    }

    /// The center-most measured item, if any.
    #[must_use]
    pub fn center_child(&self) -> Option<usize> {
        match self {
            Self::Absolute(_) => None,
            Self::Linear(layout) => layout.center_child(),
            Self::Grid(layout) => layout.center_child(),
            Self::Ring(layout) => layout.center_child(),
            Self::Arch(layout) => layout.ring().center_child(),
        }
    }

    /// Signed distance to the item along `axis`, measured from the effective
    /// gravity's reference edge (the viewport center under `Center`).
    ///
    /// `NaN` for unplaced items and untracked axes; angular layouts report
    /// radians on their orientation axis.
    #[must_use]
    pub fn distance_to_child(&self, index: usize, axis: Axis) -> f32 {
        match self {
            Self::Absolute(_) => f32::NAN,
            Self::Linear(layout) => layout.distance_to_child(index, axis),
            Self::Grid(layout) => layout.distance_to_child(index, axis),
            Self::Ring(layout) if axis == layout.orientation().axis() => {
                layout.distance_to_child(index)
            }
            Self::Arch(layout) if axis == Axis::Y => layout.ring().distance_to_child(index),
            Self::Ring(_) | Self::Arch(_) => f32::NAN,
        }
    }

    /// Which way to scroll to reach the item along `axis`; `None` for axes
    /// the layout does not track.
    #[must_use]
    pub fn direction_to_child(&self, index: usize, axis: Axis) -> Option<Direction> {
        match self {
            Self::Absolute(_) => None,
            Self::Linear(layout) => layout.direction_to_child(index, axis),
            Self::Grid(layout) => layout.direction_to_child(index, axis),
            Self::Ring(layout) if axis == layout.orientation().axis() => {
                Some(layout.direction_to_child(index))
            }
            Self::Arch(layout) if axis == Axis::Y => {
                Some(layout.ring().direction_to_child(index))
            }
            Self::Ring(_) | Self::Arch(_) => None,
        }
    }

    /// Scrolls the layout along `axis`. Returns whether accepted; angular
    /// layouts take the amount in radians.
    pub fn shift_by(&mut self, amount: f32, axis: Axis) -> bool {
        match self {
            Self::Absolute(_) => false,
            Self::Linear(layout) => layout.shift_by(amount, axis),
            Self::Grid(layout) => layout.shift_by(amount, axis),
            Self::Ring(layout) if axis == layout.orientation().axis() => {
                layout.shift_by_angle(amount)
            }
            Self::Arch(layout) if axis == Axis::Y => layout.ring_mut().shift_by_angle(amount),
            Self::Ring(_) | Self::Arch(_) => false,
        }
    }

    /// Requests a gravity along `axis`. Returns whether the axis applies to
    /// this layout; an incompatible gravity still resolves to `Center`.
    pub fn set_gravity(&mut self, gravity: Gravity, axis: Axis) -> bool {
        match self {
            Self::Absolute(_) => false,
            Self::Linear(layout) => {
                if axis != layout.orientation().axis() {
                    return false;
                }
                layout.set_gravity(gravity);
                true
            }
            Self::Grid(layout) => layout.set_gravity(gravity, axis),
            Self::Ring(layout) => {
                if axis != layout.orientation().axis() {
                    return false;
                }
                layout.set_gravity(gravity);
                true
            }
            Self::Arch(layout) => {
                if axis != Axis::Y {
                    return false;
                }
                layout.ring_mut().set_gravity(gravity);
                true
            }
        }
    }

    /// Sets the inter-item gap along `axis`. Returns whether applied;
    /// angular layouts take the gap as an arc length.
    pub fn set_divider_padding(&mut self, padding: f32, axis: Axis) -> bool {
        match self {
            Self::Absolute(_) => false,
            Self::Linear(layout) => layout.set_divider_padding(padding, axis),
            Self::Grid(layout) => layout.set_divider_padding(padding, axis),
            Self::Ring(layout) if axis == layout.orientation().axis() => {
                layout.set_divider_arc(padding)
            }
            Self::Arch(layout) if axis == Axis::Y => layout.ring_mut().set_divider_arc(padding),
            Self::Ring(_) | Self::Arch(_) => false,
        }
    }

    /// Static translation applied at layout time. Returns whether accepted;
    /// angular layouts reject it.
    pub fn set_offset(&mut self, amount: f32, axis: Axis) -> bool {
        match self {
            Self::Absolute(layout) => layout.set_offset(amount, axis),
            Self::Linear(layout) => layout.set_offset(amount, axis),
            Self::Grid(layout) => layout.set_offset(amount, axis),
            Self::Ring(_) | Self::Arch(_) => false,
        }
    }

    /// Replaces the viewport. Returns whether accepted; angular layouts
    /// configure their window as an arc on the concrete type instead.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        match self {
            Self::Absolute(_) | Self::Ring(_) | Self::Arch(_) => false,
            Self::Linear(layout) => {
                layout.set_viewport(viewport);
                true
            }
            Self::Grid(layout) => {
                layout.set_viewport(viewport);
                true
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::axis::Axis;
    use crate::container::{Container, LayoutItem};

    pub(crate) struct Block {
        name: String,
        position: [f32; 3],
        rotation: [f32; 4],
        last_rotation: Option<(f32, [f32; 3], [f32; 3])>,
        changes: usize,
    }

    impl LayoutItem for Block {
        fn name(&self) -> &str {
            &self.name
        }

        fn position(&self, axis: Axis) -> f32 {
            self.position[axis as usize]
        }

        fn set_position(&mut self, axis: Axis, value: f32) {
            self.position[axis as usize] = value;
        }

        fn set_rotation(&mut self, w: f32, x: f32, y: f32, z: f32) {
            self.rotation = [w, x, y, z];
        }

        fn rotate_about_pivot(&mut self, angle: f32, axis: [f32; 3], pivot: [f32; 3]) {
            self.last_rotation = Some((angle, axis, pivot));
        }

        fn transform_changed(&mut self) {
            self.changes += 1;
        }
    }

    /// A host container of cube-shaped items, one extent per item.
    pub(crate) struct Panel {
        blocks: Vec<Block>,
        extents: Vec<f32>,
        dynamic: bool,
    }

    impl Panel {
        pub(crate) fn uniform(count: usize, extent: f32) -> Self {
            Self::sized(&vec![extent; count])
        }

        pub(crate) fn sized(extents: &[f32]) -> Self {
            let blocks = (0..extents.len())
                .map(|index| Block {
                    name: format!("block-{index}"),
                    position: [0.0; 3],
                    rotation: [1.0, 0.0, 0.0, 0.0],
                    last_rotation: None,
                    changes: 0,
                })
                .collect();
            Self {
                blocks,
                extents: extents.to_vec(),
                dynamic: false,
            }
        }

        pub(crate) fn set_dynamic(&mut self, dynamic: bool) {
            self.dynamic = dynamic;
        }

        pub(crate) fn position_of(&self, index: usize, axis: Axis) -> f32 {
            self.blocks[index].position[axis as usize]
        }

        pub(crate) fn rotation_of(&self, index: usize) -> [f32; 4] {
            self.blocks[index].rotation
        }

        pub(crate) fn last_rotation(&self, index: usize) -> Option<(f32, [f32; 3], [f32; 3])> {
            self.blocks[index].last_rotation
        }

        pub(crate) fn transform_changes(&self, index: usize) -> usize {
            self.blocks[index].changes
        }
    }

    impl Container for Panel {
        fn len(&self) -> usize {
            self.blocks.len()
        }

        fn is_dynamic(&self) -> bool {
            self.dynamic
        }

        fn extent(&self, index: usize, _axis: Axis) -> f32 {
            self.extents.get(index).copied().unwrap_or(f32::NAN)
        }

        fn bounds_extent(&self, _axis: Axis) -> f32 {
            self.extents.iter().sum()
        }

        fn item(&self, index: usize) -> Option<&dyn LayoutItem> {
            self.blocks.get(index).map(|block| block as _)
        }

        fn item_mut(&mut self, index: usize) -> Option<&mut dyn LayoutItem> {
            self.blocks.get_mut(index).map(|block| block as _)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::Panel;
    use crate::{Axis, Gravity, Layout, LinearLayout, PerAxis, RingLayout, Viewport};

    #[test]
    fn enum_surface_delegates_to_the_variant() {
        let mut panel = Panel::uniform(5, 2.0);
        let mut layout = Layout::from(LinearLayout::new());
        assert!(layout.set_viewport(Viewport::new(PerAxis::splat(10.0))));

        layout.measure_all(&panel);
        layout.layout_children(&mut panel);
        assert_eq!(layout.center_child(), Some(2));
        assert_eq!(panel.position_of(0, Axis::X), -4.0);
        assert!(layout.in_viewport(2));
    }

    #[test]
    fn enum_surface_rejects_mismatched_configuration() {
        let mut absolute = Layout::Absolute(crate::AbsoluteLayout::new());
        assert!(!absolute.set_gravity(Gravity::Center, Axis::X));
        assert!(!absolute.shift_by(1.0, Axis::X));

        let ring = RingLayout::new(2.0, crate::Orientation::Horizontal).unwrap();
        let mut ring = Layout::from(ring);
        assert!(!ring.set_offset(1.0, Axis::X));
        assert!(!ring.set_divider_padding(1.0, Axis::Y));
        assert!(ring.set_divider_padding(1.0, Axis::X));
    }
}
