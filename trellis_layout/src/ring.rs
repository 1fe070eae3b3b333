// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ring and arch layouts: sequential layout on an arc.
//!
//! The linear placement machinery runs unchanged; its domain is just angle
//! instead of displacement. Item sizes, dividers, and viewport extents are
//! converted from arc length to radians on the way in, and positioning
//! rotates each item about the ring center instead of translating it.

use core::fmt;

use crate::axis::{Axis, Direction, Gravity, Orientation};
use crate::container::Container;
use crate::linear::LinearLayout;
use crate::viewport::{ClipAxes, Viewport};

/// A ring radius that is not a positive finite number.
///
/// Raised at construction only; once a ring exists its conversions cannot
/// fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidRadius(pub f32);

impl fmt::Display for InvalidRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring radius must be positive and finite, got {}", self.0)
    }
}

impl core::error::Error for InvalidRadius {}

/// The angle in radians subtended by an arc of the given length.
#[must_use]
pub fn angle_of_arc(arc_length: f32, radius: f32) -> f32 {
    debug_assert!(radius > 0.0, "angle_of_arc needs a positive radius");
    arc_length / radius
}

/// The arc length spanned by an angle in radians.
#[must_use]
pub fn arc_of_angle(angle: f32, radius: f32) -> f32 {
    angle * radius
}

/// Sequential layout around a circle of fixed radius.
///
/// Horizontal rings run around the vertical axis, vertical rings around the
/// horizontal one. All offsets, sizes, and dividers this type reports are
/// angles in radians; the arc-length variants of the setters convert.
#[derive(Debug, Clone)]
pub struct RingLayout {
    inner: LinearLayout,
    radius: f32,
}

impl RingLayout {
    /// Creates a ring. Rejects a radius that is not positive and finite.
    ///
    /// A `Stack` orientation has no meaning on a ring and falls back to
    /// `Horizontal`, per the usual configuration-conflict policy.
    pub fn new(radius: f32, orientation: Orientation) -> Result<Self, InvalidRadius> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(InvalidRadius(radius));
        }
        let orientation = match orientation {
            Orientation::Stack => Orientation::Horizontal,
            other => other,
        };
        // The angular domain of a vertical ring runs opposite its axis.
        let sign = if orientation == Orientation::Vertical {
            -1.0
        } else {
            1.0
        };
        Ok(Self {
            inner: LinearLayout::with_offset_sign(orientation, sign),
            radius,
        })
    }

    /// The ring radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// The plane of the ring.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.inner.orientation()
    }

    const fn axis(&self) -> Axis {
        self.orientation().axis()
    }

    /// Requests a gravity for the angular packing.
    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.inner.set_gravity(gravity);
    }

    /// The gravity in effect.
    #[must_use]
    pub fn gravity(&self) -> Gravity {
        self.inner.gravity()
    }

    /// Sets the inter-item gap as an arc length.
    pub fn set_divider_arc(&mut self, arc_length: f32) -> bool {
        let angle = angle_of_arc(arc_length, self.radius);
        self.inner.set_divider_padding(angle, self.axis())
    }

    /// The inter-item gap in radians.
    #[must_use]
    pub fn divider_angle(&self) -> f32 {
        self.inner.divider_padding(self.axis())
    }

    /// Clips the ring to a window of the given arc length.
    pub fn set_viewport_arc(&mut self, arc_length: f32) {
        let axis = self.axis();
        let mut viewport = Viewport::unbounded();
        viewport.clip = ClipAxes::of(axis);
        viewport.size.set(axis, angle_of_arc(arc_length, self.radius));
        self.inner.set_viewport(viewport);
    }

    /// Static offsets make no sense on a ring; the request is rejected.
    pub fn set_offset(&mut self, _amount: f32, _axis: Axis) -> bool {
        false
    }

    fn angular_extent<C: Container>(&self, index: usize, container: &C) -> f32 {
        angle_of_arc(container.extent(index, self.axis()), self.radius)
    }

    /// Measures one item, caching its angular size.
    pub fn measure_child<C: Container>(&mut self, index: usize, container: &C) -> bool {
        let extent = self.angular_extent(index, container);
        self.inner.measure_child_with_extent(index, extent)
    }

    /// Measures every item, then runs post-measurement.
    pub fn measure_all<C: Container>(&mut self, container: &C) -> bool {
        let (axis, radius) = (self.axis(), self.radius);
        self.inner
            .measure_all_by(container.len(), container.is_dynamic(), |index| {
                angle_of_arc(container.extent(index, axis), radius)
            })
    }

    /// Measures outward from `center` until the angular viewport is covered.
    pub fn measure_until_full<C: Container>(
        &mut self,
        center: Option<usize>,
        container: &C,
    ) -> bool {
        let (axis, radius) = (self.axis(), self.radius);
        self.inner.measure_until_full_by(
            center,
            container.len(),
            container.is_dynamic(),
            |index| angle_of_arc(container.extent(index, axis), radius),
        )
    }

    /// Measures the next unmeasured item in `direction`; returns the angular
    /// size delta.
    pub fn pre_measure_next<C: Container>(&mut self, direction: Direction, container: &C) -> f32 {
        let (axis, radius) = (self.axis(), self.radius);
        self.inner
            .pre_measure_next_by(direction, container.len(), |index| {
                angle_of_arc(container.extent(index, axis), radius)
            })
    }

    /// The item's cached angular size in radians, `NaN` when unmeasured.
    #[must_use]
    pub fn child_size(&self, index: usize) -> f32 {
        self.inner.measured_extent(index)
    }

    /// The item's signed angular offset, `NaN` until placed.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f32 {
        self.inner.offset_of(index)
    }

    /// Rotates the item to its place on the ring.
    ///
    /// The item is first reset to the canonical radius-forward pose (identity
    /// rotation, pushed out by the radius along the depth axis), then rotated
    /// about the ring center by its angular offset.
    pub fn layout_child<C: Container>(&self, index: usize, container: &mut C) -> bool {
        let offset = self.inner.offset_of(index);
        if offset.is_nan() {
            return false;
        }
        let angle = -(self.inner.engine().offset_sign * offset);
        let rotation_axis = match self.orientation() {
            Orientation::Vertical => [Axis::Y.factor(), 0.0, 0.0],
            _ => [0.0, Axis::X.factor(), 0.0],
        };
        let Some(item) = container.item_mut(index) else {
            return false;
        };
        item.set_rotation(1.0, 0.0, 0.0, 0.0);
        item.set_position_xyz(0.0, 0.0, Axis::Z.factor() * self.radius);
        item.rotate_about_pivot(angle, rotation_axis, [0.0, 0.0, 0.0]);
        item.transform_changed();
        true
    }

    /// Lays out every placed item.
    pub fn layout_children<C: Container>(&self, container: &mut C) {
        for index in 0..container.len() {
            self.layout_child(index, container);
        }
    }

    /// Whether the item's angular span overlaps the viewport window.
    #[must_use]
    pub fn in_viewport(&self, index: usize) -> bool {
        self.inner.in_viewport(index)
    }

    /// The center-most measured item.
    #[must_use]
    pub fn center_child(&self) -> Option<usize> {
        self.inner.center_child()
    }

    /// Signed angle from the viewport center to the item.
    #[must_use]
    pub fn distance_to_child(&self, index: usize) -> f32 {
        self.inner.distance_to_child(index, self.axis())
    }

    /// Which way to scroll to reach the item.
    #[must_use]
    pub fn direction_to_child(&self, index: usize) -> Direction {
        self.inner
            .direction_to_child(index, self.axis())
            .unwrap_or(Direction::Forward)
    }

    /// Rotates the whole ring by an angle in radians.
    pub fn shift_by_angle(&mut self, angle: f32) -> bool {
        self.inner.shift_by(angle, self.axis())
    }

    /// Discards all cached geometry.
    pub fn invalidate(&mut self) {
        self.inner.invalidate();
    }

    /// Forgets one item so the next pass re-measures it.
    pub fn invalidate_item(&mut self, index: usize) {
        self.inner.invalidate_item(index);
    }

    /// Number of measured items.
    #[must_use]
    pub fn measured_len(&self) -> usize {
        self.inner.measured_len()
    }
}

/// A ring fixed to the vertical plane: items climb an arch overhead.
#[derive(Debug, Clone)]
pub struct ArchLayout {
    ring: RingLayout,
}

impl ArchLayout {
    /// Creates an arch. Rejects a radius that is not positive and finite.
    pub fn new(radius: f32) -> Result<Self, InvalidRadius> {
        RingLayout::new(radius, Orientation::Vertical).map(|ring| Self { ring })
    }

    /// The underlying ring.
    #[must_use]
    pub const fn ring(&self) -> &RingLayout {
        &self.ring
    }

    /// The underlying ring, mutably.
    pub const fn ring_mut(&mut self) -> &mut RingLayout {
        &mut self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchLayout, RingLayout, angle_of_arc, arc_of_angle};
    use crate::axis::{Axis, Orientation};
    use crate::test_support::Panel;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        assert!(RingLayout::new(0.0, Orientation::Horizontal).is_err());
        assert!(RingLayout::new(-1.0, Orientation::Horizontal).is_err());
        assert!(RingLayout::new(f32::NAN, Orientation::Horizontal).is_err());
        assert!(RingLayout::new(f32::INFINITY, Orientation::Horizontal).is_err());
        assert!(RingLayout::new(5.0, Orientation::Horizontal).is_ok());
        assert!(ArchLayout::new(-1.0).is_err());
    }

    #[test]
    fn arc_angle_round_trip() {
        for radius in [0.5, 1.0, 5.0, 100.0] {
            for arc in [0.0, 0.1, 1.0, 7.5] {
                assert!(close(arc_of_angle(angle_of_arc(arc, radius), radius), arc));
            }
        }
    }

    #[test]
    fn child_sizes_are_angles() {
        let panel = Panel::uniform(3, 1.0);
        let mut ring = RingLayout::new(5.0, Orientation::Horizontal).unwrap();
        ring.measure_child(0, &panel);

        assert!(close(ring.child_size(0), 0.2));
    }

    #[test]
    fn divider_is_stored_as_an_angle() {
        let mut ring = RingLayout::new(5.0, Orientation::Horizontal).unwrap();
        assert!(ring.set_divider_arc(0.5));
        assert!(close(ring.divider_angle(), 0.1));
    }

    #[test]
    fn horizontal_ring_rotates_about_the_up_axis() {
        let mut panel = Panel::uniform(3, 2.0);
        let mut ring = RingLayout::new(2.0, Orientation::Horizontal).unwrap();
        ring.measure_all(&panel);
        ring.layout_children(&mut panel);

        // Angular extents of 1 rad each, centered: offsets -1, 0, 1.
        assert!(close(ring.offset_of(1), 0.0));

        // Every item starts from the radius-forward pose.
        assert_eq!(panel.rotation_of(1), [1.0, 0.0, 0.0, 0.0]);
        assert!(close(panel.position_of(1, Axis::Z), -2.0));
        let (angle, axis, pivot) = panel.last_rotation(0).unwrap();
        assert_eq!(axis, [0.0, 1.0, 0.0]);
        assert_eq!(pivot, [0.0, 0.0, 0.0]);
        assert!(close(angle, 1.0));
        let (angle, _, _) = panel.last_rotation(2).unwrap();
        assert!(close(angle, -1.0));
    }

    #[test]
    fn vertical_ring_rotates_about_the_side_axis() {
        let mut panel = Panel::uniform(3, 2.0);
        let mut ring = RingLayout::new(2.0, Orientation::Vertical).unwrap();
        ring.measure_all(&panel);
        ring.layout_children(&mut panel);

        let (angle, axis, _) = panel.last_rotation(0).unwrap();
        assert_eq!(axis, [-1.0, 0.0, 0.0]);
        assert!(close(angle, 1.0));
    }

    #[test]
    fn static_offsets_are_rejected() {
        let mut ring = RingLayout::new(2.0, Orientation::Horizontal).unwrap();
        assert!(!ring.set_offset(1.0, Axis::X));
    }

    #[test]
    fn viewport_window_culls_by_angle() {
        let panel = Panel::uniform(12, 2.0);
        let mut ring = RingLayout::new(2.0, Orientation::Horizontal).unwrap();
        // A 4-unit window on a radius-2 ring spans 2 radians.
        ring.set_viewport_arc(4.0);

        let fits = ring.measure_until_full(Some(6), &panel);
        assert!(!fits);
        assert!(ring.in_viewport(6));
        assert!(ring.measured_len() < 12);
    }

    #[test]
    fn stack_orientation_falls_back_to_horizontal() {
        let ring = RingLayout::new(2.0, Orientation::Stack).unwrap();
        assert_eq!(ring.orientation(), Orientation::Horizontal);
    }
}
