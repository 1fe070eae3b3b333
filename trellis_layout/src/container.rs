// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the host scene graph.
//!
//! Layouts own no items. They reference items by integer index into a
//! host-owned container and touch the scene graph only through these two
//! traits. The host decides what an item is (a widget, a node handle, a test
//! double); the layout only ever reads sizes and writes transforms.
//!
//! Notifications flow the same one way: configuration setters report whether
//! they changed anything, and the host that called them drives the follow-up
//! measure and layout passes itself.

use crate::axis::Axis;

/// One item's scene-graph transform, as seen by a layout.
pub trait LayoutItem {
    /// Diagnostic name, used in logs and assertions only.
    fn name(&self) -> &str;

    /// Current position component along `axis`.
    fn position(&self, axis: Axis) -> f32;

    /// Sets one position component.
    fn set_position(&mut self, axis: Axis, value: f32);

    /// Sets all three position components at once.
    fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_position(Axis::X, x);
        self.set_position(Axis::Y, y);
        self.set_position(Axis::Z, z);
    }

    /// Sets the rotation to the given quaternion (`w`, `x`, `y`, `z`).
    fn set_rotation(&mut self, w: f32, x: f32, y: f32, z: f32);

    /// Rotates by `angle` radians about `axis` through the `pivot` point,
    /// composing with the current transform.
    fn rotate_about_pivot(&mut self, angle: f32, axis: [f32; 3], pivot: [f32; 3]);

    /// Called after a layout finishes writing this item's transform.
    fn transform_changed(&mut self) {}
}

/// The host-owned item container a layout measures and positions.
pub trait Container {
    /// Number of items.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for streaming/windowed data sources whose item set may
    /// grow or shrink between layout passes. Static containers allow
    /// whole-set policies such as uniform sizing.
    fn is_dynamic(&self) -> bool;

    /// Size of the item at `index` along `axis`.
    ///
    /// `NaN` for an out-of-range index.
    fn extent(&self, index: usize, axis: Axis) -> f32;

    /// Overall bounds of the container along `axis`, used when a viewport
    /// does not clip that axis.
    fn bounds_extent(&self, axis: Axis) -> f32;

    /// Borrows the item at `index`.
    fn item(&self, index: usize) -> Option<&dyn LayoutItem>;

    /// Mutably borrows the item at `index`.
    fn item_mut(&mut self, index: usize) -> Option<&mut dyn LayoutItem>;
}
