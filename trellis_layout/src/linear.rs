// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-axis sequential layout.
//!
//! Items move through three stages per layout pass: unmeasured, measured
//! (size cached, no offset yet), and placed (signed center offset computed).
//! Measurement only ever extends the cached range at its front or back,
//! because a streaming host hands the layout indices contiguous with what it
//! has already measured.

use alloc::vec::Vec;

use trellis_cache::{AxisCache, InvalidateScope};

use crate::axis::{Axis, Direction, Gravity, Orientation, PerAxis};
use crate::container::Container;
use crate::viewport::Viewport;

/// The placement rules of a sequential layout, independent of any one cache.
///
/// [`LinearLayout`] pairs an engine with a single [`AxisCache`]; the grid
/// variant runs one engine over many caches, one per chunk.
#[derive(Debug, Clone)]
pub(crate) struct LinearEngine {
    pub(crate) orientation: Orientation,
    /// The gravity the caller asked for. May be incompatible with the current
    /// orientation or viewport; `effective_gravity` resolves that.
    pub(crate) requested_gravity: Gravity,
    pub(crate) divider: PerAxis,
    pub(crate) uniform_size: bool,
    pub(crate) viewport: Viewport,
    /// Static translation added to every item at layout time.
    pub(crate) offset: PerAxis,
    /// `-1.0` when the offset domain runs opposite the axis direction, as the
    /// vertical ring arrangement needs. `1.0` otherwise.
    pub(crate) offset_sign: f32,
}

impl Default for LinearEngine {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            requested_gravity: Gravity::Center,
            divider: PerAxis::splat(0.0),
            uniform_size: false,
            viewport: Viewport::unbounded(),
            offset: PerAxis::splat(0.0),
            offset_sign: 1.0,
        }
    }
}

impl LinearEngine {
    pub(crate) const fn axis(&self) -> Axis {
        self.orientation.axis()
    }

    fn divider_along(&self) -> f32 {
        self.divider.get(self.axis())
    }

    fn gravity_fits(&self, gravity: Gravity) -> bool {
        let bounded = self.viewport.is_bounded(self.axis());
        match gravity {
            Gravity::Center => true,
            Gravity::Fill => bounded,
            Gravity::Left | Gravity::Right => {
                bounded && self.orientation == Orientation::Horizontal
            }
            Gravity::Top | Gravity::Bottom => bounded && self.orientation == Orientation::Vertical,
            Gravity::Front | Gravity::Back => bounded && self.orientation == Orientation::Stack,
        }
    }

    /// The gravity actually applied: the requested one when it is compatible
    /// with the orientation and viewport, `Center` otherwise.
    pub(crate) fn effective_gravity(&self) -> Gravity {
        if self.gravity_fits(self.requested_gravity) {
            self.requested_gravity
        } else {
            Gravity::Center
        }
    }

    /// Leading alignment of a fully placed strip of `total` occupied size.
    fn starting_offset(&self, total: f32) -> f32 {
        let gravity = self.effective_gravity();
        let extent = self.viewport.extent(self.axis());
        if gravity.is_leading() {
            -extent / 2.0
        } else if gravity.is_trailing() {
            extent / 2.0 - total
        } else {
            -total / 2.0
        }
    }

    /// Caches `id` with the given extent, inserting at the front or back of
    /// the known range. Returns `false` if `id` was already measured.
    pub(crate) fn measure_into(&self, cache: &mut AxisCache, id: usize, extent: f32) -> bool {
        if cache.contains(id) {
            return false;
        }
        // Position order follows id order, reversed when the offset domain
        // runs the other way. Counting keeps a re-measured interior item in
        // its old slot; for the usual contiguous growth it degenerates to
        // front or back insertion.
        let pos = if self.offset_sign > 0.0 {
            cache.ids().filter(|&other| other < id).count()
        } else {
            cache.ids().filter(|&other| other > id).count()
        };
        let pad = self.divider_along() / 2.0;
        cache.add(id, pos, extent, pad, pad);
        true
    }

    /// Computes the offset for one measured item by chaining from a placed
    /// positional neighbor, seeding from the starting offset when the item is
    /// at position 0 and nothing is placed yet.
    ///
    /// Returns whether the item, once placed, falls within the viewport —
    /// callers scanning for more items to measure stop on `false`.
    pub(crate) fn place_one(&self, cache: &mut AxisCache, id: usize) -> bool {
        let Some(pos) = cache.position_of(id) else {
            return false;
        };
        let prev = pos.checked_sub(1).and_then(|p| cache.id_at(p));
        let next = cache.id_at(pos + 1);

        if let Some(prev) = prev.filter(|&p| !cache.offset_of(p).is_nan()) {
            let alignment = cache.end_offset(prev);
            cache.place_after(id, alignment);
        } else if let Some(next) = next.filter(|&n| !cache.offset_of(n).is_nan()) {
            let alignment = cache.start_offset(next);
            cache.place_before(id, alignment);
        } else if pos == 0 {
            let alignment = self.starting_offset(cache.total_size_with_padding());
            cache.place_after(id, alignment);
        } else {
            return false;
        }
        self.in_viewport(cache, id)
    }

    /// Recomputes every offset from the starting offset, in position order.
    pub(crate) fn place_all(&self, cache: &mut AxisCache) {
        let mut alignment = self.starting_offset(cache.total_size_with_padding());
        let ids: Vec<usize> = cache.ids().collect();
        for id in ids {
            alignment = cache.place_after(id, alignment);
        }
    }

    /// Whole-set adjustments after a measurement pass, then a full re-place.
    ///
    /// Returns whether the placed strip fits the viewport.
    pub(crate) fn post_measure(&self, cache: &mut AxisCache, dynamic: bool) -> bool {
        if self.uniform_size && !dynamic {
            cache.uniform_size();
        }
        let extent = self.viewport.extent(self.axis());
        if self.effective_gravity() == Gravity::Fill && cache.len() > 1 {
            let slack = extent - cache.total_size();
            if slack <= 0.0 {
                cache.uniform_padding(0.0);
            } else {
                cache.uniform_padding(slack / (cache.len() - 1) as f32);
            }
        }
        self.place_all(cache);
        !extent.is_finite() || cache.total_size_with_padding() <= extent
    }

    /// Whether the placed item's body overlaps the viewport.
    ///
    /// Padding around an item occupies space but does not make it visible, so
    /// only the bare `offset ± size / 2` span is tested. Unmeasured and
    /// unplaced items are never in the viewport; an unbounded viewport
    /// contains every placed item.
    pub(crate) fn in_viewport(&self, cache: &AxisCache, id: usize) -> bool {
        let offset = cache.offset_of(id);
        if offset.is_nan() {
            return false;
        }
        let half = cache.entry(id).map_or(0.0, |e| e.size) / 2.0;
        let bound = self.viewport.extent(self.axis()) / 2.0;
        offset + half > -bound && offset - half < bound
    }

    /// Signed distance from the gravity's reference to the item, `NaN` when
    /// the item is unplaced.
    ///
    /// Leading gravities measure from the leading viewport edge to the start
    /// of the item's body, trailing gravities from the trailing edge to its
    /// end; `Center` measures from the viewport center to the item's center.
    /// An item flush against its gravity edge reports zero.
    pub(crate) fn distance_to(&self, cache: &AxisCache, id: usize) -> f32 {
        let offset = cache.offset_of(id);
        if offset.is_nan() {
            return f32::NAN;
        }
        let half = cache.entry(id).map_or(0.0, |e| e.size) / 2.0;
        let edge = self.viewport.extent(self.axis()) / 2.0;
        let gravity = self.effective_gravity();
        if gravity.is_leading() {
            -edge - (offset - half)
        } else if gravity.is_trailing() {
            edge - (offset + half)
        } else {
            -offset
        }
    }

    /// The center-most placed item per the effective gravity.
    ///
    /// For `Center`, scans from the midpoint of the cache outward for an item
    /// straddling offset zero, falling back to the placed item nearest it.
    pub(crate) fn center_of(&self, cache: &AxisCache) -> Option<usize> {
        let len = cache.len();
        if len == 0 {
            return None;
        }
        let gravity = self.effective_gravity();
        if gravity.is_leading() {
            return cache.id_at(0);
        }
        if gravity.is_trailing() {
            return cache.id_at(len - 1);
        }

        let mid = len / 2;
        let mut best: Option<(f32, usize)> = None;
        for step in 0..len {
            let pos = if step % 2 == 0 {
                mid + step / 2
            } else {
                let back = step / 2 + 1;
                let Some(pos) = mid.checked_sub(back) else {
                    continue;
                };
                pos
            };
            let Some(id) = cache.id_at(pos) else {
                continue;
            };
            let start = cache.start_offset(id);
            if start.is_nan() {
                continue;
            }
            if start <= 0.0 && cache.end_offset(id) >= 0.0 {
                return Some(id);
            }
            let distance = cache.offset_of(id).abs();
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, id));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Sequential layout along one axis, backed by a single [`AxisCache`].
#[derive(Debug, Clone, Default)]
pub struct LinearLayout {
    engine: LinearEngine,
    cache: AxisCache,
}

impl LinearLayout {
    /// A horizontal, center-gravity layout with an unbounded viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_offset_sign(orientation: Orientation, offset_sign: f32) -> Self {
        Self {
            engine: LinearEngine {
                orientation,
                offset_sign,
                ..LinearEngine::default()
            },
            cache: AxisCache::default(),
        }
    }

    /// The axis items are sequenced along.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.engine.orientation
    }

    /// Changes the orientation, discarding all cached geometry.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.engine.orientation != orientation {
            self.engine.orientation = orientation;
            self.invalidate();
        }
    }

    /// The gravity most recently requested, compatible or not.
    #[must_use]
    pub const fn requested_gravity(&self) -> Gravity {
        self.engine.requested_gravity
    }

    /// The gravity actually in effect.
    ///
    /// Differs from [`LinearLayout::requested_gravity`] when the request is
    /// incompatible with the orientation or an unbounded viewport, in which
    /// case the layout falls back to [`Gravity::Center`].
    #[must_use]
    pub fn gravity(&self) -> Gravity {
        self.engine.effective_gravity()
    }

    /// Requests a gravity. Placement is recomputed on the next pass.
    pub fn set_gravity(&mut self, gravity: Gravity) {
        if self.engine.requested_gravity != gravity {
            self.engine.requested_gravity = gravity;
            self.cache.invalidate(InvalidateScope::Offsets);
        }
    }

    /// The clipping viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.engine.viewport
    }

    /// Replaces the viewport, invalidating placement but not measurement.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.engine.viewport = viewport;
        self.cache.invalidate(InvalidateScope::Offsets);
    }

    /// The configured inter-item gap along `axis`.
    #[must_use]
    pub const fn divider_padding(&self, axis: Axis) -> f32 {
        self.engine.divider.get(axis)
    }

    /// Sets the inter-item gap. Only the orientation axis is accepted;
    /// returns whether the change was applied.
    pub fn set_divider_padding(&mut self, padding: f32, axis: Axis) -> bool {
        if axis != self.engine.axis() {
            return false;
        }
        self.engine.divider.set(axis, padding);
        // Cached paddings embed the old divider.
        self.cache.invalidate(InvalidateScope::All);
        true
    }

    /// Enables forcing every item to the largest measured size. Only applied
    /// to static containers, at post-measurement.
    pub fn set_uniform_size(&mut self, enable: bool) {
        self.engine.uniform_size = enable;
    }

    /// Enables edge padding on the first and last item.
    pub fn set_outer_padding(&mut self, enable: bool) {
        if self.cache.outer_padding() != enable {
            self.cache.invalidate(InvalidateScope::All);
            self.cache.set_outer_padding(enable);
        }
    }

    /// Static translation applied to every item along `axis`.
    ///
    /// Returns whether the change was accepted (always, for this variant).
    pub fn set_offset(&mut self, amount: f32, axis: Axis) -> bool {
        self.engine.offset.set(axis, amount);
        true
    }

    /// Measures one item and computes its offset.
    ///
    /// Re-measuring an already-measured index changes nothing. Returns
    /// whether the item is in the viewport after placement, so a scanning
    /// caller knows to keep going.
    pub fn measure_child<C: Container>(&mut self, index: usize, container: &C) -> bool {
        let extent = container.extent(index, self.engine.axis());
        self.measure_child_with_extent(index, extent)
    }

    /// Measurement with a caller-supplied extent, for layouts that transform
    /// sizes before caching (the ring converts arc lengths to angles).
    pub(crate) fn measure_child_with_extent(&mut self, index: usize, extent: f32) -> bool {
        if self.cache.contains(index) {
            return self.engine.in_viewport(&self.cache, index);
        }
        if !extent.is_finite() {
            return false;
        }
        self.engine.measure_into(&mut self.cache, index, extent);
        self.engine.place_one(&mut self.cache, index)
    }

    /// Measures every item, then runs post-measurement.
    ///
    /// Returns whether the full strip fits the viewport.
    pub fn measure_all<C: Container>(&mut self, container: &C) -> bool {
        let axis = self.engine.axis();
        self.measure_all_by(container.len(), container.is_dynamic(), |index| {
            container.extent(index, axis)
        })
    }

    pub(crate) fn measure_all_by(
        &mut self,
        len: usize,
        dynamic: bool,
        extent: impl Fn(usize) -> f32,
    ) -> bool {
        for index in 0..len {
            self.measure_child_with_extent(index, extent(index));
        }
        self.engine.post_measure(&mut self.cache, dynamic)
    }

    /// Measures outward from `center` (index 0 when `None`) until the
    /// viewport is covered in both directions or the data runs out, then runs
    /// post-measurement. Returns whether the measured strip fits.
    pub fn measure_until_full<C: Container>(
        &mut self,
        center: Option<usize>,
        container: &C,
    ) -> bool {
        let axis = self.engine.axis();
        self.measure_until_full_by(center, container.len(), container.is_dynamic(), |index| {
            container.extent(index, axis)
        })
    }

    pub(crate) fn measure_until_full_by(
        &mut self,
        center: Option<usize>,
        len: usize,
        dynamic: bool,
        extent: impl Fn(usize) -> f32,
    ) -> bool {
        if len > 0 {
            let start = center.unwrap_or(0).min(len - 1);
            let mut index = start as isize;
            let mut step = 1_isize;
            loop {
                let in_range = (0..len as isize).contains(&index);
                if !(in_range && self.measure_child_with_extent(index as usize, extent(index as usize)))
                {
                    if step < 0 {
                        break;
                    }
                    // The forward scan ran off the viewport or the data;
                    // cover the other side.
                    step = -1;
                    index = start as isize;
                }
                index += step;
            }
        }
        self.engine.post_measure(&mut self.cache, dynamic)
    }

    /// Measures the one item adjacent to the known range in `direction`.
    ///
    /// Returns the change in total occupied size, `0.0` when there was
    /// nothing left to measure.
    pub fn pre_measure_next<C: Container>(&mut self, direction: Direction, container: &C) -> f32 {
        let axis = self.engine.axis();
        self.pre_measure_next_by(direction, container.len(), |index| {
            container.extent(index, axis)
        })
    }

    pub(crate) fn pre_measure_next_by(
        &mut self,
        direction: Direction,
        len: usize,
        extent: impl Fn(usize) -> f32,
    ) -> f32 {
        let next = match direction {
            Direction::Forward => self.cache.ids().max().map_or(0, |id| id + 1),
            Direction::Backward => match self.cache.ids().min() {
                Some(0) | None => return 0.0,
                Some(first) => first - 1,
            },
        };
        if next >= len {
            return 0.0;
        }
        let before = self.cache.total_size_with_padding();
        self.measure_child_with_extent(next, extent(next));
        self.cache.total_size_with_padding() - before
    }

    /// Writes the item's computed position into the container.
    ///
    /// Returns `false` when the item is absent or not yet placed.
    pub fn layout_child<C: Container>(&self, index: usize, container: &mut C) -> bool {
        let offset = self.cache.offset_of(index);
        if offset.is_nan() {
            return false;
        }
        let axis = self.engine.axis();
        let Some(item) = container.item_mut(index) else {
            return false;
        };
        let along = self.engine.offset_sign * offset + self.engine.offset.get(axis);
        item.set_position(axis, axis.factor() * along);
        for other in Axis::ALL {
            let shift = self.engine.offset.get(other);
            if other != axis && shift != 0.0 {
                item.set_position(other, other.factor() * shift);
            }
        }
        item.transform_changed();
        true
    }

    /// Lays out every placed item.
    pub fn layout_children<C: Container>(&self, container: &mut C) {
        let ids: Vec<usize> = self.cache.ids().collect();
        for id in ids {
            self.layout_child(id, container);
        }
    }

    /// Discards all cached geometry.
    pub fn invalidate(&mut self) {
        self.cache.invalidate(InvalidateScope::All);
    }

    /// Forgets one item so the next pass re-measures it.
    pub fn invalidate_item(&mut self, index: usize) {
        self.cache.remove(index);
        // Neighbors placed relative to the removed item are stale.
        self.cache.invalidate(InvalidateScope::Offsets);
    }

    /// Whether the placed item overlaps the viewport.
    #[must_use]
    pub fn in_viewport(&self, index: usize) -> bool {
        self.engine.in_viewport(&self.cache, index)
    }

    /// The center-most measured item, per the effective gravity.
    #[must_use]
    pub fn center_child(&self) -> Option<usize> {
        self.engine.center_of(&self.cache)
    }

    /// Signed distance to the item along the orientation axis, measured from
    /// the effective gravity's reference: the leading viewport edge to the
    /// item's body start for leading gravities, the trailing edge to its body
    /// end for trailing ones, and the viewport center to the item's center
    /// for `Center`. `NaN` for other axes or unplaced items.
    #[must_use]
    pub fn distance_to_child(&self, index: usize, axis: Axis) -> f32 {
        if axis != self.engine.axis() {
            return f32::NAN;
        }
        self.engine.distance_to(&self.cache, index)
    }

    /// Which way to scroll to reach the item from the current center; `None`
    /// off the orientation axis.
    #[must_use]
    pub fn direction_to_child(&self, index: usize, axis: Axis) -> Option<Direction> {
        if axis != self.engine.axis() {
            return None;
        }
        Some(match self.center_child() {
            Some(center) if index < center => Direction::Backward,
            _ => Direction::Forward,
        })
    }

    /// Scrolls every placed offset along the orientation axis.
    ///
    /// Returns whether the axis was accepted.
    pub fn shift_by(&mut self, amount: f32, axis: Axis) -> bool {
        if axis != self.engine.axis() {
            return false;
        }
        self.cache.shift_by(amount);
        self.engine.viewport.shift_by(amount, axis);
        true
    }

    /// The cached extent of an item, `NaN` when unmeasured.
    #[must_use]
    pub fn measured_extent(&self, index: usize) -> f32 {
        self.cache.entry(index).map_or(f32::NAN, |e| e.size)
    }

    /// The item's signed center offset, `NaN` until placed.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f32 {
        self.cache.offset_of(index)
    }

    /// Total occupied size of the measured strip, padding included.
    #[must_use]
    pub const fn total_extent(&self) -> f32 {
        self.cache.total_size_with_padding()
    }

    /// Number of measured items.
    #[must_use]
    pub fn measured_len(&self) -> usize {
        self.cache.len()
    }

    pub(crate) const fn engine(&self) -> &LinearEngine {
        &self.engine
    }

    pub(crate) const fn engine_mut(&mut self) -> &mut LinearEngine {
        &mut self.engine
    }
}
