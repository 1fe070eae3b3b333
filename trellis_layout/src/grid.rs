// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-axis grid layout.
//!
//! A grid is two chunked sequential layouts run over the same items: one
//! horizontal (each row is a chunk with its own cache) and one vertical (each
//! column is a chunk). Exactly one axis is the scrolling one; its chunk count
//! is fixed and the other axis' chunk size follows from it, so the two
//! partitions are complementary by construction.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::num::NonZeroUsize;

use smallvec::SmallVec;
use trellis_cache::{AxisCache, InvalidateScope};

use crate::axis::{Axis, Direction, Gravity, Orientation, PerAxis};
use crate::container::Container;
use crate::linear::LinearEngine;
use crate::viewport::Viewport;

/// Maps a flat item index to a chunk and a position within that chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkBreaker {
    /// Chunks of a fixed size; the number of chunks grows with the data.
    BySize(NonZeroUsize),
    /// A fixed number of chunks, filled round-robin; chunk size grows with
    /// the data.
    IntoCount(NonZeroUsize),
}

impl ChunkBreaker {
    /// The chunk holding the item at `index`.
    #[must_use]
    pub const fn chunk_index(self, index: usize) -> usize {
        match self {
            Self::BySize(size) => index / size.get(),
            Self::IntoCount(count) => index % count.get(),
        }
    }

    /// The item's position within its chunk.
    #[must_use]
    pub const fn position_in_chunk(self, index: usize) -> usize {
        match self {
            Self::BySize(size) => index % size.get(),
            Self::IntoCount(count) => index / count.get(),
        }
    }

    /// Inverse of [`ChunkBreaker::chunk_index`] / [`ChunkBreaker::position_in_chunk`].
    #[must_use]
    pub const fn flat_index(self, chunk: usize, position: usize) -> usize {
        match self {
            Self::BySize(size) => chunk * size.get() + position,
            Self::IntoCount(count) => position * count.get() + chunk,
        }
    }

    /// Number of chunks needed for `len` items.
    #[must_use]
    pub const fn chunk_count(self, len: usize) -> usize {
        match self {
            Self::BySize(size) => len.div_ceil(size.get()),
            Self::IntoCount(count) => {
                if count.get() < len {
                    count.get()
                } else {
                    len
                }
            }
        }
    }

    /// Number of items per chunk for `len` items.
    #[must_use]
    pub const fn chunk_size(self, len: usize) -> usize {
        match self {
            Self::BySize(size) => size.get(),
            Self::IntoCount(count) => len.div_ceil(count.get()),
        }
    }
}

/// One sequential engine run over many chunk caches.
#[derive(Debug, Clone)]
struct ChunkedLinear {
    engine: LinearEngine,
    breaker: ChunkBreaker,
    caches: BTreeMap<usize, AxisCache>,
    /// Run post-measurement even when this is not the scrolling sub-layout,
    /// so the bounded axis still gets uniform sizing and placement.
    force_post: bool,
}

impl ChunkedLinear {
    fn new(orientation: Orientation, breaker: ChunkBreaker, force_post: bool) -> Self {
        Self {
            engine: LinearEngine {
                orientation,
                uniform_size: true,
                ..LinearEngine::default()
            },
            breaker,
            caches: BTreeMap::new(),
            force_post,
        }
    }

    fn cache_of(&self, index: usize) -> Option<&AxisCache> {
        self.caches.get(&self.breaker.chunk_index(index))
    }

    fn measure(&mut self, index: usize, extent: f32) -> bool {
        if !extent.is_finite() {
            return false;
        }
        let chunk = self.breaker.chunk_index(index);
        let cache = self.caches.entry(chunk).or_default();
        if cache.contains(index) {
            return self.engine.in_viewport(cache, index);
        }
        self.engine.measure_into(cache, index, extent);
        self.engine.place_one(cache, index)
    }

    fn post_measure(&mut self, dynamic: bool, authoritative: bool) -> bool {
        if !(authoritative || self.force_post) {
            return true;
        }
        let mut fits = true;
        for cache in self.caches.values_mut() {
            fits &= self.engine.post_measure(cache, dynamic);
        }
        fits
    }

    fn offset_of(&self, index: usize) -> f32 {
        self.cache_of(index).map_or(f32::NAN, |c| c.offset_of(index))
    }

    fn in_viewport(&self, index: usize) -> bool {
        self.cache_of(index)
            .is_some_and(|c| self.engine.in_viewport(c, index))
    }

    fn distance_to(&self, index: usize) -> f32 {
        self.cache_of(index)
            .map_or(f32::NAN, |c| self.engine.distance_to(c, index))
    }

    /// One center candidate per measured chunk.
    fn center_candidates(&self) -> SmallVec<[usize; 8]> {
        self.caches
            .values()
            .filter_map(|cache| self.engine.center_of(cache))
            .collect()
    }

    fn measured_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.caches.values().flat_map(AxisCache::ids).collect();
        ids.sort_unstable();
        ids
    }

    fn measured_len(&self) -> usize {
        self.caches.values().map(AxisCache::len).sum()
    }

    /// Occupied extent along this sub-layout's axis: the largest chunk strip.
    fn occupied_extent(&self) -> f32 {
        self.caches
            .values()
            .map(AxisCache::total_size_with_padding)
            .fold(0.0_f32, f32::max)
    }

    fn invalidate(&mut self) {
        self.caches.clear();
    }

    fn invalidate_item(&mut self, index: usize) {
        let chunk = self.breaker.chunk_index(index);
        let Some(cache) = self.caches.get_mut(&chunk) else {
            return;
        };
        cache.remove(index);
        if cache.is_empty() {
            // An emptied chunk would otherwise linger across invalidation
            // churn.
            self.caches.remove(&chunk);
        } else {
            cache.invalidate(InvalidateScope::Offsets);
        }
    }

    fn shift_by(&mut self, amount: f32) {
        for cache in self.caches.values_mut() {
            cache.shift_by(amount);
        }
        self.engine.viewport.shift_by(amount, self.engine.axis());
    }
}

/// Grid layout composing a row and a column sub-layout over shared items.
///
/// Constructed for a horizontal or vertical scroll axis; a depth-stacked grid
/// is not representable. Uniform cell sizing is on by default: every cell in
/// a chunk takes the extent of that chunk's largest cell.
#[derive(Debug, Clone)]
pub struct GridLayout {
    orientation: Orientation,
    /// Horizontally oriented; one chunk (and cache) per row.
    rows: ChunkedLinear,
    /// Vertically oriented; one chunk per column.
    columns: ChunkedLinear,
    offset: PerAxis,
}

impl GridLayout {
    /// A grid scrolling horizontally with a fixed number of rows.
    ///
    /// Items fill rows round-robin: consecutive indices go to consecutive
    /// rows, and every group of `row_count` indices forms one column.
    #[must_use]
    pub fn horizontal(row_count: NonZeroUsize) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            rows: ChunkedLinear::new(
                Orientation::Horizontal,
                ChunkBreaker::IntoCount(row_count),
                false,
            ),
            columns: ChunkedLinear::new(
                Orientation::Vertical,
                ChunkBreaker::BySize(row_count),
                true,
            ),
            offset: PerAxis::splat(0.0),
        }
    }

    /// A grid scrolling vertically with a fixed number of columns.
    #[must_use]
    pub fn vertical(column_count: NonZeroUsize) -> Self {
        Self {
            orientation: Orientation::Vertical,
            rows: ChunkedLinear::new(
                Orientation::Horizontal,
                ChunkBreaker::BySize(column_count),
                true,
            ),
            columns: ChunkedLinear::new(
                Orientation::Vertical,
                ChunkBreaker::IntoCount(column_count),
                false,
            ),
            offset: PerAxis::splat(0.0),
        }
    }

    /// The scrolling orientation fixed at construction.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The breaker partitioning items into rows.
    #[must_use]
    pub const fn row_breaker(&self) -> ChunkBreaker {
        self.rows.breaker
    }

    /// The breaker partitioning items into columns.
    #[must_use]
    pub const fn column_breaker(&self) -> ChunkBreaker {
        self.columns.breaker
    }

    fn authoritative(&self) -> &ChunkedLinear {
        match self.orientation {
            Orientation::Vertical => &self.columns,
            _ => &self.rows,
        }
    }

    /// Replaces the viewport on both sub-layouts.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.rows.engine.viewport = viewport;
        self.columns.engine.viewport = viewport;
        for cache in self
            .rows
            .caches
            .values_mut()
            .chain(self.columns.caches.values_mut())
        {
            cache.invalidate(InvalidateScope::Offsets);
        }
    }

    /// Requests a gravity for one axis (`X` packs rows, `Y` packs columns).
    ///
    /// Returns whether the axis was accepted; the request itself may still be
    /// resolved to `Center` when incompatible, as for the linear layout.
    pub fn set_gravity(&mut self, gravity: Gravity, axis: Axis) -> bool {
        let sub = match axis {
            Axis::X => &mut self.rows,
            Axis::Y => &mut self.columns,
            Axis::Z => return false,
        };
        sub.engine.requested_gravity = gravity;
        for cache in sub.caches.values_mut() {
            cache.invalidate(InvalidateScope::Offsets);
        }
        true
    }

    /// The gravity in effect along `axis`.
    #[must_use]
    pub fn gravity(&self, axis: Axis) -> Gravity {
        match axis {
            Axis::X => self.rows.engine.effective_gravity(),
            Axis::Y => self.columns.engine.effective_gravity(),
            Axis::Z => Gravity::Center,
        }
    }

    /// Sets the inter-item gap along `X` or `Y`. Returns whether applied.
    pub fn set_divider_padding(&mut self, padding: f32, axis: Axis) -> bool {
        let sub = match axis {
            Axis::X => &mut self.rows,
            Axis::Y => &mut self.columns,
            Axis::Z => return false,
        };
        sub.engine.divider.set(axis, padding);
        sub.invalidate();
        true
    }

    /// Disables the default uniform cell sizing.
    pub fn set_uniform_size(&mut self, enable: bool) {
        self.rows.engine.uniform_size = enable;
        self.columns.engine.uniform_size = enable;
    }

    /// Static translation applied to every item along `axis`.
    pub fn set_offset(&mut self, amount: f32, axis: Axis) -> bool {
        self.offset.set(axis, amount);
        true
    }

    /// Measures one item into both the row and the column decomposition.
    ///
    /// Returns viewport fit along the scrolling axis; the bounded axis is
    /// kept consistent but is not authoritative.
    pub fn measure_child<C: Container>(&mut self, index: usize, container: &C) -> bool {
        let row_fit = self
            .rows
            .measure(index, container.extent(index, Axis::X));
        let column_fit = self
            .columns
            .measure(index, container.extent(index, Axis::Y));
        match self.orientation {
            Orientation::Vertical => column_fit,
            _ => row_fit,
        }
    }

    /// Measures every item, then runs post-measurement on both axes.
    pub fn measure_all<C: Container>(&mut self, container: &C) -> bool {
        for index in 0..container.len() {
            self.measure_child(index, container);
        }
        self.post_measure(container.is_dynamic())
    }

    /// Measures from `center` (index 0 when `None`) toward higher indices
    /// until the scrolling axis runs off the viewport or the data ends.
    ///
    /// Only the leading-edge scan is supported for grids; callers wanting a
    /// window around an interior anchor start a few chunks earlier.
    pub fn measure_until_full<C: Container>(
        &mut self,
        center: Option<usize>,
        container: &C,
    ) -> bool {
        let mut index = center.unwrap_or(0);
        while index < container.len() && self.measure_child(index, container) {
            index += 1;
        }
        self.post_measure(container.is_dynamic())
    }

    fn post_measure(&mut self, dynamic: bool) -> bool {
        let horizontal = self.orientation != Orientation::Vertical;
        let row_fit = self.rows.post_measure(dynamic, horizontal);
        let column_fit = self.columns.post_measure(dynamic, !horizontal);
        if horizontal { row_fit } else { column_fit }
    }

    /// Measures the one item adjacent to the measured range in `direction`.
    ///
    /// Returns the change in occupied extent along the scrolling axis.
    pub fn pre_measure_next<C: Container>(&mut self, direction: Direction, container: &C) -> f32 {
        let ids = self.authoritative().measured_ids();
        let next = match direction {
            Direction::Forward => ids.last().map_or(0, |&id| id + 1),
            Direction::Backward => match ids.first() {
                Some(0) | None => return 0.0,
                Some(&first) => first - 1,
            },
        };
        if next >= container.len() {
            return 0.0;
        }
        let before = self.authoritative().occupied_extent();
        self.measure_child(next, container);
        self.authoritative().occupied_extent() - before
    }

    /// Writes the item's computed cell position into the container.
    pub fn layout_child<C: Container>(&self, index: usize, container: &mut C) -> bool {
        let x = self.rows.offset_of(index);
        let y = self.columns.offset_of(index);
        if x.is_nan() || y.is_nan() {
            return false;
        }
        let Some(item) = container.item_mut(index) else {
            return false;
        };
        item.set_position(Axis::X, Axis::X.factor() * (x + self.offset.x));
        item.set_position(Axis::Y, Axis::Y.factor() * (y + self.offset.y));
        if self.offset.z != 0.0 {
            item.set_position(Axis::Z, Axis::Z.factor() * self.offset.z);
        }
        item.transform_changed();
        true
    }

    /// Lays out every measured item.
    pub fn layout_children<C: Container>(&self, container: &mut C) {
        for id in self.authoritative().measured_ids() {
            self.layout_child(id, container);
        }
    }

    /// The item center-most in both its row and its column, if any measured
    /// item is.
    #[must_use]
    pub fn center_child(&self) -> Option<usize> {
        let rows = self.rows.center_candidates();
        let columns = self.columns.center_candidates();
        rows.iter().copied().find(|id| columns.contains(id))
    }

    /// Whether the item's cell overlaps the viewport on the scrolling axis.
    #[must_use]
    pub fn in_viewport(&self, index: usize) -> bool {
        self.authoritative().in_viewport(index)
    }

    /// The item's cell-center offset along `X` or `Y`; `NaN` when unplaced.
    #[must_use]
    pub fn offset_of(&self, index: usize, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.rows.offset_of(index),
            Axis::Y => self.columns.offset_of(index),
            Axis::Z => f32::NAN,
        }
    }

    /// Signed distance to the cell along `X` or `Y`, measured from that
    /// axis' effective gravity reference as for the linear layout. `NaN` for
    /// `Z` and unplaced items.
    #[must_use]
    pub fn distance_to_child(&self, index: usize, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.rows.distance_to(index),
            Axis::Y => self.columns.distance_to(index),
            Axis::Z => f32::NAN,
        }
    }

    /// Which way to scroll to reach the item from the current center; `None`
    /// along the untracked depth axis.
    #[must_use]
    pub fn direction_to_child(&self, index: usize, axis: Axis) -> Option<Direction> {
        if axis == Axis::Z {
            return None;
        }
        Some(match self.center_child() {
            Some(center) if index < center => Direction::Backward,
            _ => Direction::Forward,
        })
    }

    /// Scrolls the grid along its orientation axis. Returns whether accepted.
    pub fn shift_by(&mut self, amount: f32, axis: Axis) -> bool {
        if axis != self.orientation.axis() {
            return false;
        }
        match self.orientation {
            Orientation::Vertical => self.columns.shift_by(amount),
            _ => self.rows.shift_by(amount),
        }
        true
    }

    /// Discards all cached geometry.
    pub fn invalidate(&mut self) {
        self.rows.invalidate();
        self.columns.invalidate();
    }

    /// Forgets one item on both axes so the next pass re-measures it.
    pub fn invalidate_item(&mut self, index: usize) {
        self.rows.invalidate_item(index);
        self.columns.invalidate_item(index);
    }

    /// Number of measured items.
    #[must_use]
    pub fn measured_len(&self) -> usize {
        self.authoritative().measured_len()
    }
}
