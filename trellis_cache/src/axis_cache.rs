// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-axis cache: id-keyed entries in position order with incremental totals.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::CacheEntry;

/// Which cached state to discard when a layout configuration changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateScope {
    /// Drop every entry and reset totals.
    All,
    /// Keep entries but unset every offset (geometry unchanged, placement stale).
    Offsets,
    /// Zero every size and the size total; offsets become stale too.
    Sizes,
    /// Zero every padding and the padding total; offsets become stale too.
    Padding,
}

/// Cached geometry for the measured items of one layout axis.
///
/// Entries are keyed by item id and kept in *position order* — the order the
/// items occupy along the axis. Ids may be appended at either end of the
/// position list as a streaming host extends the measured range, so position
/// order is not id order.
///
/// `total_size` and `total_padding` are maintained incrementally; the return
/// value of [`AxisCache::add`] reports the space the new item contributed so
/// containers can update their own statistics without a rescan.
///
/// Unless outer padding is enabled, the leading padding of the item at
/// position 0 and the trailing padding of the last item do not count toward
/// `total_padding`, and the effective padding reported for those boundary
/// positions is zero. Add and remove apply this rule symmetrically: removing
/// an item and re-adding it with the same parameters restores the previous
/// totals exactly.
#[derive(Debug, Clone, Default)]
pub struct AxisCache {
    entries: HashMap<usize, CacheEntry>,
    /// Ids in position order.
    order: Vec<usize>,
    total_size: f32,
    total_padding: f32,
    outer_padding: bool,
}

impl AxisCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(outer_padding: bool) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            total_size: 0.0,
            total_padding: 0.0,
            outer_padding,
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no items have been cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if the item is cached.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns `true` if boundary items keep their outer padding.
    #[must_use]
    pub const fn outer_padding(&self) -> bool {
        self.outer_padding
    }

    /// Enables or disables outer padding.
    ///
    /// This changes how future adds and removes account padding; it does not
    /// retroactively adjust `total_padding`, so callers flip it only on an
    /// empty or about-to-be-invalidated cache.
    pub fn set_outer_padding(&mut self, enable: bool) {
        self.outer_padding = enable;
    }

    /// Inserts an entry at position `pos` (clamped to `0..=len`).
    ///
    /// Returns the space the item added to the axis: its size plus the
    /// padding that newly counts toward `total_padding`, including padding of
    /// former boundary neighbors that just became interior. Adding an id that
    /// is already cached is a no-op returning `0.0`.
    pub fn add(
        &mut self,
        id: usize,
        pos: usize,
        size: f32,
        start_padding: f32,
        end_padding: f32,
    ) -> f32 {
        if self.contains(id) {
            debug_assert!(false, "AxisCache::add: id {id} is already cached");
            return 0.0;
        }
        debug_assert!(
            size.is_finite() && start_padding.is_finite() && end_padding.is_finite(),
            "AxisCache entries must have finite geometry"
        );

        let pos = pos.min(self.order.len());
        self.entries
            .insert(id, CacheEntry::new(id, size, start_padding, end_padding));
        self.order.insert(pos, id);
        self.total_size += size;

        let padding_space = self.account_padding(pos, true);
        padding_space + size
    }

    /// Removes an entry, updating totals symmetrically with [`AxisCache::add`].
    ///
    /// Silently does nothing if the id is not cached.
    pub fn remove(&mut self, id: usize) {
        let Some(pos) = self.position_of(id) else {
            return;
        };
        self.total_size -= self.entries[&id].size;
        self.account_padding(pos, false);
        self.entries.remove(&id);
        self.order.remove(pos);
    }

    /// Returns the id at the given position, if any.
    #[must_use]
    pub fn id_at(&self, pos: usize) -> Option<usize> {
        self.order.get(pos).copied()
    }

    /// Returns the position of an id, if cached.
    #[must_use]
    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.order.iter().position(|&next| next == id)
    }

    /// Returns the signed center offset of an item.
    ///
    /// `NaN` if the item is not cached or has not been placed yet; absence is
    /// expected while a streaming host is still populating the range.
    #[must_use]
    pub fn offset_of(&self, id: usize) -> f32 {
        self.entries.get(&id).map_or(f32::NAN, |e| e.offset)
    }

    /// Returns the item's size plus its effective paddings, or `NaN`.
    #[must_use]
    pub fn size_with_padding(&self, id: usize) -> f32 {
        let Some((pos, entry)) = self.lookup(id) else {
            return f32::NAN;
        };
        self.effective_start(pos, entry) + entry.size + self.effective_end(pos, entry)
    }

    /// Offset of the item's leading edge, inclusive of its effective leading padding.
    ///
    /// `NaN` if the item is absent or unplaced.
    #[must_use]
    pub fn start_offset(&self, id: usize) -> f32 {
        let Some((pos, entry)) = self.lookup(id) else {
            return f32::NAN;
        };
        entry.offset - self.effective_start(pos, entry) - entry.size / 2.0
    }

    /// Offset of the item's trailing edge, inclusive of its effective trailing padding.
    ///
    /// `NaN` if the item is absent or unplaced.
    #[must_use]
    pub fn end_offset(&self, id: usize) -> f32 {
        let Some((pos, entry)) = self.lookup(id) else {
            return f32::NAN;
        };
        entry.offset + entry.size / 2.0 + self.effective_end(pos, entry)
    }

    /// The item's effective leading padding (zero at the strip start unless
    /// outer padding is enabled), or `NaN` if absent.
    #[must_use]
    pub fn start_padding(&self, id: usize) -> f32 {
        self.lookup(id)
            .map_or(f32::NAN, |(pos, entry)| self.effective_start(pos, entry))
    }

    /// The item's effective trailing padding, or `NaN` if absent.
    #[must_use]
    pub fn end_padding(&self, id: usize) -> f32 {
        self.lookup(id)
            .map_or(f32::NAN, |(pos, entry)| self.effective_end(pos, entry))
    }

    /// Places the item so its occupied span starts at `alignment`.
    ///
    /// Sets the entry's offset to `alignment + start_padding + size / 2` and
    /// returns the alignment for the next item
    /// (`alignment + start_padding + size + end_padding`), so sequential
    /// placement chains one call into the next. `NaN` if the id is absent.
    pub fn place_after(&mut self, id: usize, alignment: f32) -> f32 {
        let Some(pos) = self.position_of(id) else {
            return f32::NAN;
        };
        let entry = self.entries[&id];
        let start = self.effective_start(pos, &entry);
        let end = self.effective_end(pos, &entry);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.offset = alignment + start + entry.size / 2.0;
        }
        alignment + start + entry.size + end
    }

    /// Places the item so its occupied span ends at `alignment`.
    ///
    /// Mirror of [`AxisCache::place_after`]: sets the offset to
    /// `alignment - end_padding - size / 2` and returns the alignment for the
    /// preceding item. `NaN` if the id is absent.
    pub fn place_before(&mut self, id: usize, alignment: f32) -> f32 {
        let Some(pos) = self.position_of(id) else {
            return f32::NAN;
        };
        let entry = self.entries[&id];
        let start = self.effective_start(pos, &entry);
        let end = self.effective_end(pos, &entry);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.offset = alignment - end - entry.size / 2.0;
        }
        alignment - (start + entry.size + end)
    }

    /// Forces every entry to the maximum cached size and returns that size.
    ///
    /// Existing offsets are invalidated, since the geometry changed.
    pub fn uniform_size(&mut self) -> f32 {
        let max = self
            .entries
            .values()
            .map(|e| e.size)
            .fold(0.0_f32, f32::max);
        for entry in self.entries.values_mut() {
            entry.size = max;
        }
        self.total_size = self.len() as f32 * max;
        self.invalidate(InvalidateScope::Offsets);
        max
    }

    /// Gives every entry the same padding, split evenly between its two sides.
    ///
    /// `total_padding` becomes `(len - 1) * padding`: one full gap per
    /// interior boundary. Existing offsets are invalidated. Returns the
    /// applied padding.
    pub fn uniform_padding(&mut self, padding: f32) -> f32 {
        for entry in self.entries.values_mut() {
            entry.start_padding = padding / 2.0;
            entry.end_padding = padding / 2.0;
        }
        self.total_padding = self.len().saturating_sub(1) as f32 * padding;
        self.invalidate(InvalidateScope::Offsets);
        padding
    }

    /// Translates every placed offset by a constant.
    ///
    /// Unplaced entries stay `NaN` (`NaN + amount` is still `NaN`).
    pub fn shift_by(&mut self, amount: f32) {
        for entry in self.entries.values_mut() {
            entry.offset += amount;
        }
    }

    /// Discards cached state per `scope`.
    pub fn invalidate(&mut self, scope: InvalidateScope) {
        match scope {
            InvalidateScope::All => {
                self.entries.clear();
                self.order.clear();
                self.total_size = 0.0;
                self.total_padding = 0.0;
            }
            InvalidateScope::Offsets => {
                for entry in self.entries.values_mut() {
                    entry.offset = f32::NAN;
                }
            }
            InvalidateScope::Sizes => {
                self.total_size = 0.0;
                for entry in self.entries.values_mut() {
                    entry.size = 0.0;
                    entry.offset = f32::NAN;
                }
            }
            InvalidateScope::Padding => {
                self.total_padding = 0.0;
                for entry in self.entries.values_mut() {
                    entry.start_padding = 0.0;
                    entry.end_padding = 0.0;
                    entry.offset = f32::NAN;
                }
            }
        }
    }

    /// Sum of entry sizes.
    #[must_use]
    pub const fn total_size(&self) -> f32 {
        self.total_size
    }

    /// Sum of entry sizes plus counted padding.
    #[must_use]
    pub const fn total_size_with_padding(&self) -> f32 {
        self.total_size + self.total_padding
    }

    /// Iterates ids in position order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// Returns the entry for an id, if cached.
    #[must_use]
    pub fn entry(&self, id: usize) -> Option<&CacheEntry> {
        self.entries.get(&id)
    }

    fn lookup(&self, id: usize) -> Option<(usize, &CacheEntry)> {
        let pos = self.position_of(id)?;
        Some((pos, &self.entries[&id]))
    }

    fn effective_start(&self, pos: usize, entry: &CacheEntry) -> f32 {
        if pos > 0 || self.outer_padding {
            entry.start_padding
        } else {
            0.0
        }
    }

    fn effective_end(&self, pos: usize, entry: &CacheEntry) -> f32 {
        if pos < self.len() - 1 || self.outer_padding {
            entry.end_padding
        } else {
            0.0
        }
    }

    /// Adds (or subtracts) the padding contribution of the entry at `pos`.
    ///
    /// Called with the entry present in the cache in both directions, so the
    /// boundary-exclusion arithmetic is identical for add and remove. When the
    /// entry is (or was) a new boundary item, the padding of the neighbor
    /// that changes between boundary and interior is accounted too.
    fn account_padding(&mut self, pos: usize, add: bool) -> f32 {
        let entry = self.entries[&self.order[pos]];
        let mut padding_space = self.effective_start(pos, &entry) + self.effective_end(pos, &entry);

        if self.len() > 1 && !self.outer_padding {
            if pos == 0 {
                padding_space += self.entries[&self.order[1]].start_padding;
            }
            if pos == self.len() - 1 {
                padding_space += self.entries[&self.order[pos - 1]].end_padding;
            }
        }

        self.total_padding += if add { padding_space } else { -padding_space };
        padding_space
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisCache, InvalidateScope};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn totals_track_interior_padding_only() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        cache.add(1, 1, 2.0, 0.5, 0.5);
        cache.add(2, 2, 2.0, 0.5, 0.5);

        assert!(close(cache.total_size(), 6.0));
        // Two interior gaps of 1.0 each; outer edges excluded.
        assert!(close(cache.total_size_with_padding(), 8.0));
    }

    #[test]
    fn outer_padding_counts_boundary_edges() {
        let mut cache = AxisCache::new(true);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        cache.add(1, 1, 2.0, 0.5, 0.5);

        // One interior gap plus both outer edges: 1.0 + 0.5 + 0.5.
        assert!(close(cache.total_size_with_padding(), 6.0));
    }

    #[test]
    fn add_then_remove_restores_empty_totals() {
        let mut cache = AxisCache::new(false);
        cache.add(7, 0, 3.0, 0.25, 0.25);
        cache.remove(7);

        assert_eq!(cache.len(), 0);
        assert!(close(cache.total_size(), 0.0));
        assert!(close(cache.total_size_with_padding(), 0.0));
    }

    #[test]
    fn remove_and_readd_restores_totals() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        cache.add(1, 1, 3.0, 0.5, 0.5);
        cache.add(2, 2, 4.0, 0.5, 0.5);
        let before = cache.total_size_with_padding();

        cache.remove(1);
        cache.add(1, 1, 3.0, 0.5, 0.5);
        assert!(close(cache.total_size_with_padding(), before));

        // Boundary item round trip exercises the neighbor adjustment.
        cache.remove(0);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        assert!(close(cache.total_size_with_padding(), before));
    }

    #[test]
    fn remove_of_unknown_id_is_a_no_op() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 1.0, 0.0, 0.0);
        cache.remove(99);
        assert_eq!(cache.len(), 1);
        assert!(close(cache.total_size(), 1.0));
    }

    #[test]
    fn placement_chains_forward_and_backward() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.0, 0.0);
        cache.add(1, 1, 2.0, 0.0, 0.0);

        assert!(cache.offset_of(0).is_nan());

        let next = cache.place_after(0, -2.0);
        assert!(close(cache.offset_of(0), -1.0));
        assert!(close(next, 0.0));

        let next = cache.place_after(1, next);
        assert!(close(cache.offset_of(1), 1.0));
        assert!(close(next, 2.0));

        let prev = cache.place_before(1, 2.0);
        assert!(close(cache.offset_of(1), 1.0));
        assert!(close(prev, 0.0));
    }

    #[test]
    fn placement_of_unknown_id_returns_nan() {
        let mut cache = AxisCache::new(false);
        assert!(cache.place_after(3, 0.0).is_nan());
        assert!(cache.place_before(3, 0.0).is_nan());
        assert!(cache.offset_of(3).is_nan());
        assert!(cache.size_with_padding(3).is_nan());
    }

    #[test]
    fn edge_offsets_include_effective_padding() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        cache.add(1, 1, 2.0, 0.5, 0.5);

        let next = cache.place_after(0, -3.0);
        cache.place_after(1, next);

        // First item: no leading padding at the boundary.
        assert!(close(cache.start_offset(0), -3.0));
        assert!(close(cache.end_offset(0), -0.5));
        // Second item: leading padding counted, no trailing at the boundary.
        assert!(close(cache.start_offset(1), -0.5));
        assert!(close(cache.end_offset(1), 2.0));
    }

    #[test]
    fn uniform_size_equalizes_and_invalidates_offsets() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 1.0, 0.0, 0.0);
        cache.add(1, 1, 5.0, 0.0, 0.0);
        cache.place_after(0, 0.0);

        let max = cache.uniform_size();
        assert!(close(max, 5.0));
        assert!(close(cache.total_size(), 10.0));
        assert!(cache.offset_of(0).is_nan());
    }

    #[test]
    fn uniform_padding_splits_gaps_evenly() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 1.0, 0.3, 0.3);
        cache.add(1, 1, 1.0, 0.3, 0.3);
        cache.add(2, 2, 1.0, 0.3, 0.3);

        cache.uniform_padding(1.0);
        assert!(close(cache.total_size_with_padding(), 3.0 + 2.0));
    }

    #[test]
    fn shift_by_translates_placed_offsets_only() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.0, 0.0);
        cache.add(1, 1, 2.0, 0.0, 0.0);
        cache.place_after(0, 0.0);

        cache.shift_by(10.0);
        assert!(close(cache.offset_of(0), 11.0));
        assert!(cache.offset_of(1).is_nan());
    }

    #[test]
    fn front_insertion_keeps_position_order() {
        let mut cache = AxisCache::new(false);
        cache.add(5, 0, 1.0, 0.0, 0.0);
        // Scrolling backward: lower index enters at the front.
        cache.add(4, 0, 1.0, 0.0, 0.0);

        assert_eq!(cache.id_at(0), Some(4));
        assert_eq!(cache.id_at(1), Some(5));
        assert_eq!(cache.position_of(5), Some(1));
        assert_eq!(cache.position_of(9), None);
    }

    #[test]
    fn invalidate_scopes() {
        let mut cache = AxisCache::new(false);
        cache.add(0, 0, 2.0, 0.5, 0.5);
        cache.add(1, 1, 2.0, 0.5, 0.5);
        cache.place_after(0, 0.0);

        cache.invalidate(InvalidateScope::Offsets);
        assert!(cache.offset_of(0).is_nan());
        assert_eq!(cache.len(), 2);

        cache.invalidate(InvalidateScope::Sizes);
        assert!(close(cache.total_size(), 0.0));

        cache.invalidate(InvalidateScope::Padding);
        assert!(close(cache.total_size_with_padding(), 0.0));

        cache.invalidate(InvalidateScope::All);
        assert!(cache.is_empty());
    }
}
