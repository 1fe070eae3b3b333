// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item cached geometry for one layout axis.

/// Cached geometry for a single item along one axis.
///
/// `offset` is the signed center position of the item relative to the layout
/// origin and stays [`f32::NAN`] until placement has run for this item. The
/// paddings stored here are the *configured* values; whether they count
/// toward totals at the strip boundary is decided by the owning
/// [`AxisCache`](crate::AxisCache).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    /// Item id, typically the data index in the host container.
    pub id: usize,
    /// Item size along the axis.
    pub size: f32,
    /// Configured padding before the item.
    pub start_padding: f32,
    /// Configured padding after the item.
    pub end_padding: f32,
    /// Signed center offset; `NaN` until computed.
    pub offset: f32,
}

impl CacheEntry {
    /// Creates an entry with the given geometry and an unset offset.
    #[must_use]
    pub const fn new(id: usize, size: f32, start_padding: f32, end_padding: f32) -> Self {
        Self {
            id,
            size,
            start_padding,
            end_padding,
            offset: f32::NAN,
        }
    }

    /// Returns `true` once the offset has been assigned.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        !self.offset.is_nan()
    }
}
