// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Cache: incremental per-axis item geometry for layout engines.
//!
//! This crate provides [`AxisCache`], a small bookkeeping structure that a
//! layout engine uses to track, for each item it has measured along one axis:
//!
//! - the item's size,
//! - the padding on either side of it,
//! - and, once placement has run, the signed center offset of the item
//!   relative to a fixed layout origin.
//!
//! Items are keyed by an integer id (typically the item's index in a
//! host-owned container) and additionally kept in *position order*: the order
//! items occupy along the axis, which is generally not id order because a
//! streaming host may grow the measured range at either end as the user
//! scrolls.
//!
//! Totals (`total_size`, `total_padding`) are maintained incrementally on
//! every add and remove, so a container can keep aggregate statistics without
//! rescanning. The outer-padding rule — the leading padding of the first item
//! and the trailing padding of the last item are excluded from the totals
//! unless explicitly enabled — is applied symmetrically on add and remove.
//!
//! Offsets start out as [`f32::NAN`] ("not yet placed") and are assigned by
//! chaining [`AxisCache::place_after`] / [`AxisCache::place_before`]: each
//! call places one item and returns the alignment to seed its neighbor with.
//!
//! ## Concurrency
//!
//! The original system this crate derives from serialized every cache
//! operation behind a per-instance lock, because a measurement pass and a
//! UI-driven invalidation could race. Here that exclusive-access invariant is
//! expressed through ownership: all mutation goes through `&mut self`, and a
//! host that genuinely shares one cache across threads wraps it in its own
//! mutex. `AxisCache` is `Send`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod axis_cache;
mod entry;

pub use axis_cache::{AxisCache, InvalidateScope};
pub use entry::CacheEntry;
