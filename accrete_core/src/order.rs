// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical child traversal order.
//!
//! Some platforms (AppKit, for one) use a vertically flipped coordinate system,
//! so a column laid out top-to-bottom has to be stored bottom-to-top. That
//! reversal is a rendering adapter only: realization and list reconciliation
//! both go through [`canonical_children`], so old and new sibling lists are
//! always compared in the same order and the matching algorithm never sees
//! the platform difference.

use alloc::vec::Vec;

use crate::element::Direction;

/// How a platform stores the children of a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChildOrder {
    /// Children are stored in description order.
    #[default]
    Natural,
    /// Children of a [`Direction::Column`] element are stored reversed.
    FlippedColumns,
}

impl ChildOrder {
    /// Returns whether children laid out along `direction` are stored
    /// reversed.
    #[must_use]
    pub const fn reverses(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Self::FlippedColumns, Direction::Column)
        )
    }
}

/// Converts description-order children into the platform's storage order.
#[must_use]
pub fn canonical_children<T>(mut children: Vec<T>, direction: Direction, order: ChildOrder) -> Vec<T> {
    if order.reverses(direction) {
        children.reverse();
    }
    children
}
