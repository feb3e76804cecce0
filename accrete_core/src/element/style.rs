// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flexbox layout intent carried by elements.
//!
//! These values are opaque to reconciliation, with the exception of
//! [`Direction`], which decides the canonical child order on platforms with a
//! flipped vertical axis (see [`order`](crate::order)).

/// Main axis along which children are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Children flow horizontally.
    #[default]
    Row,
    /// Children flow vertically.
    Column,
}

/// Distribution of children along the main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justification {
    /// Packed toward the start.
    #[default]
    FlexStart,
    /// Packed around the center.
    Center,
    /// Packed toward the end.
    FlexEnd,
    /// Evenly spaced, first and last flush with the edges.
    SpaceBetween,
    /// Evenly spaced with half-size gaps at the edges.
    SpaceAround,
}

/// Cross-axis alignment an element requests for itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelfAlignment {
    /// Defer to the parent's [`ChildAlignment`].
    #[default]
    Auto,
    /// Align to the cross-axis start.
    FlexStart,
    /// Center on the cross axis.
    Center,
    /// Align to the cross-axis end.
    FlexEnd,
    /// Fill the cross axis.
    Stretch,
}

/// Cross-axis alignment a parent applies to its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChildAlignment {
    /// Align to the cross-axis start.
    FlexStart,
    /// Center on the cross axis.
    Center,
    /// Align to the cross-axis end.
    FlexEnd,
    /// Fill the cross axis.
    #[default]
    Stretch,
}
