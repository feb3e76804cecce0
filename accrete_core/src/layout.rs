// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary to an external flexbox layout engine.
//!
//! The reconciler does not solve layout. An element tree is turned into a
//! tree of [`LayoutNode`]s, handed to a [`LayoutEngine`], and the resolved
//! [`Layout`] frames are written back onto the elements before the pass runs.
//! Resolved children pair with element children by index.

use alloc::vec::Vec;

use kurbo::{Insets, Rect, Size};

use crate::element::{ChildAlignment, Direction, Element, Justification, SelfAlignment};

/// Layout intent for one element, as consumed by a [`LayoutEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    /// Requested size; components may be [`UNDEFINED`](crate::element::UNDEFINED).
    pub size: Size,
    /// Children in description order.
    pub children: Vec<LayoutNode>,
    /// Main axis.
    pub direction: Direction,
    /// Outer spacing.
    pub margin: Insets,
    /// Inner spacing.
    pub padding: Insets,
    /// Whether children wrap.
    pub wrap: bool,
    /// Main-axis distribution.
    pub justification: Justification,
    /// Requested cross-axis alignment.
    pub self_alignment: SelfAlignment,
    /// Cross-axis alignment of children.
    pub child_alignment: ChildAlignment,
    /// Flex grow factor.
    pub flex: f64,
}

/// A resolved frame and the resolved frames of the children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    /// Resolved frame, relative to the parent.
    pub frame: Rect,
    /// Resolved children, index-aligned with [`LayoutNode::children`].
    pub children: Vec<Layout>,
}

/// Resolves a tree of layout intents into concrete frames.
pub trait LayoutEngine {
    /// Lays out `node` and its descendants.
    fn layout(&mut self, node: &LayoutNode) -> Layout;
}

impl Element {
    /// Assembles the layout intent for this subtree.
    #[must_use]
    pub fn layout_node(&self) -> LayoutNode {
        LayoutNode {
            size: self.frame.size(),
            children: self.children.iter().map(Self::layout_node).collect(),
            direction: self.direction,
            margin: self.margin,
            padding: self.padding,
            wrap: self.wrap,
            justification: self.justification,
            self_alignment: self.self_alignment,
            child_alignment: self.child_alignment,
            flex: self.flex,
        }
    }

    /// Writes resolved frames onto this subtree.
    ///
    /// Frames are expanded to integral coordinates. Children are paired by
    /// index; extra entries on either side are left untouched.
    pub fn apply_layout(&mut self, layout: &Layout) {
        self.frame = layout.frame.expand();
        for (child, child_layout) in self.children.iter_mut().zip(&layout.children) {
            child.apply_layout(child_layout);
        }
    }

    /// Runs `engine` over this subtree and applies the result.
    #[must_use]
    pub fn laid_out(mut self, engine: &mut dyn LayoutEngine) -> Self {
        let layout = engine.layout(&self.layout_node());
        self.apply_layout(&layout);
        self
    }
}
