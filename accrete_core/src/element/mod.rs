// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Description elements.
//!
//! An [`Element`] is a value describing one view for one reconciliation pass:
//! its geometry, visibility, opacity, layout intent, identity [`Key`], variant
//! ([`ElementKind`]), and ordered children. Applications rebuild the whole
//! element tree each pass; the reconciler compares it to the
//! [`RealizedElement`](crate::reconcile::RealizedElement) tree from the
//! previous pass.
//!
//! Elements are built with consuming `with_*` methods:
//!
//! ```
//! use accrete_core::element::{Direction, Element};
//!
//! let list = Element::new()
//!     .with_direction(Direction::Column)
//!     .with_children([
//!         Element::new().with_key("a").with_size(100.0, 20.0),
//!         Element::new().with_key("b").with_size(100.0, 20.0).with_hidden(true),
//!     ]);
//! assert_eq!(list.children.len(), 2);
//! ```

mod key;
mod kind;
mod style;

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Insets, Rect, Size};

use crate::layer::SurfaceId;

pub use key::Key;
pub use kind::{CloneKind, Container, ElementKind, KindId, Surface};
pub use style::{ChildAlignment, Direction, Justification, SelfAlignment};

/// Sentinel for a dimension the layout engine has not resolved yet.
pub const UNDEFINED: f64 = f64::NAN;

/// Default opacity of a freshly created view.
pub const OPAQUE: f64 = 1.0;

/// A description of one view and its children for a single pass.
#[derive(Clone, Debug)]
pub struct Element {
    /// Position and size relative to the parent view.
    ///
    /// May contain [`UNDEFINED`] components until layout has run.
    pub frame: Rect,
    /// Identity hint for sibling matching.
    pub key: Option<Key>,
    /// Whether the view is hidden.
    pub hidden: bool,
    /// View opacity in `[0, 1]`.
    pub opacity: f64,
    /// Ordered children, in description order.
    pub children: Vec<Element>,
    /// Main layout axis for the children.
    pub direction: Direction,
    /// Outer spacing.
    pub margin: Insets,
    /// Inner spacing.
    pub padding: Insets,
    /// Whether children wrap onto further lines.
    pub wrap: bool,
    /// Main-axis distribution of children.
    pub justification: Justification,
    /// Cross-axis alignment requested for this element.
    pub self_alignment: SelfAlignment,
    /// Cross-axis alignment applied to children.
    pub child_alignment: ChildAlignment,
    /// Flex grow factor.
    pub flex: f64,
    /// Concrete variant.
    pub kind: Box<dyn ElementKind>,
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

impl Element {
    /// Creates an unsized, visible, opaque [`Container`] with no children.
    #[must_use]
    pub fn new() -> Self {
        Self::of_kind(Container)
    }

    /// Creates an element of the given variant with default properties.
    #[must_use]
    pub fn of_kind(kind: impl ElementKind) -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, UNDEFINED, UNDEFINED),
            key: None,
            hidden: false,
            opacity: OPAQUE,
            children: Vec::new(),
            direction: Direction::Row,
            margin: Insets::ZERO,
            padding: Insets::ZERO,
            wrap: false,
            justification: Justification::FlexStart,
            self_alignment: SelfAlignment::Auto,
            child_alignment: ChildAlignment::Stretch,
            flex: 0.0,
            kind: Box::new(kind),
        }
    }

    /// Creates a [`Surface`] leaf presenting `surface`.
    #[must_use]
    pub fn surface(surface: SurfaceId) -> Self {
        Self::of_kind(Surface { surface })
    }

    /// Returns the identity key, treating an empty key as absent.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref().filter(|k| !k.is_empty())
    }

    /// Returns whether `self` may be diffed in place against `old`.
    #[must_use]
    pub fn can_diff(&self, old: &Self) -> bool {
        self.kind.can_diff(&*old.kind)
    }

    /// Returns the number of elements in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    // -- Builders --

    /// Sets the size, keeping the origin.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.frame = Rect::from_origin_size(self.frame.origin(), Size::new(width, height));
        self
    }

    /// Sets the whole frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }

    /// Sets the identity key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the hidden flag.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Replaces the children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the main layout axis.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the padding.
    #[must_use]
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Sets whether children wrap.
    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Sets the main-axis distribution.
    #[must_use]
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    /// Sets the requested cross-axis alignment.
    #[must_use]
    pub fn with_self_alignment(mut self, alignment: SelfAlignment) -> Self {
        self.self_alignment = alignment;
        self
    }

    /// Sets the cross-axis alignment of children.
    #[must_use]
    pub fn with_child_alignment(mut self, alignment: ChildAlignment) -> Self {
        self.child_alignment = alignment;
        self
    }

    /// Sets the flex grow factor.
    #[must_use]
    pub fn with_flex(mut self, flex: f64) -> Self {
        self.flex = flex;
        self
    }
}

/// Frame equality where an [`UNDEFINED`] component equals another
/// [`UNDEFINED`] component.
#[must_use]
pub fn same_frame(a: Rect, b: Rect) -> bool {
    fn same(a: f64, b: f64) -> bool {
        a == b || (a.is_nan() && b.is_nan())
    }
    same(a.x0, b.x0) && same(a.y0, b.y0) && same(a.x1, b.x1) && same(a.y1, b.y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frame_is_undefined() {
        let e = Element::new();
        assert_eq!(e.frame.x0, 0.0);
        assert!(e.frame.width().is_nan());
        assert!(same_frame(e.frame, Element::new().frame));
    }

    #[test]
    fn with_size_keeps_origin() {
        let e = Element::new()
            .with_frame(Rect::new(5.0, 6.0, 7.0, 8.0))
            .with_size(10.0, 20.0);
        assert_eq!(e.frame, Rect::new(5.0, 6.0, 15.0, 26.0));
    }

    #[test]
    fn empty_key_is_no_key() {
        assert!(Element::new().with_key("").key().is_none());
        assert_eq!(
            Element::new().with_key("a").key().map(Key::as_str),
            Some("a")
        );
    }

    #[test]
    fn same_frame_distinguishes_real_changes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(same_frame(a, a));
        assert!(!same_frame(a, Rect::new(0.0, 0.0, 10.0, 11.0)));
        assert!(!same_frame(a, Rect::new(0.0, 0.0, UNDEFINED, 10.0)));
    }

    #[test]
    fn variants_decide_compatibility() {
        let plain = Element::new();
        let leaf = Element::surface(SurfaceId(1));
        assert!(plain.can_diff(&Element::new()));
        assert!(!plain.can_diff(&leaf));
        assert!(leaf.can_diff(&Element::surface(SurfaceId(2))));
    }

    #[test]
    fn subtree_len_counts_descendants() {
        let tree = Element::new().with_children([
            Element::new().with_child(Element::new()),
            Element::new(),
        ]);
        assert_eq!(tree.subtree_len(), 4);
    }
}
