// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live counterparts of elements.

use alloc::vec::Vec;

use super::list::Identity;
use crate::element::{Element, ElementKind, Key};
use crate::layer::ViewId;

/// An element that has been realized into a view.
///
/// Owns exactly one live view for its whole lifetime. The view is created by
/// [`Pass::realize`](super::Pass::realize) and released by
/// [`Pass::derealize`](super::Pass::derealize) or by the removal of this node
/// during a diff; property-only changes never recreate it.
///
/// The stored element is shallow: its `children` are always empty, and the
/// children's descriptions live in [`children`](Self::children). Children are
/// kept in the order their views are attached, which is the description order
/// unless the backend stores this element's children flipped.
#[derive(Debug)]
pub struct RealizedElement {
    pub(crate) element: Element,
    pub(crate) view: ViewId,
    pub(crate) children: Vec<RealizedElement>,
    pub(crate) reversed: bool,
}

impl RealizedElement {
    /// The element this node currently reflects, without its children.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The view owned by this node.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// Realized children, in attach order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns whether `children` are stored in reverse description order.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Returns the identity key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.element.key()
    }

    /// Rebuilds the full description tree, children in description order.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        element.children = self.children.iter().map(Self::to_element).collect();
        if self.reversed {
            element.children.reverse();
        }
        element
    }

    /// Returns every view in this subtree, depth-first, parents first.
    #[must_use]
    pub fn subtree_views(&self) -> Vec<ViewId> {
        let mut views = Vec::new();
        self.collect_views(&mut views);
        views
    }

    fn collect_views(&self, out: &mut Vec<ViewId>) {
        out.push(self.view);
        for child in &self.children {
            child.collect_views(out);
        }
    }

    /// Finds the first descendant (or `self`) carrying `key`.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Self> {
        if self.key().is_some_and(|k| k.as_str() == key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

impl Identity for RealizedElement {
    fn key(&self) -> Option<&Key> {
        self.element.key()
    }

    fn kind(&self) -> &dyn ElementKind {
        &*self.element.kind
    }
}
