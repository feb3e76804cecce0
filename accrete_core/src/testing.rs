// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording [`ViewBackend`] for tests.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::backend::ViewBackend;
use crate::layer::{SurfaceId, ViewId};
use crate::order::ChildOrder;

/// One primitive call made against a [`RecordingBackend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Op {
    Create(ViewId),
    Destroy(ViewId),
    Attach {
        parent: ViewId,
        child: ViewId,
        index: Option<usize>,
    },
    Detach(ViewId),
    Frame(ViewId, Rect),
    Hidden(ViewId, bool),
    Opacity(ViewId, f64),
    Content(ViewId, Option<SurfaceId>),
}

impl Op {
    pub(crate) fn is_property(&self) -> bool {
        matches!(
            self,
            Self::Frame(..) | Self::Hidden(..) | Self::Opacity(..) | Self::Content(..)
        )
    }
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<ViewId>,
    children: Vec<ViewId>,
}

/// Logs every call and mirrors the resulting view tree.
///
/// Contract violations (unknown handles, double parents, destroying a view
/// that still has children) panic.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) ops: Vec<Op>,
    nodes: HashMap<ViewId, Node>,
    next: u32,
    order: ChildOrder,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_child_order(order: ChildOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Returns and clears the log.
    pub(crate) fn take_ops(&mut self) -> Vec<Op> {
        core::mem::take(&mut self.ops)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_live(&self, view: ViewId) -> bool {
        self.nodes.contains_key(&view)
    }

    pub(crate) fn children_of(&self, view: ViewId) -> &[ViewId] {
        &self.node(view).children
    }

    pub(crate) fn parent_of(&self, view: ViewId) -> Option<ViewId> {
        self.node(view).parent
    }

    fn node(&self, view: ViewId) -> &Node {
        match self.nodes.get(&view) {
            Some(node) => node,
            None => panic!("unknown view {view:?}"),
        }
    }

    fn node_mut(&mut self, view: ViewId) -> &mut Node {
        match self.nodes.get_mut(&view) {
            Some(node) => node,
            None => panic!("unknown view {view:?}"),
        }
    }

    fn unlink(&mut self, view: ViewId) {
        if let Some(parent) = self.node_mut(view).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != view);
        }
    }
}

impl ViewBackend for RecordingBackend {
    fn create_view(&mut self, _frame: Rect) -> ViewId {
        let view = ViewId::from_raw(self.next, 0);
        self.next += 1;
        self.nodes.insert(view, Node::default());
        self.ops.push(Op::Create(view));
        view
    }

    fn destroy_view(&mut self, view: ViewId) {
        assert!(
            self.node(view).children.is_empty(),
            "destroying {view:?} with attached children"
        );
        self.unlink(view);
        self.nodes.remove(&view);
        self.ops.push(Op::Destroy(view));
    }

    fn attach(&mut self, parent: ViewId, child: ViewId, index: Option<usize>) {
        assert!(
            self.node(child).parent.is_none(),
            "{child:?} already has a parent"
        );
        let siblings = &mut self.node_mut(parent).children;
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, child);
        self.node_mut(child).parent = Some(parent);
        self.ops.push(Op::Attach {
            parent,
            child,
            index,
        });
    }

    fn detach(&mut self, view: ViewId) {
        assert!(self.node(view).parent.is_some(), "{view:?} has no parent");
        self.unlink(view);
        self.ops.push(Op::Detach(view));
    }

    fn set_frame(&mut self, view: ViewId, frame: Rect) {
        self.node(view);
        self.ops.push(Op::Frame(view, frame));
    }

    fn set_hidden(&mut self, view: ViewId, hidden: bool) {
        self.node(view);
        self.ops.push(Op::Hidden(view, hidden));
    }

    fn set_opacity(&mut self, view: ViewId, opacity: f64) {
        self.node(view);
        self.ops.push(Op::Opacity(view, opacity));
    }

    fn set_content(&mut self, view: ViewId, content: Option<SurfaceId>) {
        self.node(view);
        self.ops.push(Op::Content(view, content));
    }

    fn child_order(&self) -> ChildOrder {
        self.order
    }
}
