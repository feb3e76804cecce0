// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays view storage with allocation, topology, and property
//! management.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, SurfaceId, ViewId};
use super::traverse::Children;
use crate::backend::ViewBackend;
use crate::dirty;
use crate::order::ChildOrder;

/// Struct-of-arrays storage for all views.
///
/// Views are addressed by [`ViewId`] handles. Internally, each view occupies a
/// slot in parallel arrays. Destroyed views are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// The store implements [`ViewBackend`], so a reconciliation pass can drive it
/// directly; [`evaluate`](Self::evaluate) then reports what a
/// [`Presenter`](crate::backend::Presenter) has to push to the native tree.
#[derive(Debug)]
pub struct ViewStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (written through ViewBackend) --
    pub(crate) local_frame: Vec<Rect>,
    pub(crate) local_opacity: Vec<f64>,
    pub(crate) hidden: Vec<bool>,
    pub(crate) content: Vec<Option<SurfaceId>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_frame: Vec<Rect>,
    pub(crate) effective_opacity: Vec<f64>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    child_order: ChildOrder,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    /// Creates an empty view store that keeps children in natural order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_child_order(ChildOrder::Natural)
    }

    /// Creates an empty view store reporting the given child order.
    #[must_use]
    pub fn with_child_order(child_order: ChildOrder) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_frame: Vec::new(),
            local_opacity: Vec::new(),
            hidden: Vec::new(),
            content: Vec::new(),
            world_frame: Vec::new(),
            effective_opacity: Vec::new(),
            effective_hidden: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            child_order,
        }
    }

    // -- Allocation --

    /// Returns whether the given handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live views.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks inherited channels for `child`'s subtree so world frame,
    /// effective opacity, and effective hidden state are recomputed under the
    /// new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.link_dirty(c, p);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or `sibling`
    /// has no parent.
    pub fn insert_before(&mut self, child: ViewId, sibling: ViewId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.link_dirty(c, p);
    }

    /// Inserts `child` under `parent` at position `index`, or last if `index`
    /// is past the end.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn insert_at(&mut self, parent: ViewId, child: ViewId, index: usize) {
        self.validate(parent);
        match self.children(parent).nth(index) {
            Some(sibling) => self.insert_before(child, sibling),
            None => self.add_child(parent, child),
        }
    }

    /// Removes `child` from its current parent.
    ///
    /// Marks inherited channels for `child`'s subtree so world frame,
    /// effective opacity, and effective hidden state are recomputed after
    /// detaching from the old ancestry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the view has no parent.
    pub fn remove_from_parent(&mut self, child: ViewId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "view has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::FRAME);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a view, if any.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ViewId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a view.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the handles of root views (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<ViewId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(ViewId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local frame of a view.
    #[must_use]
    pub fn frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.local_frame[id.idx as usize]
    }

    /// Returns the local opacity of a view.
    #[must_use]
    pub fn opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.local_opacity[id.idx as usize]
    }

    /// Returns the local hidden flag of a view.
    #[must_use]
    pub fn hidden(&self, id: ViewId) -> bool {
        self.validate(id);
        self.hidden[id.idx as usize]
    }

    /// Returns the content surface of a view.
    #[must_use]
    pub fn content(&self, id: ViewId) -> Option<SurfaceId> {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns the computed world frame of a view.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.world_frame[id.idx as usize]
    }

    /// Returns the computed effective opacity of a view.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    /// Returns whether the view is effectively hidden (including by an
    /// ancestor's hidden flag).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_hidden(&self, id: ViewId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    // -- Raw-index accessors for presenters --
    //
    // These accept raw slot indices (as found in `ViewChanges`) rather than
    // `ViewId` handles, skipping generation validation. Only use with indices
    // that came from `ViewChanges` or `traversal_order()`.

    /// Returns the computed world frame at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_frame_at(&self, idx: u32) -> Rect {
        self.check_slot(idx);
        self.world_frame[idx as usize]
    }

    /// Returns the computed effective opacity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_opacity_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.effective_opacity[idx as usize]
    }

    /// Returns whether the view at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.check_slot(idx);
        self.effective_hidden[idx as usize]
    }

    /// Returns the content surface at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> Option<SurfaceId> {
        self.check_slot(idx);
        self.content[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ViewId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ViewId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    /// Adds dependency edges for a freshly linked child and marks the
    /// affected channels.
    fn link_dirty(&mut self, c: u32, p: u32) {
        // Child depends on parent for FRAME and OPACITY.
        let _ = self.dirty.add_dependency(c, p, dirty::FRAME);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    ///
    /// `FRAME` also carries effective hidden propagation.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::FRAME, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }
}

impl ViewBackend for ViewStore {
    /// Creates a new root view with the given frame, full opacity, no
    /// content, and no parent.
    fn create_view(&mut self, frame: Rect) -> ViewId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.local_frame[idx as usize] = frame;
            self.local_opacity[idx as usize] = 1.0;
            self.hidden[idx as usize] = false;
            self.content[idx as usize] = None;
            self.world_frame[idx as usize] = frame;
            self.effective_opacity[idx as usize] = 1.0;
            self.effective_hidden[idx as usize] = false;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_frame.push(frame);
            self.local_opacity.push(1.0);
            self.hidden.push(false);
            self.content.push(None);
            self.world_frame.push(frame);
            self.effective_opacity.push(1.0);
            self.effective_hidden.push(false);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::FRAME, &EagerPolicy);

        ViewId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a view, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the view has children (destroy them first) or if the handle
    /// is stale.
    fn destroy_view(&mut self, id: ViewId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy view with children"
        );

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    fn attach(&mut self, parent: ViewId, child: ViewId, index: Option<usize>) {
        match index {
            Some(index) => self.insert_at(parent, child, index),
            None => self.add_child(parent, child),
        }
    }

    fn detach(&mut self, view: ViewId) {
        self.remove_from_parent(view);
    }

    /// Marks the FRAME channel dirty with eager propagation to descendants.
    fn set_frame(&mut self, id: ViewId, frame: Rect) {
        self.validate(id);
        self.local_frame[id.idx as usize] = frame;
        self.dirty.mark_with(id.idx, dirty::FRAME, &EagerPolicy);
    }

    /// Hidden state is inherited, so this routes through the FRAME channel.
    fn set_hidden(&mut self, id: ViewId, hidden: bool) {
        self.validate(id);
        self.hidden[id.idx as usize] = hidden;
        self.dirty.mark_with(id.idx, dirty::FRAME, &EagerPolicy);
    }

    /// Marks the OPACITY channel dirty with eager propagation to descendants.
    fn set_opacity(&mut self, id: ViewId, opacity: f64) {
        self.validate(id);
        self.local_opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    fn set_content(&mut self, id: ViewId, content: Option<SurfaceId>) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    fn child_order(&self) -> ChildOrder {
        self.child_order
    }
}
