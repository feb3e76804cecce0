// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View tree evaluation and change tracking.
//!
//! Evaluation drains each dirty channel in turn:
//!
//! 1. **FRAME**: recompute each view's `world_frame` as its local frame
//!    offset by the parent's world origin, and `effective_hidden` as
//!    `parent_effective_hidden || hidden`.
//! 2. **OPACITY**: recompute `effective_opacity` as
//!    `parent_effective * local_opacity`.
//! 3. **CONTENT**: collect only; presenters read the surface from the store.
//! 4. **TOPOLOGY**: drain and discard. The traversal order was already
//!    rebuilt at the start of evaluation if needed.
//!
//! [`ViewChanges`] uses raw slot indices (`u32`) rather than [`ViewId`]
//! handles so that presenters can index directly into the store's arrays via
//! the `*_at()` accessors (e.g.
//! [`world_frame_at`](super::ViewStore::world_frame_at)) without paying for
//! generation checks on every access.
//!
//! [`ViewId`]: super::ViewId

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use super::id::INVALID;
use super::store::ViewStore;
use crate::dirty;

/// The set of changes produced by a single [`ViewStore::evaluate`] call.
///
/// Each field contains the raw slot indices of views that changed in the
/// corresponding category.
#[derive(Clone, Debug, Default)]
pub struct ViewChanges {
    /// Views whose world frame was recomputed.
    pub frames: Vec<u32>,
    /// Views whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Views whose content surface changed.
    pub content: Vec<u32>,
    /// Views that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Views that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Views created since the last evaluate.
    pub added: Vec<u32>,
    /// Views destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl ViewChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.opacities.clear();
        self.content.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
            && self.opacities.is_empty()
            && self.content.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl ViewStore {
    /// Evaluates the view tree, recomputing dirty properties and returning
    /// the set of changes.
    pub fn evaluate(&mut self) -> ViewChanges {
        let mut changes = ViewChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut ViewChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_frames: Vec<u32> = self
            .dirty
            .drain(dirty::FRAME)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_frames {
            let parent_idx = self.parent[idx as usize];
            let (offset, parent_hidden) = if parent_idx != INVALID {
                (
                    self.world_frame[parent_idx as usize].origin().to_vec2(),
                    self.effective_hidden[parent_idx as usize],
                )
            } else {
                (Vec2::ZERO, false)
            };
            let local: Rect = self.local_frame[idx as usize];
            self.world_frame[idx as usize] = local + offset;

            let new_hidden = parent_hidden || self.hidden[idx as usize];
            if new_hidden != self.effective_hidden[idx as usize] {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[idx as usize] = new_hidden;
            }
        }
        changes.frames = dirty_frames;

        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let parent_idx = self.parent[idx as usize];
            let parent_opacity = if parent_idx != INVALID {
                self.effective_opacity[parent_idx as usize]
            } else {
                1.0
            };
            self.effective_opacity[idx as usize] =
                parent_opacity * self.local_opacity[idx as usize];
        }
        changes.opacities = dirty_opacities;

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}
