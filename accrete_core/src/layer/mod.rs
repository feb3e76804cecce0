// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained view tree.
//!
//! A *view* is a node in the retained tree that realized elements own. Each
//! view has:
//!
//! - An identity ([`ViewId`]), a generational handle that becomes stale when
//!   the view is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** written by the reconciler through
//!   [`ViewBackend`](crate::backend::ViewBackend): frame, opacity, hidden, and
//!   content.
//! - **Computed properties** produced by [`evaluate`](ViewStore::evaluate):
//!   `world_frame` (the frame offset by every ancestor's origin),
//!   `effective_opacity` (product of ancestor opacities), and
//!   `effective_hidden`.
//!
//! Views are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **FRAME** / **OPACITY**: propagate to all descendants.
//! - **CONTENT**: local-only.
//! - **TOPOLOGY**: structural changes that trigger a traversal-order rebuild.

mod evaluate;
mod id;
mod store;
mod traverse;

pub use evaluate::ViewChanges;
pub use id::{INVALID, SurfaceId, ViewId};
pub use store::ViewStore;
pub use traverse::Children;
