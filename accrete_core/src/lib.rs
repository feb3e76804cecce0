// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation of declarative element trees onto retained platform views.
//!
//! `accrete_core` compares a freshly produced description tree against the
//! live, realized tree from the previous pass and applies the minimal set of
//! structural mutations (insertions, removals, moves) and property writes
//! needed to bring a tree of platform views back in sync. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   application state
//!       │
//!       ▼
//!   Element tree ──► LayoutEngine ──► Element::apply_layout
//!       │
//!       ▼
//!   Reconciler::pass() ──► Pass::diff_root ──► RealizedElement tree
//!                              │
//!              ┌───────────────┘
//!              ▼
//!   diff_lists() ──► ListPatch ──► ViewBackend primitives
//!                                       │
//!                 ┌─────────────────────┘
//!                 ▼
//!   ViewStore::evaluate() ──► ViewChanges ──► Presenter::apply()
//! ```
//!
//! **[`element`]**: The description side: [`Element`](element::Element)
//! values, the open [`ElementKind`](element::ElementKind) variant set, and
//! identity [`Key`](element::Key)s.
//!
//! **[`reconcile`]**: The list reconciler ([`diff_lists`](reconcile::diff_lists))
//! and the recursive tree reconciler ([`Pass`](reconcile::Pass)) that
//! realizes, diffs, and derealizes [`RealizedElement`](reconcile::RealizedElement)s.
//!
//! **[`backend`]**: The [`ViewBackend`](backend::ViewBackend) handle contract
//! the reconciler drives, and the [`Presenter`](backend::Presenter) trait for
//! pushing evaluated store changes into a native tree.
//!
//! **[`layer`]**: [`ViewStore`](layer::ViewStore), a struct-of-arrays retained
//! view tree with generational handles that implements `ViewBackend`.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`order`]**: The canonical child traversal order for platforms with a
//! flipped vertical axis.
//!
//! **[`layout`]**: The boundary to an external flexbox layout engine.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! reconciliation instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper and a process-wide verbose toggle.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-list
//!   patch contents and per-property change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod dirty;
pub mod element;
pub mod layer;
pub mod layout;
pub mod order;
pub mod reconcile;
pub mod trace;

#[cfg(test)]
mod testing;
