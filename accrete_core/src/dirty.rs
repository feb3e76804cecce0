// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! [`ViewStore`](crate::layer::ViewStore) uses multi-channel dirty tracking
//! (via [`understory_dirty`]) so a single reconciliation pass can touch many
//! views and a presenter still only sees what changed. Each channel represents
//! an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`FRAME`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency edges
//!   from child to parent. World frames, effective opacities, and effective
//!   hidden state are inherited, so marking a parent marks all descendants.
//!   (Hidden-flag changes are routed through [`FRAME`] so the same drain pass
//!   recomputes both world frames and `effective_hidden`.)
//!
//! - **Local-only**: [`CONTENT`] is marked with the default policy.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on attach, detach, create, and
//!   destroy. It triggers a traversal-order rebuild during evaluation but does
//!   not propagate.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`ViewStore::evaluate`](crate::layer::ViewStore::evaluate) call drains all
//! channels and surfaces the results as
//! [`ViewChanges`](crate::layer::ViewChanges), which presenters
//! [consume](crate::backend::Presenter::apply).

use understory_dirty::Channel;

/// Frame or hidden flag changed; requires world frame and effective hidden
/// recomputation for descendants.
pub const FRAME: Channel = Channel::new(0);

/// Opacity changed; requires effective opacity recomputation for descendants.
pub const OPACITY: Channel = Channel::new(1);

/// Content surface changed; no propagation needed.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology changed; triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
