// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contracts for view handles and native presentation.
//!
//! The reconciler never touches platform objects itself. It drives a
//! [`ViewBackend`], which owns the actual views and exposes a small set of
//! primitives over opaque [`ViewId`] handles:
//!
//! - **Lifecycle**: [`create_view`](ViewBackend::create_view) and
//!   [`destroy_view`](ViewBackend::destroy_view). Each realized element
//!   creates exactly one view and destroys it exactly once.
//! - **Topology**: [`attach`](ViewBackend::attach) and
//!   [`detach`](ViewBackend::detach).
//! - **Properties**: frame, hidden, opacity, and content setters.
//!
//! Backends that retain an intermediate tree (such as
//! [`ViewStore`](crate::layer::ViewStore)) hand evaluated changes to a
//! [`Presenter`], which mirrors them into whatever tree the platform
//! renders from.
//!
//! # Crate boundaries
//!
//! `accrete_core` owns the data model, reconciliation, and these contracts.
//! Platform crates implement them; application code wires the pieces
//! together and decides when a reconciliation pass runs.

use kurbo::Rect;

use crate::layer::{SurfaceId, ViewChanges, ViewId, ViewStore};
use crate::order::ChildOrder;

/// Primitive operations over a tree of platform views.
///
/// All calls happen on the thread that owns the views, inside a single
/// reconciliation [`Pass`](crate::reconcile::Pass).
pub trait ViewBackend {
    /// Creates a detached view whose initial geometry is `frame`.
    ///
    /// The view starts visible, fully opaque, and without content.
    fn create_view(&mut self, frame: Rect) -> ViewId;

    /// Releases a view.
    ///
    /// Destroying a view implicitly unlinks it from its parent. The view must
    /// not have attached children.
    fn destroy_view(&mut self, view: ViewId);

    /// Attaches `child` under `parent` at `index`, or last if `index` is
    /// `None` or past the end.
    ///
    /// `child` must not already have a parent.
    fn attach(&mut self, parent: ViewId, child: ViewId, index: Option<usize>);

    /// Detaches `view` from its parent.
    fn detach(&mut self, view: ViewId);

    /// Sets the view's frame, relative to its parent.
    fn set_frame(&mut self, view: ViewId, frame: Rect);

    /// Sets whether the view is hidden.
    fn set_hidden(&mut self, view: ViewId, hidden: bool);

    /// Sets the view's opacity.
    fn set_opacity(&mut self, view: ViewId, opacity: f64);

    /// Sets the content surface presented by the view.
    ///
    /// Backends without content support ignore this.
    fn set_content(&mut self, view: ViewId, content: Option<SurfaceId>) {
        _ = (view, content);
    }

    /// The order in which this platform stores children.
    fn child_order(&self) -> ChildOrder {
        ChildOrder::Natural
    }
}

/// Applies evaluated view changes to a platform-native presentation tree.
///
/// A presenter only ever sees the store through evaluated changes, so an
/// update loop can drive any presenter the same way. The `reconcile_trace`
/// demo's presenter logs each change instead of touching a native tree.
///
/// # Update loop pseudocode
///
/// ```rust,ignore
/// fn on_state_change(state: &AppState) {
///     // Describe: build a fresh element tree from application state.
///     let mut element = view(state);
///     element.apply_layout(&engine.layout(&element.layout_node()));
///
///     // Reconcile: bring the retained view tree in sync.
///     root = reconciler.render(&mut store, element, root.take());
///
///     // Present: apply incremental changes to the native tree.
///     let changes = store.evaluate();
///     presenter.apply(&store, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`ViewChanges`] to the backing presentation tree,
    /// reading current property values from `store` as needed.
    fn apply(&mut self, store: &ViewStore, changes: &ViewChanges);
}
