// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Description-tree reconciliation.
//!
//! A pass compares a fresh [`Element`](crate::element::Element) tree against
//! the [`RealizedElement`] tree left by the previous pass and drives a
//! [`ViewBackend`](crate::backend::ViewBackend) until the views match the new
//! description:
//!
//! - [`Pass::realize`] creates views for a whole subtree.
//! - [`Pass::diff`] updates a realized node in place: one write per changed
//!   base property, then the variant's own diff, then its children.
//! - Children are paired by [`diff_lists`]; removed children are torn down,
//!   added children are realized and inserted at their final index, and
//!   matched children are moved into place before being diffed in turn.
//! - [`Pass::diff_root`] handles the root, replacing it wholesale when the new
//!   root is incompatible.
//! - [`Pass::derealize`] destroys a subtree, children first.
//!
//! ```
//! use accrete_core::element::Element;
//! use accrete_core::layer::ViewStore;
//! use accrete_core::reconcile::Reconciler;
//!
//! let mut store = ViewStore::new();
//! let mut reconciler = Reconciler::new();
//!
//! let first = Element::new().with_children([
//!     Element::new().with_key("a"),
//!     Element::new().with_key("b"),
//! ]);
//! let root = reconciler.render(&mut store, first, None);
//! let a = root.children()[0].view();
//!
//! let second = Element::new().with_children([
//!     Element::new().with_key("b"),
//!     Element::new().with_key("a"),
//! ]);
//! let root = reconciler.render(&mut store, second, Some(root));
//! assert_eq!(root.children()[1].view(), a);
//! assert_eq!(store.children(root.view()).collect::<Vec<_>>()[1], a);
//! ```

mod list;
mod pass;
mod realized;

pub use list::{Identity, ListPatch, Match, Slot, diff_lists};
pub use pass::{Pass, ReconcileOptions, Reconciler};
pub use realized::RealizedElement;
