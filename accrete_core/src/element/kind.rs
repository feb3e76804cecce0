// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element variants.
//!
//! Every [`Element`](super::Element) carries a boxed [`ElementKind`] that
//! decides two things the base element cannot:
//!
//! - whether an old and a new element may be diffed in place
//!   ([`can_diff`](ElementKind::can_diff)), and
//! - how variant-specific properties are pushed to the view
//!   ([`realize`](ElementKind::realize) and
//!   [`apply_diff`](ElementKind::apply_diff)).
//!
//! The reconciler always applies the base properties (hidden, opacity, frame)
//! before calling into the kind, so implementations only handle their own
//! fields.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::backend::ViewBackend;
use crate::layer::{SurfaceId, ViewId};

/// Stable identity of a concrete [`ElementKind`] type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(TypeId);

impl KindId {
    /// Returns the identity of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

impl fmt::Debug for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KindId({:?})", self.0)
    }
}

/// Object-safe cloning for boxed kinds.
///
/// Implemented automatically for every `ElementKind + Clone`.
pub trait CloneKind {
    /// Clones `self` into a new box.
    fn clone_kind(&self) -> Box<dyn ElementKind>;
}

impl<T: ElementKind + Clone> CloneKind for T {
    fn clone_kind(&self) -> Box<dyn ElementKind> {
        Box::new(self.clone())
    }
}

/// A concrete element variant.
pub trait ElementKind: Any + CloneKind + fmt::Debug {
    /// Short human-readable name used in traces.
    fn name(&self) -> &'static str {
        let full = core::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Identity token of the concrete type.
    fn kind_id(&self) -> KindId {
        KindId::of::<Self>()
    }

    /// Returns whether `self` (the new variant) may be diffed in place against
    /// `old`.
    ///
    /// The default accepts exactly the same concrete type.
    fn can_diff(&self, old: &dyn ElementKind) -> bool {
        self.kind_id() == old.kind_id()
    }

    /// Pushes variant-specific initial state to a freshly created view.
    fn realize(&self, view: ViewId, backend: &mut dyn ViewBackend) {
        _ = (view, backend);
    }

    /// Pushes variant-specific changes between `old` and `self` to `view`.
    ///
    /// Only called when [`can_diff`](Self::can_diff) accepted the pair, after
    /// the base properties have been diffed.
    fn apply_diff(&self, old: &dyn ElementKind, view: ViewId, backend: &mut dyn ViewBackend) {
        _ = (old, view, backend);
    }

    /// Releases anything the variant holds for `view`.
    ///
    /// Runs after every descendant has been destroyed and before `view` is
    /// detached from its parent, if it has one.
    fn derealize(&self, view: ViewId) {
        _ = view;
    }
}

impl dyn ElementKind {
    /// Returns `true` if the concrete kind is `T`.
    #[must_use]
    pub fn is<T: ElementKind>(&self) -> bool {
        self.kind_id() == KindId::of::<T>()
    }

    /// Downcasts to the concrete kind `T`.
    #[must_use]
    pub fn downcast_ref<T: ElementKind>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

impl Clone for Box<dyn ElementKind> {
    fn clone(&self) -> Self {
        (**self).clone_kind()
    }
}

/// A plain view that only groups and positions its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Container;

impl ElementKind for Container {
    fn name(&self) -> &'static str {
        "Container"
    }
}

/// A leaf view presenting an externally managed content surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    /// The surface shown by the view.
    pub surface: SurfaceId,
}

impl ElementKind for Surface {
    fn name(&self) -> &'static str {
        "Surface"
    }

    fn realize(&self, view: ViewId, backend: &mut dyn ViewBackend) {
        backend.set_content(view, Some(self.surface));
    }

    fn apply_diff(&self, old: &dyn ElementKind, view: ViewId, backend: &mut dyn ViewBackend) {
        let changed = old
            .downcast_ref::<Self>()
            .is_none_or(|old| old.surface != self.surface);
        if changed {
            backend.set_content(view, Some(self.surface));
        }
    }
}
