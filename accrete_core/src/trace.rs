// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for reconciliation passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that a
//! [`Pass`](crate::reconcile::Pass) calls as it runs. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Pass-level events ([`PassBeginEvent`], [`PassSummary`]) are always
//! dispatched. Per-list events ([`ListDiffEvent`], and with `trace-rich` the
//! [`ListPatchEvent`] and [`PropertyChange`] events) are only dispatched
//! while the process-wide [verbose](set_verbose) toggle is on. The toggle
//! never changes what a pass does, only what it reports.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ListPatchEvent`] and
//!   [`PropertyChange`] events plus the corresponding `TraceSink` methods.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::layer::ViewId;

#[cfg(feature = "trace-rich")]
use crate::element::Key;
#[cfg(feature = "trace-rich")]
use crate::reconcile::Match;

// ---------------------------------------------------------------------------
// Verbose toggle
// ---------------------------------------------------------------------------

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Turns per-list diagnostics on or off for every pass in the process.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Returns whether per-list diagnostics are on.
#[must_use]
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which base property of a view was written.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyField {
    /// Frame.
    Frame,
    /// Hidden flag.
    Hidden,
    /// Opacity.
    Opacity,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
}

/// Emitted after one sibling list has been reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListDiffEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Depth of the parent below the pass root.
    pub depth: u32,
    /// The view whose children were reconciled.
    pub parent: ViewId,
    /// Children before the pass.
    pub existing: u32,
    /// Children after the pass.
    pub incoming: u32,
    /// Children diffed in place.
    pub matched: u32,
    /// Children realized and inserted.
    pub added: u32,
    /// Children derealized and removed.
    pub removed: u32,
    /// Matched children that had to be moved to a new index.
    pub moved: u32,
}

/// Per-pass totals, emitted when a pass finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Pass counter.
    pub pass_index: u64,
    /// Views created.
    pub created: u32,
    /// Views destroyed.
    pub destroyed: u32,
    /// Attach calls.
    pub attached: u32,
    /// Detach calls.
    pub detached: u32,
    /// Matched children moved to a new index.
    pub moved: u32,
    /// Property writes (frame, hidden, opacity, content).
    pub property_writes: u32,
    /// Elements diffed in place.
    pub diffed: u32,
}

impl PassSummary {
    /// Returns `true` if the pass created, destroyed, attached, or detached
    /// nothing.
    #[must_use]
    pub const fn is_structurally_empty(&self) -> bool {
        self.created == 0 && self.destroyed == 0 && self.attached == 0 && self.detached == 0
    }
}

/// One entry of a before/after child list.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ChildEntry<'a> {
    /// Variant name.
    pub kind: &'static str,
    /// Identity key, if any.
    pub key: Option<&'a Key>,
    /// View handle, if the child is realized.
    pub view: Option<ViewId>,
}

/// Full contents of one sibling-list reconciliation.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ListPatchEvent<'a> {
    /// Pass counter.
    pub pass_index: u64,
    /// Depth of the parent below the pass root.
    pub depth: u32,
    /// The view whose children were reconciled.
    pub parent: ViewId,
    /// Realized children before the pass.
    pub before: &'a [ChildEntry<'a>],
    /// Incoming children, in storage order.
    pub after: &'a [ChildEntry<'a>],
    /// Indices into `before` that were removed.
    pub removed: &'a [usize],
    /// Indices into `after` that were added.
    pub added: &'a [usize],
    /// Matched pairs.
    pub matched: &'a [Match],
}

/// A single base-property write.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyChange {
    /// Pass counter.
    pub pass_index: u64,
    /// The view written to.
    pub view: ViewId,
    /// Which property.
    pub field: PropertyField,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from reconciliation passes.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called after each sibling list is reconciled (verbose only).
    fn on_list_diff(&mut self, e: &ListDiffEvent) {
        _ = e;
    }

    /// Called with the pass totals when a pass finishes.
    fn on_pass_summary(&mut self, s: &PassSummary) {
        _ = s;
    }

    /// Called with full list contents (requires `trace-rich`, verbose only).
    #[cfg(feature = "trace-rich")]
    fn on_list_patch(&mut self, e: &ListPatchEvent<'_>) {
        _ = e;
    }

    /// Called for each base-property write (requires `trace-rich`, verbose
    /// only).
    #[cfg(feature = "trace-rich")]
    fn on_property_change(&mut self, e: &PropertyChange) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether per-list events would reach a sink.
    ///
    /// Callers use this to skip building event payloads nobody will see.
    #[inline]
    #[must_use]
    pub fn wants_lists(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some() && is_verbose()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ListDiffEvent`] if verbose tracing is on.
    #[inline]
    pub fn list_diff(&mut self, e: &ListDiffEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink
            && is_verbose()
        {
            s.on_list_diff(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassSummary`].
    #[inline]
    pub fn pass_summary(&mut self, s: &PassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`ListPatchEvent`] if verbose tracing is on (requires
    /// `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn list_patch(&mut self, e: &ListPatchEvent<'_>) {
        if let Some(s) = &mut self.sink
            && is_verbose()
        {
            s.on_list_patch(e);
        }
    }

    /// Emits a [`PropertyChange`] if verbose tracing is on (requires
    /// `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn property_change(&mut self, e: &PropertyChange) {
        if let Some(s) = &mut self.sink
            && is_verbose()
        {
            s.on_property_change(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
