// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::fmt::Write as _;
use std::io::Write;

use accrete_core::reconcile::Match;
use accrete_core::trace::{
    ChildEntry, ListDiffEvent, ListPatchEvent, PassBeginEvent, PassSummary, PropertyChange,
    PropertyField, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination, consuming the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn field_name(field: PropertyField) -> &'static str {
    match field {
        PropertyField::Frame => "frame",
        PropertyField::Hidden => "hidden",
        PropertyField::Opacity => "opacity",
    }
}

/// Formats a child list as `[Kind#key@idx, ...]`.
fn entries(list: &[ChildEntry<'_>]) -> String {
    let mut out = String::from("[");
    for (i, entry) in list.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(entry.kind);
        if let Some(key) = entry.key {
            let _ = write!(out, "#{key}");
        }
        match entry.view {
            Some(view) => {
                let _ = write!(out, "@{}", view.index());
            }
            None => out.push_str("@new"),
        }
    }
    out.push(']');
    out
}

fn pairs(matched: &[Match]) -> String {
    let parts: Vec<String> = matched
        .iter()
        .map(|m| format!("{}->{}", m.existing, m.replacement))
        .collect();
    format!("[{}]", parts.join(", "))
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(self.writer, "[pass:begin] pass={}", e.pass_index);
    }

    fn on_list_diff(&mut self, e: &ListDiffEvent) {
        let _ = writeln!(
            self.writer,
            "[list] pass={} depth={} parent={:?} {}->{} matched={} added={} removed={} moved={}",
            e.pass_index,
            e.depth,
            e.parent,
            e.existing,
            e.incoming,
            e.matched,
            e.added,
            e.removed,
            e.moved,
        );
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] pass={} created={} destroyed={} attached={} detached={} \
             moved={} writes={} diffed={}",
            s.pass_index,
            s.created,
            s.destroyed,
            s.attached,
            s.detached,
            s.moved,
            s.property_writes,
            s.diffed,
        );
    }

    fn on_list_patch(&mut self, e: &ListPatchEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[patch] pass={} depth={} parent={:?} before={} after={} removed={:?} added={:?} matched={}",
            e.pass_index,
            e.depth,
            e.parent,
            entries(e.before),
            entries(e.after),
            e.removed,
            e.added,
            pairs(e.matched),
        );
    }

    fn on_property_change(&mut self, e: &PropertyChange) {
        let _ = writeln!(
            self.writer,
            "[prop] pass={} view={:?} {}",
            e.pass_index,
            e.view,
            field_name(e.field),
        );
    }
}
