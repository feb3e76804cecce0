// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded passes.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes a JSON array
//! with one object per event. Every object carries an `"event"` name and a
//! `"pass"` index; views are written as `[index, generation]` pairs.

use std::io::{self, Write};

use accrete_core::layer::ViewId;
use accrete_core::trace::PropertyField;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|recorded| to_value(&recorded)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_value(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::PassBegin(e) => json!({
            "event": "PassBegin",
            "pass": e.pass_index,
        }),
        RecordedEvent::ListDiff(e) => json!({
            "event": "ListDiff",
            "pass": e.pass_index,
            "depth": e.depth,
            "parent": view(e.parent),
            "existing": e.existing,
            "incoming": e.incoming,
            "matched": e.matched,
            "added": e.added,
            "removed": e.removed,
            "moved": e.moved,
        }),
        RecordedEvent::PassSummary(s) => json!({
            "event": "PassSummary",
            "pass": s.pass_index,
            "created": s.created,
            "destroyed": s.destroyed,
            "attached": s.attached,
            "detached": s.detached,
            "moved": s.moved,
            "property_writes": s.property_writes,
            "diffed": s.diffed,
        }),
        RecordedEvent::ListPatchSizes {
            pass_index,
            depth,
            parent,
            before,
            after,
        } => json!({
            "event": "ListPatch",
            "pass": pass_index,
            "depth": depth,
            "parent": view(*parent),
            "before": before,
            "after": after,
        }),
        RecordedEvent::PropertyChange(e) => {
            let field = match e.field {
                PropertyField::Frame => "frame",
                PropertyField::Hidden => "hidden",
                PropertyField::Opacity => "opacity",
            };
            json!({
                "event": "PropertyChange",
                "pass": e.pass_index,
                "view": view(e.view),
                "field": field,
            })
        }
    }
}

fn view(id: ViewId) -> Value {
    json!([id.index(), id.generation()])
}
