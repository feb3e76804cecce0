// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! List patches ([`on_list_patch`](TraceSink::on_list_patch)) store only the
//! list lengths.

use accrete_core::layer::ViewId;
use accrete_core::trace::{
    ListDiffEvent, ListPatchEvent, PassBeginEvent, PassSummary, PropertyChange, PropertyField,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_LIST_DIFF: u8 = 2;
const TAG_PASS_SUMMARY: u8 = 3;
const TAG_LIST_PATCH_SIZES: u8 = 4;
const TAG_PROPERTY_CHANGE: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_view(&mut self, v: ViewId) {
        self.write_u32(v.index());
        self.write_u32(v.generation());
    }

    fn write_len(&mut self, len: usize) {
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn write_field(&mut self, field: PropertyField) {
        self.write_u8(match field {
            PropertyField::Frame => 0,
            PropertyField::Hidden => 1,
            PropertyField::Opacity => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass_index);
    }

    fn on_list_diff(&mut self, e: &ListDiffEvent) {
        self.write_u8(TAG_LIST_DIFF);
        self.write_u64(e.pass_index);
        self.write_u32(e.depth);
        self.write_view(e.parent);
        self.write_u32(e.existing);
        self.write_u32(e.incoming);
        self.write_u32(e.matched);
        self.write_u32(e.added);
        self.write_u32(e.removed);
        self.write_u32(e.moved);
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        self.write_u8(TAG_PASS_SUMMARY);
        self.write_u64(s.pass_index);
        self.write_u32(s.created);
        self.write_u32(s.destroyed);
        self.write_u32(s.attached);
        self.write_u32(s.detached);
        self.write_u32(s.moved);
        self.write_u32(s.property_writes);
        self.write_u32(s.diffed);
    }

    fn on_list_patch(&mut self, e: &ListPatchEvent<'_>) {
        self.write_u8(TAG_LIST_PATCH_SIZES);
        self.write_u64(e.pass_index);
        self.write_u32(e.depth);
        self.write_view(e.parent);
        self.write_len(e.before.len());
        self.write_len(e.after.len());
    }

    fn on_property_change(&mut self, e: &PropertyChange) {
        self.write_u8(TAG_PROPERTY_CHANGE);
        self.write_u64(e.pass_index);
        self.write_view(e.view);
        self.write_field(e.field);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`ListDiffEvent`].
    ListDiff(ListDiffEvent),
    /// A [`PassSummary`].
    PassSummary(PassSummary),
    /// List lengths of a [`ListPatchEvent`].
    ListPatchSizes {
        /// Pass counter.
        pass_index: u64,
        /// Depth of the parent below the pass root.
        depth: u32,
        /// The view whose children were reconciled.
        parent: ViewId,
        /// Children before the pass.
        before: u32,
        /// Children after the pass.
        after: u32,
    },
    /// A [`PropertyChange`].
    PropertyChange(PropertyChange),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_view(&mut self) -> Option<ViewId> {
        let idx = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(ViewId::from_raw(idx, generation))
    }

    fn read_field(&mut self) -> Option<PropertyField> {
        Some(match self.read_u8()? {
            0 => PropertyField::Frame,
            1 => PropertyField::Hidden,
            2 => PropertyField::Opacity,
            _ => return None,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass_index: self.read_u64()?,
        }))
    }

    fn decode_list_diff(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ListDiff(ListDiffEvent {
            pass_index: self.read_u64()?,
            depth: self.read_u32()?,
            parent: self.read_view()?,
            existing: self.read_u32()?,
            incoming: self.read_u32()?,
            matched: self.read_u32()?,
            added: self.read_u32()?,
            removed: self.read_u32()?,
            moved: self.read_u32()?,
        }))
    }

    fn decode_pass_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassSummary(PassSummary {
            pass_index: self.read_u64()?,
            created: self.read_u32()?,
            destroyed: self.read_u32()?,
            attached: self.read_u32()?,
            detached: self.read_u32()?,
            moved: self.read_u32()?,
            property_writes: self.read_u32()?,
            diffed: self.read_u32()?,
        }))
    }

    fn decode_list_patch_sizes(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ListPatchSizes {
            pass_index: self.read_u64()?,
            depth: self.read_u32()?,
            parent: self.read_view()?,
            before: self.read_u32()?,
            after: self.read_u32()?,
        })
    }

    fn decode_property_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PropertyChange(PropertyChange {
            pass_index: self.read_u64()?,
            view: self.read_view()?,
            field: self.read_field()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_LIST_DIFF => self.decode_list_diff(),
            TAG_PASS_SUMMARY => self.decode_pass_summary(),
            TAG_LIST_PATCH_SIZES => self.decode_list_patch_sizes(),
            TAG_PROPERTY_CHANGE => self.decode_property_change(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
