// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for accrete reconciliation
//! traces.
//!
//! This crate provides [`TraceSink`](accrete_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`]: writes recorded bytes as a JSON array of events.
//!
//! Per-list events only reach a sink while
//! [`set_verbose`](accrete_core::trace::set_verbose) is on.

pub mod json;
pub mod pretty;
pub mod recorder;
