// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated update loop that exercises reconciliation and its diagnostics.
//!
//! Runs a handful of edits to a small list UI through the reconciler against a
//! [`ViewStore`], recording events to both a
//! [`PrettyPrintSink`](accrete_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](accrete_debug::recorder::RecorderSink), presents each
//! pass through a logging presenter, then exports the recording as JSON.

use std::fs::File;
use std::io::BufWriter;

use accrete_core::backend::Presenter;
use accrete_core::element::{Direction, Element};
use accrete_core::layer::{SurfaceId, ViewChanges, ViewStore};
use accrete_core::layout::{Layout, LayoutEngine, LayoutNode};
use accrete_core::reconcile::{RealizedElement, Reconciler};
use accrete_core::trace::{
    ListDiffEvent, ListPatchEvent, PassBeginEvent, PassSummary, PropertyChange, TraceSink, Tracer,
    set_verbose,
};
use accrete_debug::pretty::PrettyPrintSink;
use accrete_debug::recorder::RecorderSink;
use kurbo::{Point, Rect};

const ROW_HEIGHT: f64 = 24.0;
const WIDTH: f64 = 240.0;

/// One step of application state: the visible items, in order.
struct State {
    items: &'static [&'static str],
    selected: Option<&'static str>,
    show_footer: bool,
}

const STEPS: &[State] = &[
    State {
        items: &["milk", "eggs", "bread"],
        selected: None,
        show_footer: true,
    },
    State {
        items: &["milk", "eggs", "bread", "coffee"],
        selected: Some("eggs"),
        show_footer: true,
    },
    State {
        items: &["coffee", "milk", "bread"],
        selected: Some("eggs"),
        show_footer: true,
    },
    State {
        items: &["coffee", "milk", "bread"],
        selected: Some("bread"),
        show_footer: false,
    },
    State {
        items: &["coffee", "milk", "bread"],
        selected: Some("bread"),
        show_footer: false,
    },
];

/// A stable surface per item name.
fn icon(item: &str) -> SurfaceId {
    SurfaceId(item.bytes().map(u32::from).sum())
}

/// Describes the UI for one state.
fn view(state: &State) -> Element {
    let rows = state.items.iter().map(|&item| {
        let opacity = if state.selected == Some(item) { 1.0 } else { 0.6 };
        Element::new()
            .with_key(item)
            .with_size(WIDTH, ROW_HEIGHT)
            .with_opacity(opacity)
            .with_child(Element::surface(icon(item)).with_size(16.0, 16.0))
    });
    Element::new()
        .with_key("root")
        .with_size(WIDTH, 200.0)
        .with_direction(Direction::Column)
        .with_children(rows)
        .with_child(
            Element::new()
                .with_key("footer")
                .with_size(WIDTH, ROW_HEIGHT)
                .with_hidden(!state.show_footer),
        )
}

/// Stacks children along the main axis at their requested sizes.
struct StackLayout;

impl StackLayout {
    fn place(node: &LayoutNode, origin: Point) -> Layout {
        let mut cursor = 0.0;
        let children = node
            .children
            .iter()
            .map(|child| {
                let at = match node.direction {
                    Direction::Row => Point::new(cursor, 0.0),
                    Direction::Column => Point::new(0.0, cursor),
                };
                cursor += match node.direction {
                    Direction::Row => child.size.width,
                    Direction::Column => child.size.height,
                };
                Self::place(child, at)
            })
            .collect();
        Layout {
            frame: Rect::from_origin_size(origin, node.size),
            children,
        }
    }
}

impl LayoutEngine for StackLayout {
    fn layout(&mut self, node: &LayoutNode) -> Layout {
        Self::place(node, Point::ZERO)
    }
}

/// Prints what a native presenter would have to touch.
struct LogPresenter;

impl Presenter for LogPresenter {
    fn apply(&mut self, store: &ViewStore, changes: &ViewChanges) {
        println!(
            "  present: +{} -{} frames={} opacities={} content={} hidden={} unhidden={}",
            changes.added.len(),
            changes.removed.len(),
            changes.frames.len(),
            changes.opacities.len(),
            changes.content.len(),
            changes.hidden.len(),
            changes.unhidden.len(),
        );
        for &idx in &changes.content {
            println!("    content[{idx}] = {:?}", store.content_at(idx));
        }
    }
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_list_diff(&mut self, e: &ListDiffEvent) {
        self.pretty.on_list_diff(e);
        self.recorder.on_list_diff(e);
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        self.pretty.on_pass_summary(s);
        self.recorder.on_pass_summary(s);
    }

    fn on_list_patch(&mut self, e: &ListPatchEvent<'_>) {
        self.pretty.on_list_patch(e);
        self.recorder.on_list_patch(e);
    }

    fn on_property_change(&mut self, e: &PropertyChange) {
        self.pretty.on_property_change(e);
        self.recorder.on_property_change(e);
    }
}

fn main() {
    set_verbose(true);

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- retained tree -----------------------------------------------------
    let mut store = ViewStore::new();
    let mut reconciler = Reconciler::new();
    let mut presenter = LogPresenter;
    let mut root: Option<RealizedElement> = None;

    for (step, state) in STEPS.iter().enumerate() {
        println!("step {step}");
        let element = view(state).laid_out(&mut StackLayout);

        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut pass = reconciler.pass(&mut store, Tracer::new(&mut tee));
        let next = pass.diff_root(element, root.take());
        let summary = pass.finish();
        if summary.is_structurally_empty() && summary.property_writes == 0 {
            println!("  (no changes)");
        }
        root = Some(next);

        let changes = store.evaluate();
        presenter.apply(&store, &changes);
    }

    // -- teardown ----------------------------------------------------------
    if let Some(root) = root.take() {
        let mut pass = reconciler.pass(&mut store, Tracer::new(&mut recorder));
        pass.derealize(root);
        let _ = pass.finish();
    }
    let changes = store.evaluate();
    presenter.apply(&store, &changes);
    assert_eq!(store.live_count(), 0, "teardown left views behind");

    // -- export JSON ---------------------------------------------------------
    let path = "reconcile_trace.json";
    let file = File::create(path).expect("failed to create reconcile_trace.json");
    let mut writer = BufWriter::new(file);
    accrete_debug::json::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write JSON trace");

    println!("Wrote {path} ({} passes)", reconciler.pass_count());
}
