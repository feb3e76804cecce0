// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation passes.

use alloc::vec::Vec;
use core::fmt;
use core::mem;

use kurbo::Rect;

use super::list::{Slot, diff_lists};
use super::realized::RealizedElement;
use crate::backend::ViewBackend;
use crate::element::{Element, OPAQUE, same_frame};
use crate::layer::{SurfaceId, ViewId};
use crate::order::{ChildOrder, canonical_children};
use crate::trace::{ListDiffEvent, PassBeginEvent, PassSummary, Tracer};

#[cfg(feature = "trace-rich")]
use crate::trace::{ChildEntry, ListPatchEvent, PropertyChange, PropertyField};

/// Tunables for reconciliation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconcileOptions {
    /// Opacity changes at or below this magnitude are not written.
    pub opacity_epsilon: f64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            opacity_epsilon: 1e-6,
        }
    }
}

/// Opens reconciliation passes and numbers them.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
    passes: u64,
}

impl Reconciler {
    /// Creates a reconciler with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reconciler with the given options.
    #[must_use]
    pub fn with_options(options: ReconcileOptions) -> Self {
        Self { options, passes: 0 }
    }

    /// The options every pass runs with.
    #[must_use]
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Number of passes opened so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Starts a pass against `backend`.
    ///
    /// The pass holds the backend exclusively until it is finished or
    /// dropped, so passes over the same views cannot overlap.
    pub fn pass<'a>(
        &mut self,
        backend: &'a mut dyn ViewBackend,
        mut tracer: Tracer<'a>,
    ) -> Pass<'a> {
        let pass_index = self.passes;
        self.passes += 1;
        tracer.pass_begin(&PassBeginEvent { pass_index });
        Pass {
            backend: Counting {
                inner: backend,
                summary: PassSummary {
                    pass_index,
                    ..PassSummary::default()
                },
            },
            tracer,
            options: self.options,
            pass_index,
        }
    }

    /// Runs one untraced pass bringing `old` in line with `new`.
    ///
    /// See [`Pass::diff_root`].
    pub fn render(
        &mut self,
        backend: &mut dyn ViewBackend,
        new: Element,
        old: Option<RealizedElement>,
    ) -> RealizedElement {
        let mut pass = self.pass(backend, Tracer::none());
        let root = pass.diff_root(new, old);
        pass.finish();
        root
    }
}

/// One reconciliation pass.
///
/// Every structural mutation and property write goes through the pass, which
/// counts them for the [`PassSummary`] returned by [`finish`](Self::finish).
pub struct Pass<'a> {
    backend: Counting<'a>,
    tracer: Tracer<'a>,
    options: ReconcileOptions,
    pass_index: u64,
}

impl fmt::Debug for Pass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pass")
            .field("pass_index", &self.pass_index)
            .field("options", &self.options)
            .field("summary", &self.backend.summary)
            .finish_non_exhaustive()
    }
}

impl Pass<'_> {
    /// Index of this pass.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        self.pass_index
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> &PassSummary {
        &self.backend.summary
    }

    /// Creates views for `element` and its whole subtree.
    ///
    /// Each view starts at the element's frame. Hidden and opacity are only
    /// written when they differ from a fresh view's defaults. Children are
    /// realized and attached in canonical order.
    pub fn realize(&mut self, mut element: Element) -> RealizedElement {
        let view = self.backend.create_view(element.frame);
        if element.hidden {
            self.write_hidden(view, true);
        }
        if !self.same_opacity(element.opacity, OPAQUE) {
            self.write_opacity(view, element.opacity);
        }
        element.kind.realize(view, &mut self.backend);

        let order = self.backend.child_order();
        let reversed = order.reverses(element.direction);
        let incoming =
            canonical_children(mem::take(&mut element.children), element.direction, order);
        let mut children = Vec::with_capacity(incoming.len());
        for child in incoming {
            let child = self.realize(child);
            self.backend.attach(view, child.view, None);
            children.push(child);
        }

        RealizedElement {
            element,
            view,
            children,
            reversed,
        }
    }

    /// Updates `node` in place to reflect `new`.
    ///
    /// # Panics
    ///
    /// Panics if `new` cannot be diffed against the node's element. Use
    /// [`diff_root`](Self::diff_root) when compatibility is not known.
    pub fn diff(&mut self, node: &mut RealizedElement, new: Element) {
        self.diff_at(node, new, 0);
    }

    /// Brings an optional root in line with `new`.
    ///
    /// Realizes `new` when there is no root yet, diffs in place when the root
    /// is compatible, and otherwise derealizes the old root and realizes `new`
    /// from scratch. A replaced root is not re-attached anywhere; the caller
    /// owns wherever the root view lives.
    pub fn diff_root(&mut self, new: Element, old: Option<RealizedElement>) -> RealizedElement {
        match old {
            None => self.realize(new),
            Some(mut root) if new.can_diff(&root.element) => {
                self.diff_at(&mut root, new, 0);
                root
            }
            Some(root) => {
                self.derealize(root);
                self.realize(new)
            }
        }
    }

    /// Destroys every view in `node`'s subtree, children before parents.
    pub fn derealize(&mut self, mut node: RealizedElement) {
        self.derealize_children(&mut node);
        node.element.kind.derealize(node.view);
        self.backend.destroy_view(node.view);
    }

    /// Ends the pass, reporting its totals to the tracer.
    pub fn finish(mut self) -> PassSummary {
        let summary = self.backend.summary;
        self.tracer.pass_summary(&summary);
        summary
    }

    fn diff_at(&mut self, node: &mut RealizedElement, mut new: Element, depth: u32) {
        assert!(
            new.can_diff(&node.element),
            "cannot diff {} against incompatible {}",
            new.kind.name(),
            node.element.kind.name()
        );
        self.backend.summary.diffed += 1;

        let view = node.view;
        let old = &node.element;
        if new.hidden != old.hidden {
            self.write_hidden(view, new.hidden);
        }
        if !self.same_opacity(new.opacity, old.opacity) {
            self.write_opacity(view, new.opacity);
        }
        if !same_frame(new.frame, old.frame) {
            self.write_frame(view, new.frame);
        }
        new.kind.apply_diff(&*old.kind, view, &mut self.backend);

        let order = self.backend.child_order();
        let incoming = canonical_children(mem::take(&mut new.children), new.direction, order);
        node.reversed = order.reverses(new.direction);
        node.element = new;
        self.diff_children(node, incoming, depth);
    }

    fn diff_children(&mut self, node: &mut RealizedElement, incoming: Vec<Element>, depth: u32) {
        let patch = diff_lists(&node.children, &incoming);

        #[cfg(feature = "trace-rich")]
        if self.tracer.wants_lists() {
            self.trace_patch(node, &incoming, &patch, depth);
        }

        let existing = node.children.len();
        let mut old: Vec<Option<RealizedElement>> =
            mem::take(&mut node.children).into_iter().map(Some).collect();

        for &e in &patch.remove {
            if let Some(child) = old[e].take() {
                self.remove_child(child);
            }
        }

        // Views still attached under `node`, in attach order.
        let mut live: Vec<ViewId> = old.iter().flatten().map(|child| child.view).collect();
        let mut children = Vec::with_capacity(incoming.len());
        let mut moved = 0_u32;

        for (i, (slot, element)) in patch.slots.iter().zip(incoming).enumerate() {
            match *slot {
                Slot::Added => {
                    let child = self.realize(element);
                    self.backend.attach(node.view, child.view, Some(i));
                    live.insert(i, child.view);
                    children.push(child);
                }
                Slot::Matched(e) => {
                    let Some(mut child) = old[e].take() else {
                        unreachable!("existing child {e} matched twice");
                    };
                    if let Some(at) = live[i..].iter().position(|&v| v == child.view)
                        && at != 0
                    {
                        live.remove(i + at);
                        self.backend.detach(child.view);
                        self.backend.attach(node.view, child.view, Some(i));
                        live.insert(i, child.view);
                        moved += 1;
                    }
                    self.diff_at(&mut child, element, depth + 1);
                    children.push(child);
                }
            }
        }
        node.children = children;
        self.backend.summary.moved += moved;

        if self.tracer.wants_lists() {
            self.tracer.list_diff(&ListDiffEvent {
                pass_index: self.pass_index,
                depth,
                parent: node.view,
                existing: count(existing),
                incoming: count(node.children.len()),
                matched: count(patch.update.len()),
                added: count(patch.add.len()),
                removed: count(patch.remove.len()),
                moved,
            });
        }
    }

    /// Tears down a child that left its parent's list.
    fn remove_child(&mut self, mut child: RealizedElement) {
        self.derealize_children(&mut child);
        child.element.kind.derealize(child.view);
        self.backend.detach(child.view);
        self.backend.destroy_view(child.view);
    }

    /// Destroys all descendants of `node`, deepest first.
    ///
    /// Each destroyed view is still attached; destruction unlinks it.
    fn derealize_children(&mut self, node: &mut RealizedElement) {
        for mut child in mem::take(&mut node.children) {
            self.derealize_children(&mut child);
            child.element.kind.derealize(child.view);
            self.backend.destroy_view(child.view);
        }
    }

    fn same_opacity(&self, a: f64, b: f64) -> bool {
        let delta = a - b;
        let eps = self.options.opacity_epsilon;
        !(delta > eps || -delta > eps)
    }

    fn write_hidden(&mut self, view: ViewId, hidden: bool) {
        self.backend.set_hidden(view, hidden);
        #[cfg(feature = "trace-rich")]
        self.trace_property(view, PropertyField::Hidden);
    }

    fn write_opacity(&mut self, view: ViewId, opacity: f64) {
        self.backend.set_opacity(view, opacity);
        #[cfg(feature = "trace-rich")]
        self.trace_property(view, PropertyField::Opacity);
    }

    fn write_frame(&mut self, view: ViewId, frame: Rect) {
        self.backend.set_frame(view, frame);
        #[cfg(feature = "trace-rich")]
        self.trace_property(view, PropertyField::Frame);
    }

    #[cfg(feature = "trace-rich")]
    fn trace_property(&mut self, view: ViewId, field: PropertyField) {
        self.tracer.property_change(&PropertyChange {
            pass_index: self.pass_index,
            view,
            field,
        });
    }

    #[cfg(feature = "trace-rich")]
    fn trace_patch(
        &mut self,
        node: &RealizedElement,
        incoming: &[Element],
        patch: &super::ListPatch,
        depth: u32,
    ) {
        let before: Vec<ChildEntry<'_>> = node
            .children
            .iter()
            .map(|child| ChildEntry {
                kind: child.element.kind.name(),
                key: child.key(),
                view: Some(child.view),
            })
            .collect();
        let after: Vec<ChildEntry<'_>> = incoming
            .iter()
            .zip(&patch.slots)
            .map(|(element, slot)| ChildEntry {
                kind: element.kind.name(),
                key: element.key(),
                view: match *slot {
                    Slot::Matched(e) => Some(node.children[e].view),
                    Slot::Added => None,
                },
            })
            .collect();
        self.tracer.list_patch(&ListPatchEvent {
            pass_index: self.pass_index,
            depth,
            parent: node.view,
            before: &before,
            after: &after,
            removed: &patch.remove,
            added: &patch.add,
            matched: &patch.update,
        });
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Forwards to the real backend, tallying calls into a [`PassSummary`].
struct Counting<'a> {
    inner: &'a mut dyn ViewBackend,
    summary: PassSummary,
}

impl ViewBackend for Counting<'_> {
    fn create_view(&mut self, frame: Rect) -> ViewId {
        self.summary.created += 1;
        self.inner.create_view(frame)
    }

    fn destroy_view(&mut self, view: ViewId) {
        self.summary.destroyed += 1;
        self.inner.destroy_view(view);
    }

    fn attach(&mut self, parent: ViewId, child: ViewId, index: Option<usize>) {
        self.summary.attached += 1;
        self.inner.attach(parent, child, index);
    }

    fn detach(&mut self, view: ViewId) {
        self.summary.detached += 1;
        self.inner.detach(view);
    }

    fn set_frame(&mut self, view: ViewId, frame: Rect) {
        self.summary.property_writes += 1;
        self.inner.set_frame(view, frame);
    }

    fn set_hidden(&mut self, view: ViewId, hidden: bool) {
        self.summary.property_writes += 1;
        self.inner.set_hidden(view, hidden);
    }

    fn set_opacity(&mut self, view: ViewId, opacity: f64) {
        self.summary.property_writes += 1;
        self.inner.set_opacity(view, opacity);
    }

    fn set_content(&mut self, view: ViewId, content: Option<SurfaceId>) {
        self.summary.property_writes += 1;
        self.inner.set_content(view, content);
    }

    fn child_order(&self) -> ChildOrder {
        self.inner.child_order()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::element::{Direction, ElementKind, Key};
    use crate::layer::ViewStore;
    use crate::testing::{Op, RecordingBackend};

    fn keyed(key: &str) -> Element {
        Element::new().with_key(key)
    }

    fn render(
        backend: &mut RecordingBackend,
        new: Element,
        old: Option<RealizedElement>,
    ) -> (RealizedElement, PassSummary) {
        let mut reconciler = Reconciler::new();
        let mut pass = reconciler.pass(backend, Tracer::none());
        let root = pass.diff_root(new, old);
        (root, pass.finish())
    }

    fn child_views(node: &RealizedElement) -> Vec<ViewId> {
        node.children().iter().map(RealizedElement::view).collect()
    }

    fn child_keys(element: &Element) -> Vec<String> {
        element
            .children
            .iter()
            .map(|c| c.key().map_or_else(String::new, |k| String::from(k.as_str())))
            .collect()
    }

    /// Checks that every realized level matches the attach order in the
    /// backend.
    fn assert_mirrors(backend: &RecordingBackend, node: &RealizedElement) {
        assert_eq!(
            backend.children_of(node.view()),
            child_views(node).as_slice(),
            "attach order diverged under {:?}",
            node.view()
        );
        for child in node.children() {
            assert_eq!(backend.parent_of(child.view()), Some(node.view()));
            assert_mirrors(backend, child);
        }
    }

    /// Deterministic pseudo-random source.
    struct Lcg(u64);

    impl Lcg {
        fn below(&mut self, n: usize) -> usize {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((self.0 >> 33) % n as u64) as usize
        }

        fn shuffle<T>(&mut self, items: &mut [T]) {
            for i in (1..items.len()).rev() {
                let j = self.below(i + 1);
                items.swap(i, j);
            }
        }
    }

    /// A shuffled list of distinct keyed children plus a few unkeyed ones.
    fn random_children(rng: &mut Lcg, surfaces: bool) -> Vec<Element> {
        let mut children = Vec::new();
        for k in 0..8 {
            if rng.below(2) == 0 {
                children.push(keyed(&format!("k{k}")));
            }
        }
        for _ in 0..rng.below(4) {
            children.push(Element::new());
        }
        if surfaces {
            for child in &mut children {
                if rng.below(3) == 0 {
                    let mut surface = Element::surface(SurfaceId(7));
                    surface.key = child.key.take();
                    *child = surface;
                }
            }
        }
        for child in &mut children {
            if rng.below(4) == 0 {
                child.children = vec![Element::new(), keyed("inner")];
            }
        }
        rng.shuffle(&mut children);
        children
    }

    fn sample_tree() -> Element {
        Element::new()
            .with_frame(Rect::new(0.0, 0.0, 320.0, 240.0))
            .with_direction(Direction::Column)
            .with_children([
                keyed("title").with_size(320.0, 40.0),
                Element::surface(SurfaceId(1))
                    .with_opacity(0.5)
                    .with_hidden(true),
                Element::new().with_children([keyed("x"), Element::new(), keyed("y")]),
            ])
    }

    #[test]
    fn realize_builds_attached_tree() {
        let mut backend = RecordingBackend::new();
        let tree = sample_tree();
        let (root, summary) = render(&mut backend, tree.clone(), None);

        assert_eq!(backend.live_count(), tree.subtree_len());
        assert_eq!(summary.created as usize, tree.subtree_len());
        assert_eq!(summary.attached as usize, tree.subtree_len() - 1);
        assert_eq!(summary.diffed, 0);
        assert_eq!(backend.parent_of(root.view()), None);
        assert_mirrors(&backend, &root);
        assert_eq!(child_keys(&root.to_element()), child_keys(&tree));
    }

    #[test]
    fn realize_writes_only_non_default_state() {
        let mut backend = RecordingBackend::new();
        let (root, _) = render(&mut backend, sample_tree(), None);
        let surface = root.children()[1].view();

        let writes: Vec<Op> = backend.ops.iter().copied().filter(Op::is_property).collect();
        assert_eq!(
            writes,
            vec![
                Op::Hidden(surface, true),
                Op::Opacity(surface, 0.5),
                Op::Content(surface, Some(SurfaceId(1))),
            ]
        );
    }

    #[test]
    fn derealize_leaves_no_live_views() {
        let mut backend = RecordingBackend::new();
        let (root, _) = render(&mut backend, sample_tree(), None);

        let mut reconciler = Reconciler::new();
        let mut pass = reconciler.pass(&mut backend, Tracer::none());
        pass.derealize(root);
        let summary = pass.finish();

        assert_eq!(backend.live_count(), 0);
        assert_eq!(summary.destroyed as usize, sample_tree().subtree_len());
        // Views are released children first and never detached one by one.
        assert_eq!(summary.detached, 0);
    }

    #[test]
    fn derealize_random_trees_balances_creates_and_destroys() {
        let mut rng = Lcg(7);
        for _ in 0..50 {
            let mut backend = RecordingBackend::new();
            let tree = Element::new().with_children(random_children(&mut rng, true));
            let (root, _) = render(&mut backend, tree, None);
            let mut reconciler = Reconciler::new();
            let mut pass = reconciler.pass(&mut backend, Tracer::none());
            pass.derealize(root);
            let _ = pass.finish();

            let creates = backend.ops.iter().filter(|op| matches!(op, Op::Create(_))).count();
            let destroys = backend.ops.iter().filter(|op| matches!(op, Op::Destroy(_))).count();
            assert_eq!(creates, destroys);
            assert_eq!(backend.live_count(), 0);
        }
    }

    #[test]
    fn diffing_identical_tree_does_nothing() {
        let mut backend = RecordingBackend::new();
        let tree = sample_tree();
        let (root, _) = render(&mut backend, tree.clone(), None);
        backend.take_ops();

        let (root, summary) = render(&mut backend, tree.clone(), Some(root));
        assert!(backend.ops.is_empty(), "unexpected ops: {:?}", backend.ops);
        assert!(summary.is_structurally_empty());
        assert_eq!(summary.property_writes, 0);
        assert_eq!(summary.diffed as usize, tree.subtree_len());
        assert_mirrors(&backend, &root);
    }

    #[test]
    fn keyed_reorder_with_removal_and_addition() {
        let mut backend = RecordingBackend::new();
        let old = Element::new().with_children([keyed("1"), keyed("2"), keyed("3")]);
        let (root, _) = render(&mut backend, old, None);
        let [a, b, c] = [0, 1, 2].map(|i| root.children()[i].view());
        backend.take_ops();

        let new = Element::new().with_children([keyed("3"), keyed("1"), keyed("4")]);
        let (root, summary) = render(&mut backend, new, Some(root));
        let d = root.children()[2].view();

        assert_eq!(child_views(&root), vec![c, a, d]);
        assert_eq!(backend.children_of(root.view()), &[c, a, d]);
        assert!(!backend.is_live(b));
        assert_eq!(
            backend.ops,
            vec![
                Op::Detach(b),
                Op::Destroy(b),
                Op::Detach(c),
                Op::Attach {
                    parent: root.view(),
                    child: c,
                    index: Some(0),
                },
                Op::Create(d),
                Op::Attach {
                    parent: root.view(),
                    child: d,
                    index: Some(2),
                },
            ]
        );
        assert_eq!(summary.moved, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.destroyed, 1);
    }

    #[test]
    fn removed_subtree_is_detached_once() {
        let mut backend = RecordingBackend::new();
        let old = Element::new().with_child(keyed("gone").with_child(Element::new()));
        let (root, _) = render(&mut backend, old, None);
        let gone = root.children()[0].view();
        let inner = root.children()[0].children()[0].view();
        backend.take_ops();

        let (root, _) = render(&mut backend, Element::new(), Some(root));
        assert!(root.children().is_empty());
        assert_eq!(
            backend.ops,
            vec![Op::Destroy(inner), Op::Detach(gone), Op::Destroy(gone)]
        );
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn order_follows_description_for_random_edits() {
        let mut rng = Lcg(0x5eed);
        let mut backend = RecordingBackend::new();
        let mut root = None;
        for _ in 0..200 {
            let new = Element::new().with_children(random_children(&mut rng, false));
            let expected = child_keys(&new);
            let len = new.subtree_len();

            let before: Vec<(String, ViewId)> = root
                .as_ref()
                .map(|r: &RealizedElement| {
                    r.children()
                        .iter()
                        .filter_map(|c| Some((String::from(c.key()?.as_str()), c.view())))
                        .collect()
                })
                .unwrap_or_default();

            let (next, _) = render(&mut backend, new, root.take());
            assert_eq!(child_keys(&next.to_element()), expected);
            assert_mirrors(&backend, &next);
            assert_eq!(backend.live_count(), len);

            // Keyed children that survive keep their views.
            for (key, view) in before {
                let kept = next
                    .children()
                    .iter()
                    .find(|c| c.key().is_some_and(|k| k.as_str() == key));
                if let Some(kept) = kept {
                    assert_eq!(kept.view(), view, "view for {key} was recreated");
                }
            }
            root = Some(next);
        }
    }

    #[test]
    fn mixed_kinds_stay_consistent() {
        let mut rng = Lcg(42);
        let mut backend = RecordingBackend::new();
        let mut root = None;
        for _ in 0..200 {
            let new = Element::new().with_children(random_children(&mut rng, true));
            let expected = child_keys(&new);
            let len = new.subtree_len();
            let (next, _) = render(&mut backend, new, root.take());
            assert_eq!(child_keys(&next.to_element()), expected);
            assert_mirrors(&backend, &next);
            assert_eq!(backend.live_count(), len);
            root = Some(next);
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Teardown {
        Released(ViewId),
        Detached(ViewId),
        Destroyed(ViewId),
    }

    type TeardownLog = Rc<RefCell<Vec<Teardown>>>;

    /// A kind whose release hook writes to a shared log.
    #[derive(Clone, Debug)]
    struct Tracked(TeardownLog);

    impl ElementKind for Tracked {
        fn derealize(&self, view: ViewId) {
            self.0.borrow_mut().push(Teardown::Released(view));
        }
    }

    /// Forwards to a [`RecordingBackend`], logging detach and destroy calls
    /// to the same log as [`Tracked`].
    struct Tap<'a> {
        inner: &'a mut RecordingBackend,
        log: TeardownLog,
    }

    impl ViewBackend for Tap<'_> {
        fn create_view(&mut self, frame: Rect) -> ViewId {
            self.inner.create_view(frame)
        }

        fn destroy_view(&mut self, view: ViewId) {
            self.log.borrow_mut().push(Teardown::Destroyed(view));
            self.inner.destroy_view(view);
        }

        fn attach(&mut self, parent: ViewId, child: ViewId, index: Option<usize>) {
            self.inner.attach(parent, child, index);
        }

        fn detach(&mut self, view: ViewId) {
            self.log.borrow_mut().push(Teardown::Detached(view));
            self.inner.detach(view);
        }

        fn set_frame(&mut self, view: ViewId, frame: Rect) {
            self.inner.set_frame(view, frame);
        }

        fn set_hidden(&mut self, view: ViewId, hidden: bool) {
            self.inner.set_hidden(view, hidden);
        }

        fn set_opacity(&mut self, view: ViewId, opacity: f64) {
            self.inner.set_opacity(view, opacity);
        }

        fn set_content(&mut self, view: ViewId, content: Option<SurfaceId>) {
            self.inner.set_content(view, content);
        }

        fn child_order(&self) -> ChildOrder {
            self.inner.child_order()
        }
    }

    #[test]
    fn removed_child_is_released_before_detach() {
        let log = TeardownLog::default();
        let tracked = |key: &str| {
            Element::of_kind(Tracked(log.clone()))
                .with_key(key)
                .with_child(Element::of_kind(Tracked(log.clone())))
        };
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::new();

        let mut tap = Tap {
            inner: &mut backend,
            log: log.clone(),
        };
        let mut pass = reconciler.pass(&mut tap, Tracer::none());
        let root = pass.realize(Element::new().with_children([tracked("gone"), keyed("kept")]));
        let _ = pass.finish();
        let gone = root.children()[0].view();
        let inner = root.children()[0].children()[0].view();
        let kept = root.children()[1].view();
        assert!(log.borrow().is_empty());

        let mut tap = Tap {
            inner: &mut backend,
            log: log.clone(),
        };
        let mut pass = reconciler.pass(&mut tap, Tracer::none());
        let root = pass.diff_root(Element::new().with_child(keyed("kept")), Some(root));
        let _ = pass.finish();

        assert_eq!(
            *log.borrow(),
            vec![
                Teardown::Released(inner),
                Teardown::Destroyed(inner),
                Teardown::Released(gone),
                Teardown::Detached(gone),
                Teardown::Destroyed(gone),
            ]
        );
        assert_eq!(child_views(&root), vec![kept]);
        assert!(!backend.is_live(gone));
        assert_mirrors(&backend, &root);
    }

    #[test]
    fn incompatible_root_is_replaced() {
        let mut backend = RecordingBackend::new();
        let (old, _) = render(&mut backend, sample_tree(), None);
        let old_views = old.subtree_views();

        let (root, summary) = render(&mut backend, Element::surface(SurfaceId(9)), Some(old));
        assert!(old_views.iter().all(|&v| !backend.is_live(v)));
        assert!(!old_views.contains(&root.view()));
        assert_eq!(backend.live_count(), 1);
        assert_eq!(summary.diffed, 0);
        assert_eq!(summary.created, 1);
    }

    #[test]
    #[should_panic(expected = "cannot diff Surface against incompatible Container")]
    fn diff_rejects_incompatible_pair() {
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::new();
        let mut pass = reconciler.pass(&mut backend, Tracer::none());
        let mut node = pass.realize(Element::new());
        pass.diff(&mut node, Element::surface(SurfaceId(1)));
    }

    #[test]
    fn opacity_within_epsilon_is_not_written() {
        let mut backend = RecordingBackend::new();
        let (root, _) = render(&mut backend, Element::new().with_opacity(1.0), None);
        backend.take_ops();

        let (root, _) = render(&mut backend, Element::new().with_opacity(0.999_999_999), Some(root));
        assert!(backend.ops.is_empty());

        let (root, _) = render(&mut backend, Element::new().with_opacity(0.5), Some(root));
        assert_eq!(backend.ops, vec![Op::Opacity(root.view(), 0.5)]);
    }

    #[test]
    fn custom_opacity_epsilon() {
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::with_options(ReconcileOptions {
            opacity_epsilon: 0.1,
        });
        let root = reconciler.render(&mut backend, Element::new(), None);
        backend.take_ops();
        let _ = reconciler.render(&mut backend, Element::new().with_opacity(0.95), Some(root));
        assert!(backend.ops.is_empty());
        assert_eq!(reconciler.pass_count(), 2);
    }

    #[test]
    fn hidden_flip_writes_once() {
        let mut backend = RecordingBackend::new();
        let frame = Rect::new(0.0, 0.0, 10.0, 10.0);
        let (root, _) = render(&mut backend, Element::new().with_frame(frame).with_hidden(true), None);
        backend.take_ops();

        let (root, summary) = render(&mut backend, Element::new().with_frame(frame), Some(root));
        assert_eq!(backend.ops, vec![Op::Hidden(root.view(), false)]);
        assert_eq!(summary.property_writes, 1);
        assert!(!root.element().hidden);
    }

    #[test]
    fn frame_changes_write_once_and_undefined_is_stable() {
        let mut backend = RecordingBackend::new();
        let (root, _) = render(&mut backend, Element::new(), None);
        backend.take_ops();

        // Unresolved frames compare equal to each other.
        let (root, _) = render(&mut backend, Element::new(), Some(root));
        assert!(backend.ops.is_empty());

        let frame = Rect::new(1.0, 2.0, 3.0, 4.0);
        let (root, _) = render(&mut backend, Element::new().with_frame(frame), Some(root));
        assert_eq!(backend.ops, vec![Op::Frame(root.view(), frame)]);
    }

    #[test]
    fn surface_content_diffs() {
        let mut backend = RecordingBackend::new();
        let (root, _) = render(&mut backend, Element::surface(SurfaceId(1)), None);
        backend.take_ops();

        let (root, _) = render(&mut backend, Element::surface(SurfaceId(1)), Some(root));
        assert!(backend.ops.is_empty());

        let (root, _) = render(&mut backend, Element::surface(SurfaceId(2)), Some(root));
        assert_eq!(backend.ops, vec![Op::Content(root.view(), Some(SurfaceId(2)))]);
    }

    #[test]
    fn flipped_columns_store_children_reversed() {
        let mut backend = RecordingBackend::with_child_order(ChildOrder::FlippedColumns);
        let column = |keys: &[&str]| {
            Element::new()
                .with_direction(Direction::Column)
                .with_children(keys.iter().map(|k| keyed(k)))
        };

        let (root, _) = render(&mut backend, column(&["a", "b", "c"]), None);
        assert!(root.is_reversed());
        let keys: Vec<_> = root.children().iter().map(|c| c.key().map(Key::as_str)).collect();
        assert_eq!(keys, vec![Some("c"), Some("b"), Some("a")]);
        assert_mirrors(&backend, &root);
        let a = root.children()[2].view();

        let (root, _) = render(&mut backend, column(&["b", "c", "a"]), Some(root));
        assert_eq!(child_keys(&root.to_element()), vec!["b", "c", "a"]);
        assert_eq!(root.children()[0].view(), a);
        assert_mirrors(&backend, &root);

        // Switching to a row restores natural storage order.
        let row = column(&["b", "c", "a"]).with_direction(Direction::Row);
        let (root, _) = render(&mut backend, row, Some(root));
        assert!(!root.is_reversed());
        assert_eq!(root.children()[2].view(), a);
        assert_eq!(child_keys(&root.to_element()), vec!["b", "c", "a"]);
        assert_mirrors(&backend, &root);
    }

    #[test]
    fn drives_view_store() {
        let mut store = ViewStore::new();
        let mut reconciler = Reconciler::new();
        let tree = sample_tree();
        let root = reconciler.render(&mut store, tree.clone(), None);
        assert_eq!(store.live_count(), tree.subtree_len());
        let kids: Vec<_> = store.children(root.view()).collect();
        assert_eq!(kids, child_views(&root));

        let changes = store.evaluate();
        assert_eq!(changes.added.len(), tree.subtree_len());
        assert!(store.effective_hidden(root.children()[1].view()));

        let mut pass = reconciler.pass(&mut store, Tracer::none());
        pass.derealize(root);
        let _ = pass.finish();
        assert_eq!(store.live_count(), 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn pass_reports_to_sink() {
        use crate::trace::{TraceSink, set_verbose};

        #[derive(Default)]
        struct Sink {
            begins: Vec<u64>,
            lists: Vec<ListDiffEvent>,
            summaries: Vec<PassSummary>,
        }

        impl TraceSink for Sink {
            fn on_pass_begin(&mut self, e: &PassBeginEvent) {
                self.begins.push(e.pass_index);
            }

            fn on_list_diff(&mut self, e: &ListDiffEvent) {
                self.lists.push(*e);
            }

            fn on_pass_summary(&mut self, s: &PassSummary) {
                self.summaries.push(*s);
            }
        }

        let _guard = verbose_guard();
        set_verbose(true);
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::new();
        let root = reconciler.render(&mut backend, Element::new().with_child(keyed("a")), None);

        let mut sink = Sink::default();
        let mut pass = reconciler.pass(&mut backend, Tracer::new(&mut sink));
        let root = pass.diff_root(
            Element::new().with_children([keyed("b"), keyed("a")]),
            Some(root),
        );
        let summary = pass.finish();

        assert_eq!(sink.begins, vec![1]);
        assert_eq!(sink.summaries, vec![summary]);
        assert_eq!(summary.pass_index, 1);
        let top = sink.lists.iter().find(|e| e.depth == 0);
        assert_eq!(
            top.map(|e| (e.parent, e.existing, e.incoming, e.matched, e.added, e.moved)),
            Some((root.view(), 1, 2, 1, 1, 0))
        );
        set_verbose(false);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn verbose_tracing_leaves_outcomes_unchanged() {
        use crate::trace::{TraceSink, set_verbose};

        #[derive(Default)]
        struct Tally {
            lists: usize,
            patches: usize,
            properties: usize,
        }

        impl TraceSink for Tally {
            fn on_list_diff(&mut self, _: &ListDiffEvent) {
                self.lists += 1;
            }

            fn on_list_patch(&mut self, _: &ListPatchEvent<'_>) {
                self.patches += 1;
            }

            fn on_property_change(&mut self, _: &PropertyChange) {
                self.properties += 1;
            }
        }

        fn run(verbose: bool, sink: &mut Tally) -> (Vec<Op>, Vec<PassSummary>) {
            set_verbose(verbose);
            let mut rng = Lcg(0xface);
            let mut backend = RecordingBackend::new();
            let mut reconciler = Reconciler::new();
            let mut root: Option<RealizedElement> = None;
            let mut summaries = Vec::new();
            for step in 0..100 {
                let new = Element::new()
                    .with_opacity(if step % 3 == 0 { 0.5 } else { 1.0 })
                    .with_children(random_children(&mut rng, true));
                let mut pass = reconciler.pass(&mut backend, Tracer::new(&mut *sink));
                root = Some(pass.diff_root(new, root.take()));
                summaries.push(pass.finish());
            }
            (backend.take_ops(), summaries)
        }

        let _guard = verbose_guard();
        let mut quiet_sink = Tally::default();
        let quiet = run(false, &mut quiet_sink);
        let mut loud_sink = Tally::default();
        let loud = run(true, &mut loud_sink);
        set_verbose(false);

        assert_eq!(quiet, loud);
        assert_eq!(quiet_sink.lists + quiet_sink.patches + quiet_sink.properties, 0);
        assert!(loud_sink.lists > 0);
        assert!(loud_sink.patches > 0);
        assert!(loud_sink.properties > 0);
    }

    /// Serializes tests that flip the process-wide verbose toggle.
    #[cfg(feature = "trace")]
    fn verbose_guard() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
