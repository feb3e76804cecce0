// Copyright 2026 the Accrete Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sibling list matching.
//!
//! [`diff_lists`] pairs an existing sibling list with an incoming one and
//! reports which entries are removed, which are added, and which are diffed in
//! place. It never touches a backend; applying the patch is the job of
//! [`Pass`](super::Pass).
//!
//! # Matching policy
//!
//! Only the first occurrence of a key within one list counts as keyed. Later
//! siblings repeating that key are treated as unkeyed, on both sides.
//!
//! Matching then runs three rounds, each walking the incoming list in order
//! and taking the first compatible, still unmatched existing entry in
//! original order:
//!
//! 1. keyed incoming with the existing entry carrying the same key;
//! 2. unkeyed incoming with unkeyed existing entries;
//! 3. whatever is left, pairing entries where exactly one side is keyed.
//!
//! Two keyed entries with different keys never match. Incompatible entries
//! never match, whatever their keys.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::element::{Element, ElementKind, Key};

/// What the matcher needs to know about a list entry.
pub trait Identity {
    /// The identity key, with empty keys already filtered out.
    fn key(&self) -> Option<&Key>;

    /// The element variant.
    fn kind(&self) -> &dyn ElementKind;
}

impl Identity for Element {
    fn key(&self) -> Option<&Key> {
        Self::key(self)
    }

    fn kind(&self) -> &dyn ElementKind {
        &*self.kind
    }
}

/// An existing entry paired with the incoming entry that replaces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Match {
    /// Index into the existing list.
    pub existing: usize,
    /// Index into the incoming list.
    pub replacement: usize,
}

/// Where the entry at one incoming index comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Diffed in place against the existing entry at this index.
    Matched(usize),
    /// Realized from scratch.
    Added,
}

/// The structural difference between two sibling lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPatch {
    /// Existing indices to remove, ascending.
    pub remove: Vec<usize>,
    /// Incoming indices to add, ascending. Each index is also the insertion
    /// index in the final list.
    pub add: Vec<usize>,
    /// Matched pairs, in incoming order.
    pub update: Vec<Match>,
    /// One slot per incoming entry.
    pub slots: Vec<Slot>,
}

impl ListPatch {
    /// Returns `true` if every incoming entry was matched and nothing was
    /// removed.
    #[must_use]
    pub fn is_structurally_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Matches `incoming` against `existing`.
///
/// Both lists must be in the same canonical order (see
/// [`canonical_children`](crate::order::canonical_children)).
#[must_use]
pub fn diff_lists<E: Identity, N: Identity>(existing: &[E], incoming: &[N]) -> ListPatch {
    let old_keys = first_keys(existing);
    let new_keys = first_keys(incoming);

    let mut taken = vec![false; existing.len()];
    let mut slots: Vec<Option<usize>> = vec![None; incoming.len()];

    let compatible = |n: usize, e: usize| incoming[n].kind().can_diff(existing[e].kind());

    // Equal keys.
    let by_key: HashMap<&Key, usize> = old_keys
        .iter()
        .enumerate()
        .filter_map(|(e, key)| key.map(|key| (key, e)))
        .collect();
    for (n, key) in new_keys.iter().enumerate() {
        if let Some(key) = key
            && let Some(&e) = by_key.get(key)
            && compatible(n, e)
        {
            taken[e] = true;
            slots[n] = Some(e);
        }
    }

    // Both unkeyed.
    let unkeyed: Vec<usize> = (0..existing.len())
        .filter(|&e| old_keys[e].is_none())
        .collect();
    for n in 0..incoming.len() {
        if new_keys[n].is_some() {
            continue;
        }
        if let Some(&e) = unkeyed.iter().find(|&&e| !taken[e] && compatible(n, e)) {
            taken[e] = true;
            slots[n] = Some(e);
        }
    }

    // Exactly one side keyed.
    for n in 0..incoming.len() {
        if slots[n].is_some() {
            continue;
        }
        let keyed = new_keys[n].is_some();
        let found = (0..existing.len())
            .find(|&e| !taken[e] && old_keys[e].is_some() != keyed && compatible(n, e));
        if let Some(e) = found {
            taken[e] = true;
            slots[n] = Some(e);
        }
    }

    let mut patch = ListPatch {
        remove: (0..existing.len()).filter(|&e| !taken[e]).collect(),
        ..ListPatch::default()
    };
    for (n, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(e) => {
                patch.update.push(Match {
                    existing: e,
                    replacement: n,
                });
                patch.slots.push(Slot::Matched(e));
            }
            None => {
                patch.add.push(n);
                patch.slots.push(Slot::Added);
            }
        }
    }
    patch
}

/// Keys of `items`, keeping only the first occurrence of each.
fn first_keys<T: Identity>(items: &[T]) -> Vec<Option<&Key>> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| item.key().filter(|key| seen.insert(*key)))
        .collect()
}
