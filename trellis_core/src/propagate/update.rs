// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental recomputation of dirty slots.
//!
//! [`PropagationStore::update`] drains the store's dirty channel in
//! topological order, so a parent is always recomputed before the slots that
//! inherit from it, and each drained slot is recomputed exactly once.
//!
//! [`PropagationChanges`] reports raw slot indices (`u32`) rather than
//! [`StateId`] handles so presenters can read values through the `*_at()`
//! accessors without a generation check per access.

use alloc::vec::Vec;

use super::id::StateId;
use super::inherit::Inherit;
use super::store::PropagationStore;

/// The result of a single [`PropagationStore::update`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationChanges {
    /// Every slot that was recomputed, parent-first.
    pub updated: Vec<u32>,
    /// The subset of `updated` whose value actually changed.
    pub changed: Vec<u32>,
}

impl PropagationChanges {
    /// Clears both lists.
    pub fn clear(&mut self) {
        self.updated.clear();
        self.changed.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl<V: Inherit> PropagationStore<V> {
    /// Recomputes every dirty slot and returns what changed.
    ///
    /// `read` supplies the owning node's own value for a slot; it is called
    /// once per drained slot.
    pub fn update(&mut self, read: impl FnMut(StateId) -> V) -> PropagationChanges {
        let mut changes = PropagationChanges::default();
        self.update_into(read, &mut changes);
        changes
    }

    /// Like [`update`](Self::update), but reuses a caller-provided buffer.
    pub fn update_into(
        &mut self,
        mut read: impl FnMut(StateId) -> V,
        changes: &mut PropagationChanges,
    ) {
        changes.clear();

        changes.updated.extend(
            self.dirty
                .drain(V::CHANNEL)
                .affected()
                .deterministic()
                .run(),
        );
        let free = &self.free_list;
        changes.updated.retain(|idx| !free.contains(idx));
        for &idx in &changes.updated {
            let id = StateId {
                idx,
                generation: self.generation[idx as usize],
            };
            let own = read(id);
            if self.recompute(idx, own) {
                changes.changed.push(idx);
            }
        }
    }
}
