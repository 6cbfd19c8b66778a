// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays slot storage with parent links, breakpoints, and
//! per-slot recomputation.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::PropagationError;
use super::id::{INVALID, StateId};
use super::inherit::Inherit;
use crate::node::SceneNode;
use crate::transform::Transform3d;

/// Struct-of-arrays storage for one inherited value across a node tree.
///
/// Each slot shadows one scene node. `local` accumulates the composed value
/// from the nearest breakpoint ancestor down to the slot; `global` (the world
/// value) is maintained only on breakpoints.
#[derive(Debug)]
pub struct PropagationStore<V: Inherit> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) child_count: Vec<u32>,

    // -- Values --
    pub(crate) local: Vec<V>,
    pub(crate) global: Vec<V>,

    // -- Flags --
    pub(crate) needs_update: Vec<bool>,
    pub(crate) break_point: Vec<bool>,
    /// Whether `global` has been computed since the slot became a breakpoint.
    pub(crate) world_computed: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl<V: Inherit> Default for PropagationStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Inherit> PropagationStore<V> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            child_count: Vec::new(),
            local: Vec::new(),
            global: Vec::new(),
            needs_update: Vec::new(),
            break_point: Vec::new(),
            world_computed: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Creates a new slot and returns its handle.
    ///
    /// The slot starts with identity values, no parent, and no breakpoint.
    /// It is marked dirty so the next [`update`](Self::update) computes it.
    pub fn create(&mut self) -> StateId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.child_count[i] = 0;
            self.local[i] = V::IDENTITY;
            self.global[i] = V::IDENTITY;
            self.break_point[i] = false;
            self.world_computed[i] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.child_count.push(0);
            self.local.push(V::IDENTITY);
            self.global.push(V::IDENTITY);
            self.needs_update.push(false);
            self.break_point.push(false);
            self.world_computed.push(false);
            self.generation.push(0);
            idx
        };

        self.needs_update[idx as usize] = true;
        self.dirty.mark(idx, V::CHANNEL);

        StateId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a slot, freeing it for reuse.
    ///
    /// # Panics
    ///
    /// Panics if another slot still names this one as its parent, or if the
    /// handle is stale.
    pub fn destroy(&mut self, id: StateId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.child_count[idx as usize] == 0,
            "cannot destroy state with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_parent(idx);
        }
        self.dirty.remove_key(idx);
        self.needs_update[idx as usize] = false;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the handle refers to a live slot.
    #[must_use]
    pub fn is_alive(&self, id: StateId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns `true` if the store has no live slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Per-slot state --

    /// Clears the dirty flag, the parent link, and the breakpoint flag.
    ///
    /// Computed values are left as they are. Clearing a breakpoint changes
    /// how its children compose, so they and their descendants are marked
    /// dirty.
    ///
    /// A mark already queued for this slot in the dirty tracker is kept: the
    /// next [`update`](Self::update) still recomputes the slot even though
    /// [`is_dirty`](Self::is_dirty) reports `false` until then.
    pub fn reset(&mut self, id: StateId) {
        self.validate(id);
        let idx = id.idx;
        if self.parent[idx as usize] != INVALID {
            self.unlink_parent(idx);
        }
        self.needs_update[idx as usize] = false;
        if core::mem::take(&mut self.break_point[idx as usize]) {
            self.world_computed[idx as usize] = false;
            self.mark_children(idx);
        }
    }

    /// Sets (or clears) the slot this one inherits from.
    ///
    /// The slot and everything inheriting from it are marked dirty.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::Cycle`] if `parent` is `id` itself or one
    /// of its descendants. The existing link is kept in that case.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_parent(
        &mut self,
        id: StateId,
        parent: Option<StateId>,
    ) -> Result<(), PropagationError> {
        self.validate(id);
        let c = id.idx;
        let new_p = match parent {
            Some(p) => {
                self.validate(p);
                if self.is_descendant_or_self(p.idx, c) {
                    return Err(PropagationError::Cycle { id, parent: p });
                }
                p.idx
            }
            None => INVALID,
        };

        if self.parent[c as usize] == new_p {
            return Ok(());
        }
        if new_p != INVALID {
            let _ = self.dirty.add_dependency(c, new_p, V::CHANNEL);
            self.child_count[new_p as usize] += 1;
        }
        if self.parent[c as usize] != INVALID {
            self.unlink_parent(c);
        }
        self.parent[c as usize] = new_p;

        self.mark(c);
        Ok(())
    }

    /// Returns the slot this one inherits from, if any.
    #[must_use]
    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| StateId {
            idx: p,
            generation: self.generation[p as usize],
        })
    }

    /// Flags the slot for recomputation.
    ///
    /// Every slot inheriting from it is queued for the next
    /// [`update`](Self::update) as well.
    pub fn set_dirty(&mut self, id: StateId) {
        self.validate(id);
        self.mark(id.idx);
    }

    /// Returns whether the slot is flagged for recomputation.
    #[must_use]
    pub fn is_dirty(&self, id: StateId) -> bool {
        self.validate(id);
        self.needs_update[id.idx as usize]
    }

    /// Makes the slot a breakpoint: it maintains a world value, and its
    /// children restart accumulation from their own values.
    pub fn set_break_point(&mut self, id: StateId) {
        self.validate(id);
        if !self.break_point[id.idx as usize] {
            self.break_point[id.idx as usize] = true;
            self.world_computed[id.idx as usize] = false;
            self.mark(id.idx);
        }
    }

    /// Returns whether the slot is a breakpoint.
    #[must_use]
    pub fn is_break_point(&self, id: StateId) -> bool {
        self.validate(id);
        self.break_point[id.idx as usize]
    }

    /// Returns the value accumulated since the nearest breakpoint ancestor.
    #[must_use]
    pub fn local(&self, id: StateId) -> V {
        self.validate(id);
        self.local[id.idx as usize]
    }

    /// Returns the world value of a breakpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::NotBreakPoint`] if the slot does not
    /// maintain a world value.
    pub fn world(&self, id: StateId) -> Result<V, PropagationError> {
        self.validate(id);
        if self.break_point[id.idx as usize] {
            Ok(self.global[id.idx as usize])
        } else {
            Err(PropagationError::NotBreakPoint { id })
        }
    }

    // -- Recomputation --

    /// Recomputes the slot from its node's own value.
    ///
    /// A slot with no parent, or whose parent is a breakpoint, starts
    /// accumulation afresh; otherwise it composes onto the parent's local
    /// value. Returns whether the result changed.
    pub fn from(&mut self, id: StateId, node: &dyn SceneNode) -> bool {
        self.from_value(id, V::read(node))
    }

    /// Like [`from`](Self::from), with the node's own value supplied directly.
    pub fn from_value(&mut self, id: StateId, own: V) -> bool {
        self.validate(id);
        self.recompute(id.idx, own)
    }

    /// Sets `local` to the node's own value, ignoring any parent.
    ///
    /// For a breakpoint the result is whether the world value changed,
    /// otherwise whether the local value changed.
    pub fn from_node(&mut self, id: StateId, node: &dyn SceneNode) -> bool {
        self.validate(id);
        self.apply_own(id.idx, V::read(node))
    }

    /// Sets `local` to the parent's local value composed with the node's own
    /// value.
    ///
    /// # Panics
    ///
    /// Panics if the slot has no parent.
    pub fn from_node_with_parent(&mut self, id: StateId, node: &dyn SceneNode) -> bool {
        self.validate(id);
        assert!(self.parent[id.idx as usize] != INVALID, "state has no parent");
        self.apply_with_parent(id.idx, V::read(node))
    }

    /// Recomputes the world value from the nearest breakpoint ancestor.
    ///
    /// Without such an ancestor the world value is the local value. Returns
    /// whether the world value changed.
    pub fn calculate_world(&mut self, id: StateId) -> bool {
        self.validate(id);
        self.calculate_world_at(id.idx)
    }

    // -- Raw-index accessors for presenters --
    //
    // These take raw slot indices as found in `PropagationChanges` and skip
    // generation validation.

    /// Returns the local value at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn local_at(&self, idx: u32) -> V {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.local[idx as usize]
    }

    /// Returns the world value at raw slot `idx`, if it is a breakpoint.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_at(&self, idx: u32) -> Option<V> {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.break_point[idx as usize].then(|| self.global[idx as usize])
    }

    // -- Internal helpers --

    pub(crate) fn recompute(&mut self, idx: u32, own: V) -> bool {
        let p = self.parent[idx as usize];
        if p == INVALID || self.break_point[p as usize] {
            self.apply_own(idx, own)
        } else {
            self.apply_with_parent(idx, own)
        }
    }

    fn apply_own(&mut self, idx: u32, own: V) -> bool {
        self.finish(idx, own)
    }

    fn apply_with_parent(&mut self, idx: u32, own: V) -> bool {
        let parent_local = self.local[self.parent[idx as usize] as usize];
        self.finish(idx, V::compose(parent_local, own))
    }

    fn finish(&mut self, idx: u32, local: V) -> bool {
        let i = idx as usize;
        let mut changed = self.local[i] != local;
        self.local[i] = local;
        if self.break_point[i] {
            changed = self.calculate_world_at(idx);
        }
        self.needs_update[i] = false;
        changed
    }

    fn calculate_world_at(&mut self, idx: u32) -> bool {
        let mut ancestor = self.parent[idx as usize];
        while ancestor != INVALID && !self.break_point[ancestor as usize] {
            ancestor = self.parent[ancestor as usize];
        }
        let local = self.local[idx as usize];
        let global = if ancestor == INVALID {
            local
        } else {
            V::compose(self.global[ancestor as usize], local)
        };
        let i = idx as usize;
        // The first world value always counts as a change.
        let changed = !self.world_computed[i] || self.global[i] != global;
        self.global[i] = global;
        self.world_computed[i] = true;
        changed
    }

    /// Returns whether `idx` is `root` or lies beneath it.
    fn is_descendant_or_self(&self, mut idx: u32, root: u32) -> bool {
        while idx != INVALID {
            if idx == root {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    fn unlink_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.dirty.remove_dependency(idx, p, V::CHANNEL);
        self.child_count[p as usize] -= 1;
        self.parent[idx as usize] = INVALID;
    }

    /// Marks every slot whose parent is `idx`, along with its descendants.
    fn mark_children(&mut self, idx: u32) {
        if self.child_count[idx as usize] == 0 {
            return;
        }
        for child in 0..self.len {
            if self.parent[child as usize] == idx {
                self.mark(child);
            }
        }
    }

    fn mark(&mut self, idx: u32) {
        self.needs_update[idx as usize] = true;
        self.dirty.mark_with(idx, V::CHANNEL, &EagerPolicy);
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: StateId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale StateId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

impl PropagationStore<Transform3d> {
    /// Returns the transform accumulated since the nearest breakpoint ancestor.
    #[must_use]
    pub fn local_transform(&self, id: StateId) -> Transform3d {
        self.local(id)
    }

    /// Returns the world transform of a breakpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::NotBreakPoint`] unless the slot is a
    /// breakpoint.
    pub fn global_transform(&self, id: StateId) -> Result<Transform3d, PropagationError> {
        self.world(id)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::node::NodeRef;

    struct Fixed {
        opacity: f32,
        transform: Transform3d,
    }

    impl SceneNode for Fixed {
        fn children(&self) -> Vec<Option<NodeRef>> {
            Vec::new()
        }

        fn location(&self) -> String {
            String::new()
        }

        fn opacity(&self) -> f32 {
            self.opacity
        }

        fn transform(&self) -> Transform3d {
            self.transform
        }
    }

    fn opacity(v: f32) -> Fixed {
        Fixed {
            opacity: v,
            transform: Transform3d::IDENTITY,
        }
    }

    const EPS: f32 = 1e-6;

    #[test]
    fn create_and_destroy() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        assert!(store.is_alive(id));
        assert_eq!(store.len(), 1);
        store.destroy(id);
        assert!(!store.is_alive(id));
        assert!(store.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = PropagationStore::<f32>::new();
        let id1 = store.create();
        store.destroy(id1);
        let id2 = store.create();
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    fn nested_break_points_multiply() {
        let mut store = PropagationStore::<f32>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        store.set_break_point(parent);
        store.set_break_point(child);

        assert!(store.from(parent, &opacity(0.5)));
        assert!(store.from(child, &opacity(0.5)));

        let world = store.world(child).unwrap();
        assert!((world - 0.25).abs() < EPS, "expected 0.25, got {world}");
        assert!((store.world(parent).unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    fn world_requires_break_point() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        store.from(id, &opacity(0.5));
        assert_eq!(
            store.world(id),
            Err(PropagationError::NotBreakPoint { id })
        );
    }

    #[test]
    fn local_accumulates_until_break_point() {
        let mut store = PropagationStore::<f32>::new();
        let root = store.create();
        let mid = store.create();
        let leaf = store.create();
        store.set_parent(mid, Some(root)).unwrap();
        store.set_parent(leaf, Some(mid)).unwrap();
        store.set_break_point(root);
        store.set_break_point(leaf);

        store.from(root, &opacity(0.5));
        store.from(mid, &opacity(0.5));
        store.from(leaf, &opacity(0.5));

        // `mid` restarts under the root breakpoint; `leaf` composes onto it.
        assert!((store.local(mid) - 0.5).abs() < EPS);
        assert!((store.local(leaf) - 0.25).abs() < EPS);
        assert!((store.world(leaf).unwrap() - 0.125).abs() < EPS);
    }

    #[test]
    fn from_reports_real_change() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        assert!(store.from(id, &opacity(0.5)));
        assert!(!store.from(id, &opacity(0.5)));
        assert!(store.from(id, &opacity(0.75)));
    }

    #[test]
    fn root_break_point_reports_first_world() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        store.set_break_point(id);
        assert!(store.from(id, &opacity(0.5)));
        assert!(!store.from(id, &opacity(0.5)));
    }

    #[test]
    fn from_clears_dirty_flag() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        assert!(store.is_dirty(id));
        store.from(id, &opacity(1.0));
        assert!(!store.is_dirty(id));
        store.set_dirty(id);
        assert!(store.is_dirty(id));
    }

    #[test]
    fn reset_clears_links_and_flags() {
        let mut store = PropagationStore::<f32>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        store.set_break_point(child);

        store.reset(child);
        assert_eq!(store.parent(child), None);
        assert!(!store.is_break_point(child));
        assert!(!store.is_dirty(child));
        // The former parent has no children left.
        store.destroy(parent);
    }

    #[test]
    fn reset_break_point_recomposes_children() {
        let mut store = PropagationStore::<f32>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        store.set_break_point(parent);
        let _ = store.update(|_| 0.5);
        // Children of a breakpoint restart from their own value.
        assert!((store.local(child) - 0.5).abs() < 1e-6);

        store.reset(parent);
        assert!(store.is_dirty(child));
        assert!(!store.is_dirty(parent));

        let changes = store.update(|_| 0.5);
        assert!(changes.updated.contains(&child.index()));
        assert!((store.local(child) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn reset_without_break_point_leaves_children_clean() {
        let mut store = PropagationStore::<f32>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        let _ = store.update(|_| 0.5);

        store.reset(parent);
        assert!(!store.is_dirty(child));
        assert!(store.update(|_| 0.5).updated.is_empty());
    }

    #[test]
    fn first_world_of_identity_break_point_is_a_change() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        store.set_break_point(id);

        let changes = store.update(|_| 1.0);
        assert_eq!(changes.changed, [id.index()]);

        store.set_dirty(id);
        let changes = store.update(|_| 1.0);
        assert_eq!(changes.updated, [id.index()]);
        assert!(changes.changed.is_empty());
    }

    #[test]
    fn identity_transform_break_point_reports_first_world() {
        let mut store = PropagationStore::<Transform3d>::new();
        let root = store.create();
        let leaf = store.create();
        store.set_parent(leaf, Some(root)).unwrap();
        store.set_break_point(root);
        store.set_break_point(leaf);

        let changes = store.update(|_| Transform3d::IDENTITY);
        assert!(changes.changed.contains(&root.index()));
        assert!(changes.changed.contains(&leaf.index()));
    }

    #[test]
    fn recycled_slot_reports_first_world_again() {
        let mut store = PropagationStore::<f32>::new();
        let a = store.create();
        store.set_break_point(a);
        let _ = store.update(|_| 1.0);
        store.destroy(a);

        let b = store.create();
        store.set_break_point(b);
        assert!(store.from_value(b, 1.0));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut store = PropagationStore::<f32>::new();
        let a = store.create();
        let b = store.create();
        store.set_parent(b, Some(a)).unwrap();

        assert_eq!(
            store.set_parent(a, Some(b)),
            Err(PropagationError::Cycle { id: a, parent: b })
        );
        assert_eq!(
            store.set_parent(a, Some(a)),
            Err(PropagationError::Cycle { id: a, parent: a })
        );
        assert_eq!(store.parent(a), None);
    }

    #[test]
    fn set_parent_replaces_link() {
        let mut store = PropagationStore::<f32>::new();
        let p1 = store.create();
        let p2 = store.create();
        let child = store.create();
        store.set_parent(child, Some(p1)).unwrap();
        store.set_parent(child, Some(p2)).unwrap();
        assert_eq!(store.parent(child), Some(p2));
        // p1 was released and can go.
        store.destroy(p1);
    }

    #[test]
    #[should_panic(expected = "cannot destroy state with children")]
    fn destroy_with_children_panics() {
        let mut store = PropagationStore::<f32>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        store.destroy(parent);
    }

    #[test]
    #[should_panic(expected = "stale StateId")]
    fn destroyed_handle_panics_on_local() {
        let mut store = PropagationStore::<f32>::new();
        let id = store.create();
        store.destroy(id);
        let _ = store.local(id);
    }

    #[test]
    #[should_panic(expected = "stale StateId")]
    fn destroyed_handle_panics_on_set_parent() {
        let mut store = PropagationStore::<f32>::new();
        let root = store.create();
        let id = store.create();
        store.destroy(id);
        let _ = store.set_parent(id, Some(root));
    }

    #[test]
    fn transform_world_composes_parent_first() {
        let mut store = PropagationStore::<Transform3d>::new();
        let parent = store.create();
        let child = store.create();
        store.set_parent(child, Some(parent)).unwrap();
        store.set_break_point(parent);
        store.set_break_point(child);

        let scaled = Fixed {
            opacity: 1.0,
            transform: Transform3d::from_scale(2.0, 2.0, 1.0),
        };
        let moved = Fixed {
            opacity: 1.0,
            transform: Transform3d::from_translation(3.0, 4.0, 0.0),
        };
        store.from(parent, &scaled);
        store.from(child, &moved);

        let world = store.global_transform(child).unwrap();
        assert_eq!(world.translation(), [6.0, 8.0, 0.0]);
        assert_eq!(
            store.local_transform(child),
            Transform3d::from_translation(3.0, 4.0, 0.0)
        );
    }

    #[test]
    fn global_transform_requires_break_point() {
        let mut store = PropagationStore::<Transform3d>::new();
        let id = store.create();
        assert!(store.global_transform(id).is_err());
    }

    #[test]
    fn raw_accessors_match_handles() {
        let mut store = PropagationStore::<f32>::new();
        let a = store.create();
        let b = store.create();
        store.set_break_point(b);
        store.from(a, &opacity(0.5));
        store.from(b, &opacity(0.25));

        assert_eq!(store.local_at(a.index()), 0.5);
        assert_eq!(store.world_at(a.index()), None);
        assert_eq!(store.world_at(b.index()), Some(0.25));
    }
}
