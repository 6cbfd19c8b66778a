// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering-layer contract.
//!
//! The core computes inherited values; it never draws. A rendering layer
//! implements [`Presenter`] to turn the output of
//! [`PropagationStore::update`] into draw commands, typically one
//! `matrix3d()` style transform or opacity write per changed breakpoint.
//!
//! # Crate boundaries
//!
//! `trellis_core` owns the registry, the propagation stores, and this
//! contract. Renderers depend on `trellis_core` and provide the glue to a
//! concrete target (DOM elements, WebGL meshes). Application code wires them
//! together in a frame loop.

use crate::propagate::{Inherit, PropagationChanges, PropagationStore};

/// Applies propagation results to a presentation target.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame() {
///     // Mutate: local values changed on some nodes.
///     transforms.set_dirty(state_of(node));
///
///     // Update: drain dirty slots, recompute local and world values.
///     let changes = transforms.update(|id| node_of(id).transform());
///
///     // Present: write the changed world values to the target.
///     presenter.apply(&transforms, &changes);
/// }
/// ```
pub trait Presenter<V: Inherit> {
    /// Applies `changes` to the backing target, reading current values from
    /// `store` as needed.
    ///
    /// Only breakpoints carry world values; presenters typically skip slots
    /// for which [`PropagationStore::world_at`] returns `None`.
    fn apply(&mut self, store: &PropagationStore<V>, changes: &PropagationChanges);
}
