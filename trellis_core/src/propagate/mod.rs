// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inherited-value propagation.
//!
//! A [`PropagationStore`] shadows the scene tree with one slot per node. Each
//! slot holds:
//!
//! - An identity ([`StateId`]): a generational handle that becomes stale when
//!   the slot is destroyed.
//! - A parent link, set with [`set_parent`](PropagationStore::set_parent).
//! - A **local** value: the node's own value composed with its ancestors'
//!   up to (not including) the nearest *breakpoint*.
//! - On breakpoints only, a **world** value: the nearest breakpoint
//!   ancestor's world value composed with the local value.
//!
//! Breakpoints bound the work: only nodes that are actually drawn need a
//! world value, and intermediate grouping nodes carry just the running local
//! product.
//!
//! The store is generic over the inherited value ([`Inherit`]). Two
//! instantiations are provided: [`OpacityStore`] (scalar multiplication) and
//! [`TransformStore`] (4×4 matrix multiplication).
//!
//! Slots are recomputed either one at a time with
//! [`from`](PropagationStore::from), or in bulk with
//! [`update`](PropagationStore::update), which drains the dirty graph
//! parent-first.

mod id;
mod inherit;
mod store;
mod update;

use core::fmt;

pub use id::{INVALID, StateId};
pub use inherit::Inherit;
pub use store::PropagationStore;
pub use update::PropagationChanges;

use crate::transform::Transform3d;

/// Opacity propagation: values multiply down the tree.
pub type OpacityStore = PropagationStore<f32>;

/// Transform propagation: matrices multiply down the tree, parent first.
pub type TransformStore = PropagationStore<Transform3d>;

/// Errors returned by [`PropagationStore`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationError {
    /// A world value was requested from a slot that is not a breakpoint.
    NotBreakPoint {
        /// The slot queried.
        id: StateId,
    },
    /// Linking `id` under `parent` would make a slot its own ancestor.
    Cycle {
        /// The slot being re-parented.
        id: StateId,
        /// The rejected parent.
        parent: StateId,
    },
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBreakPoint { id } => {
                write!(f, "{id:?} is not a breakpoint and has no world value")
            }
            Self::Cycle { id, parent } => {
                write!(f, "linking {id:?} under {parent:?} would create a cycle")
            }
        }
    }
}

impl core::error::Error for PropagationError {}
