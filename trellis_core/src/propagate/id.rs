// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Propagation slot identity.

use core::fmt;

/// Sentinel value meaning "no parent" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a slot in a [`PropagationStore`](super::PropagationStore).
///
/// The generation counter detects handles that outlive their slot: once a
/// slot is destroyed and reused, old handles fail validation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl StateId {
    /// Returns the raw slot index.
    ///
    /// This is the value reported in
    /// [`PropagationChanges`](super::PropagationChanges).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({}@gen{})", self.idx, self.generation)
    }
}
