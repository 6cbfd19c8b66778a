// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Each [`PropagationStore`](crate::propagate::PropagationStore) keeps an
//! [`understory_dirty`] graph with one edge per parent link, on the channel
//! named by its value type's [`Inherit::CHANNEL`](crate::propagate::Inherit::CHANNEL).
//! Marks use [`EagerPolicy`](understory_dirty::EagerPolicy), so dirtying a
//! slot dirties every slot that inherits from it, and
//! [`update`](crate::propagate::PropagationStore::update) drains the channel
//! parent-first.

use understory_dirty::Channel;

/// Transform changed; descendants must recompose.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed; descendants must recompose.
pub const OPACITY: Channel = Channel::new(1);
