// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values that compose down the tree.

use core::fmt::Debug;

use understory_dirty::Channel;

use crate::dirty;
use crate::node::SceneNode;
use crate::transform::Transform3d;

/// A value inherited from parent to child by composition.
///
/// Each implementor owns one dirty channel, so stores for different values
/// can share index spaces without their invalidations colliding in traces.
pub trait Inherit: Copy + PartialEq + Debug {
    /// The value of a slot that has not been computed yet, and the neutral
    /// element of [`compose`](Self::compose).
    const IDENTITY: Self;

    /// The dirty channel this value is tracked on.
    const CHANNEL: Channel;

    /// Combines an accumulated `parent` value with a node's own `local` value.
    fn compose(parent: Self, local: Self) -> Self;

    /// Reads the node's own value.
    fn read(node: &dyn SceneNode) -> Self;
}

impl Inherit for f32 {
    const IDENTITY: Self = 1.0;
    const CHANNEL: Channel = dirty::OPACITY;

    #[inline]
    fn compose(parent: Self, local: Self) -> Self {
        parent * local
    }

    #[inline]
    fn read(node: &dyn SceneNode) -> Self {
        node.opacity()
    }
}

impl Inherit for Transform3d {
    const IDENTITY: Self = Self::IDENTITY;
    const CHANNEL: Channel = dirty::TRANSFORM;

    #[inline]
    fn compose(parent: Self, local: Self) -> Self {
        parent * local
    }

    #[inline]
    fn read(node: &dyn SceneNode) -> Self {
        node.transform()
    }
}
