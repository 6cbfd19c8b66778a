// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability contract every scene node exposes to the core.
//!
//! The core never owns nodes. It holds [`NodeRef`] handles keyed by path and
//! calls back into them while walking the tree. Every lifecycle hook has a
//! no-op default, so a node only overrides the hooks it reacts to.
//!
//! Hooks take `&self`: nodes that record state on callbacks use interior
//! mutability (`Cell`, `RefCell`), which matches the single-threaded model of
//! the registry.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::event::Event;
use crate::transform::Transform3d;

/// A shared handle to a scene node.
///
/// Two handles refer to the same node when [`same_node`] returns `true`.
pub type NodeRef = Rc<dyn SceneNode>;

/// Returns `true` if both handles point at the same node.
#[inline]
#[must_use]
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// A node in the scene graph, as seen by the registry and propagation stores.
pub trait SceneNode {
    /// Returns the node's children in order.
    ///
    /// `None` entries are placeholders: they keep their index (so later
    /// siblings keep their paths) but are never visited.
    fn children(&self) -> Vec<Option<NodeRef>>;

    /// Returns the path this node is registered at.
    fn location(&self) -> String;

    /// Called when the node is mounted at `path`.
    ///
    /// `parent` is `None` for root paths.
    fn on_mount(&self, parent: Option<&NodeRef>, path: &str) {
        _ = (parent, path);
    }

    /// Called when the node is dismounted.
    fn on_dismount(&self) {}

    /// Called when the node (or an ancestor) is shown.
    fn on_show(&self) {}

    /// Called when the node (or an ancestor) is hidden.
    fn on_hide(&self) {}

    /// Called when an event is delivered to this node.
    fn on_receive(&self, event: &str, payload: &mut Event) {
        _ = (event, payload);
    }

    /// The node's own opacity, before inheritance.
    fn opacity(&self) -> f32 {
        1.0
    }

    /// The node's own transform, before inheritance.
    fn transform(&self) -> Transform3d {
        Transform3d::IDENTITY
    }
}
