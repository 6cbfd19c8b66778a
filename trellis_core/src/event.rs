// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payloads delivered through [`SceneNode::on_receive`].
//!
//! [`Event`] wraps arbitrary caller data together with the bookkeeping the
//! bubbling dispatcher needs: a propagation-stopped flag and the node the
//! event was resolved to.
//!
//! [`SceneNode::on_receive`]: crate::node::SceneNode::on_receive

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::node::NodeRef;

/// The payload handed to every receiving node during a dispatch.
pub struct Event {
    data: Option<Box<dyn Any>>,
    propagation_stopped: bool,
    target: Option<NodeRef>,
}

impl Event {
    /// Creates an event carrying `data`.
    #[must_use]
    pub fn new<T: Any>(data: T) -> Self {
        Self {
            data: Some(Box::new(data)),
            propagation_stopped: false,
            target: None,
        }
    }

    /// Creates an event with no data.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: None,
            propagation_stopped: false,
            target: None,
        }
    }

    /// Returns the carried data if it is a `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    /// Returns the carried data mutably if it is a `T`.
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_deref_mut()?.downcast_mut()
    }

    /// Stops a bubbling dispatch after the current node.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Returns whether a receiver stopped propagation.
    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Returns the node a bubbling dispatch was resolved to, if any.
    #[must_use]
    pub fn target(&self) -> Option<&NodeRef> {
        self.target.as_ref()
    }

    pub(crate) fn begin_bubble(&mut self, target: Option<NodeRef>) {
        self.propagation_stopped = false;
        self.target = target;
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("has_data", &self.data.is_some())
            .field("propagation_stopped", &self.propagation_stopped)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}
