// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-keyed node registry and tree walks.
//!
//! [`NodeRegistry`] maps scene paths to [`NodeRef`] handles and drives nodes
//! through their lifecycle:
//!
//! - **Registration** stores a node and mounts it. Mounting calls
//!   [`on_mount`](SceneNode::on_mount) and then registers every child at the
//!   derived path `path/i`, so a whole subtree is registered depth-first by a
//!   single call.
//! - **Deregistration** clears the entry (the key stays, holding no node),
//!   calls [`on_dismount`](SceneNode::on_dismount), and deregisters the
//!   children the same way.
//! - **Show / hide** walk the subtree breadth-first. Each descendant is
//!   re-resolved through the registry at its own
//!   [`location`](SceneNode::location), so a node must report the path it
//!   was mounted at.
//! - **Dispatch** delivers an event breadth-first to every strict
//!   descendant of a path. **UI dispatch** bubbles an event from a target up
//!   through the nodes named by its path segments until a receiver calls
//!   [`Event::stop_propagation`].
//!
//! Every walk allocates its own queue, so a hook that triggers another walk
//! on the same registry (from outside the `&mut` borrow, e.g. on a later
//! frame) never observes a half-drained queue.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::event::Event;
use crate::node::{NodeRef, SceneNode, same_node};
use crate::path;
use crate::trace::{
    DispatchEvent, DispatchMode, LifecycleEvent, LifecycleKind, RegistryEvent, Tracer,
};

/// Errors returned by [`NodeRegistry`] operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// No node is registered at `path`.
    NotRegistered {
        /// The path looked up.
        path: String,
    },
    /// The node at `path` cannot be mounted because nothing is registered at
    /// its parent path.
    ParentNotRegistered {
        /// The path being mounted.
        path: String,
        /// The missing parent path.
        parent: String,
    },
    /// A node is already registered at `path`.
    AlreadyRegistered {
        /// The occupied path.
        path: String,
    },
    /// The node registered at `path` is not the one being deregistered.
    NodeMismatch {
        /// The path being deregistered.
        path: String,
    },
    /// An empty path was supplied.
    EmptyPath,
    /// An empty event name was supplied.
    EmptyEventName,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRegistered { path } => write!(f, "no node registered at path `{path}`"),
            Self::ParentNotRegistered { path, parent } => write!(
                f,
                "cannot mount `{path}`: parent not registered at expected location `{parent}`"
            ),
            Self::AlreadyRegistered { path } => {
                write!(f, "a node is already registered at path `{path}`")
            }
            Self::NodeMismatch { path } => write!(
                f,
                "the node registered at path `{path}` is not the node being deregistered"
            ),
            Self::EmptyPath => f.write_str("path is empty"),
            Self::EmptyEventName => f.write_str("event name is empty"),
        }
    }
}

impl core::error::Error for DispatchError {}

/// Maps scene paths to nodes and drives lifecycle walks and event dispatch.
///
/// The registry never owns node lifetimes beyond the handles it holds;
/// callers deregister a node before discarding it.
pub struct NodeRegistry<'t> {
    nodes: BTreeMap<String, Option<NodeRef>>,
    tracer: Tracer<'t>,
}

impl fmt::Debug for NodeRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("paths", &self.paths().collect::<Vec<_>>())
            .field("tracer", &self.tracer)
            .finish()
    }
}

impl Default for NodeRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> NodeRegistry<'t> {
    /// Creates an empty registry that discards trace events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tracer(Tracer::none())
    }

    /// Creates an empty registry reporting to `tracer`.
    #[must_use]
    pub fn with_tracer(tracer: Tracer<'t>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            tracer,
        }
    }

    /// Returns the registry's tracer, so callers can report propagation
    /// passes to the same sink.
    pub fn tracer_mut(&mut self) -> &mut Tracer<'t> {
        &mut self.tracer
    }

    // -- Table queries --

    /// Returns the node registered at `path`, if any.
    #[must_use]
    pub fn get_node(&self, path: &str) -> Option<NodeRef> {
        self.nodes.get(path).cloned().flatten()
    }

    /// Returns `true` if a node is registered at `path`.
    #[must_use]
    pub fn is_registered(&self, path: &str) -> bool {
        matches!(self.nodes.get(path), Some(Some(_)))
    }

    /// Returns the number of paths holding a node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.values().filter(|n| n.is_some()).count()
    }

    /// Returns `true` if no path holds a node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the paths holding a node, in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes
            .iter()
            .filter(|(_, n)| n.is_some())
            .map(|(p, _)| p.as_str())
    }

    // -- Registration --

    /// Registers `node` at `path` and mounts it along with its subtree.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::EmptyPath`] if `path` is empty.
    /// - [`DispatchError::AlreadyRegistered`] if `path` is occupied.
    /// - [`DispatchError::ParentNotRegistered`] if `path` is not a root and
    ///   its parent path holds no node. Nothing is stored in that case.
    ///
    /// A descendant whose derived path is already occupied aborts the mount
    /// with [`DispatchError::AlreadyRegistered`]; nodes mounted before it stay
    /// registered.
    pub fn register_node_at_path(&mut self, path: &str, node: NodeRef) -> Result<(), DispatchError> {
        if path.is_empty() {
            return Err(DispatchError::EmptyPath);
        }
        self.require_parent(path)?;
        let mut visited = 0;
        let result = self.register(path, node, &mut visited);
        self.trace_lifecycle(LifecycleKind::Mount, path, visited);
        result
    }

    /// Clears `path` and dismounts `node` along with its subtree.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::EmptyPath`] if `path` is empty.
    /// - [`DispatchError::NotRegistered`] if `path` holds no node.
    /// - [`DispatchError::NodeMismatch`] if `path` holds a different node.
    pub fn deregister_node_at_path(
        &mut self,
        path: &str,
        node: &NodeRef,
    ) -> Result<(), DispatchError> {
        if path.is_empty() {
            return Err(DispatchError::EmptyPath);
        }
        let mut visited = 0;
        let result = self.deregister(path, node, &mut visited);
        self.trace_lifecycle(LifecycleKind::Dismount, path, visited);
        result
    }

    // -- Lifecycle walks --

    /// Mounts the node at `path`: calls its `on_mount` hook, then registers
    /// each present child `i` at `path/i`, recursively.
    ///
    /// Root paths mount with no parent.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotRegistered`] if `path` holds no node.
    /// - [`DispatchError::ParentNotRegistered`] if the parent path holds no
    ///   node.
    /// - [`DispatchError::AlreadyRegistered`] if a child path is occupied.
    pub fn mount(&mut self, path: &str) -> Result<(), DispatchError> {
        let mut visited = 0;
        let result = self.mount_at(path, &mut visited);
        self.trace_lifecycle(LifecycleKind::Mount, path, visited);
        result
    }

    /// Dismounts the node at `path`: calls its `on_dismount` hook, then
    /// deregisters each present child at `path/i`, recursively.
    ///
    /// The node at `path` itself stays registered.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotRegistered`] if `path` holds no node.
    /// - [`DispatchError::NodeMismatch`] if a child path holds a node other
    ///   than the child reported by its parent.
    pub fn dismount(&mut self, path: &str) -> Result<(), DispatchError> {
        let node = self.require(path)?;
        let mut visited = 0;
        let result = self.dismount_node(path, &node, &mut visited);
        self.trace_lifecycle(LifecycleKind::Dismount, path, visited);
        result
    }

    /// Calls `on_show` on the node at `path` and on every node below it,
    /// parents before children.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotRegistered`] if `path`, or the location reported
    /// by any descendant, holds no node.
    pub fn show(&mut self, path: &str) -> Result<(), DispatchError> {
        self.walk(path, LifecycleKind::Show, |node| node.on_show())
    }

    /// Calls `on_hide` on the node at `path` and on every node below it,
    /// parents before children.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotRegistered`] if `path`, or the location reported
    /// by any descendant, holds no node.
    pub fn hide(&mut self, path: &str) -> Result<(), DispatchError> {
        self.walk(path, LifecycleKind::Hide, |node| node.on_hide())
    }

    // -- Lookup --

    /// Resolves each segment of `path` as a registry key of its own.
    ///
    /// The result has one entry per segment, in path order; `None` marks a
    /// segment with no registered node. Segments are looked up by their
    /// literal text, not by the reconstructed ancestor path, so this is meant
    /// for selector paths whose segments are themselves registered.
    ///
    /// # Errors
    ///
    /// [`DispatchError::EmptyPath`] if `path` is empty.
    pub fn lookup_chain(&self, path: &str) -> Result<Vec<Option<NodeRef>>, DispatchError> {
        if path.is_empty() {
            return Err(DispatchError::EmptyPath);
        }
        Ok(path::segments(path).map(|seg| self.get_node(seg)).collect())
    }

    /// Returns the node resolved for the final segment of `path`.
    ///
    /// See [`lookup_chain`](Self::lookup_chain).
    ///
    /// # Errors
    ///
    /// [`DispatchError::EmptyPath`] if `path` is empty.
    pub fn lookup_node(&self, path: &str) -> Result<Option<NodeRef>, DispatchError> {
        Ok(self.lookup_chain(path)?.pop().flatten())
    }

    // -- Dispatch --

    /// Delivers `event` to every strict descendant of the node at `path`,
    /// breadth-first. The node at `path` does not receive it.
    ///
    /// Returns the number of nodes that received the event.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::EmptyPath`] / [`DispatchError::EmptyEventName`] on
    ///   empty arguments.
    /// - [`DispatchError::NotRegistered`] if `path` holds no node.
    pub fn dispatch(
        &mut self,
        path: &str,
        event: &str,
        payload: &mut Event,
    ) -> Result<usize, DispatchError> {
        check_args(path, event)?;
        let node = self.require(path)?;

        let mut queue: VecDeque<NodeRef> = node.children().into_iter().flatten().collect();
        let mut delivered = 0;
        while let Some(child) = queue.pop_front() {
            queue.extend(child.children().into_iter().flatten());
            child.on_receive(event, payload);
            delivered += 1;
        }

        self.tracer.dispatch(&DispatchEvent {
            mode: DispatchMode::Broadcast,
            path,
            event,
            delivered,
            stopped: false,
        });
        Ok(delivered)
    }

    /// Bubbles `event` from the node resolved for `path` up through the
    /// nodes resolved for the preceding segments.
    ///
    /// The payload's stopped flag is cleared and its target set to the final
    /// resolved entry before delivery. Segments with no registered node are
    /// skipped. Delivery ends as soon as a receiver calls
    /// [`Event::stop_propagation`].
    ///
    /// Returns the number of nodes that received the event.
    ///
    /// # Errors
    ///
    /// [`DispatchError::EmptyPath`] / [`DispatchError::EmptyEventName`] on
    /// empty arguments.
    pub fn dispatch_ui_event(
        &mut self,
        path: &str,
        event: &str,
        payload: &mut Event,
    ) -> Result<usize, DispatchError> {
        check_args(path, event)?;
        let chain = self.lookup_chain(path)?;
        payload.begin_bubble(chain.last().cloned().flatten());

        let mut delivered = 0;
        for node in chain.iter().rev().flatten() {
            node.on_receive(event, payload);
            delivered += 1;
            if payload.is_propagation_stopped() {
                break;
            }
        }

        self.tracer.dispatch(&DispatchEvent {
            mode: DispatchMode::Bubble,
            path,
            event,
            delivered,
            stopped: payload.is_propagation_stopped(),
        });
        Ok(delivered)
    }

    // -- Internal helpers --

    fn require(&self, path: &str) -> Result<NodeRef, DispatchError> {
        self.get_node(path).ok_or_else(|| DispatchError::NotRegistered {
            path: path.to_string(),
        })
    }

    /// Returns the node at the parent of `path`, or `None` for a root path.
    fn require_parent(&self, path: &str) -> Result<Option<NodeRef>, DispatchError> {
        if path::is_root(path) {
            return Ok(None);
        }
        let parent = path::parent(path);
        self.get_node(parent)
            .map(Some)
            .ok_or_else(|| DispatchError::ParentNotRegistered {
                path: path.to_string(),
                parent: parent.to_string(),
            })
    }

    fn register(
        &mut self,
        path: &str,
        node: NodeRef,
        visited: &mut usize,
    ) -> Result<(), DispatchError> {
        if self.is_registered(path) {
            return Err(DispatchError::AlreadyRegistered {
                path: path.to_string(),
            });
        }
        self.nodes.insert(path.to_string(), Some(node));
        self.tracer.register(&RegistryEvent { path });
        self.mount_at(path, visited)
    }

    fn mount_at(&mut self, path: &str, visited: &mut usize) -> Result<(), DispatchError> {
        let node = self.require(path)?;
        let parent = self.require_parent(path)?;
        node.on_mount(parent.as_ref(), path);
        *visited += 1;

        for (i, child) in node.children().into_iter().enumerate() {
            if let Some(child) = child {
                self.register(&path::child(path, i), child, visited)?;
            }
        }
        Ok(())
    }

    fn deregister(
        &mut self,
        path: &str,
        node: &NodeRef,
        visited: &mut usize,
    ) -> Result<(), DispatchError> {
        let Some(slot) = self.nodes.get_mut(path).filter(|slot| slot.is_some()) else {
            return Err(DispatchError::NotRegistered {
                path: path.to_string(),
            });
        };
        if !slot.as_ref().is_some_and(|cur| same_node(cur, node)) {
            return Err(DispatchError::NodeMismatch {
                path: path.to_string(),
            });
        }
        *slot = None;
        self.tracer.deregister(&RegistryEvent { path });
        self.dismount_node(path, node, visited)
    }

    /// Dismounts `node`, which was registered at `path` (and may already
    /// have been cleared from it).
    fn dismount_node(
        &mut self,
        path: &str,
        node: &NodeRef,
        visited: &mut usize,
    ) -> Result<(), DispatchError> {
        node.on_dismount();
        *visited += 1;

        for (i, child) in node.children().into_iter().enumerate() {
            if let Some(child) = child {
                self.deregister(&path::child(path, i), &child, visited)?;
            }
        }
        Ok(())
    }

    fn walk(
        &mut self,
        path: &str,
        kind: LifecycleKind,
        hook: impl Fn(&NodeRef),
    ) -> Result<(), DispatchError> {
        let node = self.require(path)?;
        hook(&node);
        let mut visited = 1;

        let mut queue: VecDeque<NodeRef> = node.children().into_iter().flatten().collect();
        let mut result = Ok(());
        while let Some(child) = queue.pop_front() {
            let resolved = match self.require(&child.location()) {
                Ok(resolved) => resolved,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            };
            hook(&resolved);
            visited += 1;
            queue.extend(resolved.children().into_iter().flatten());
        }

        self.trace_lifecycle(kind, path, visited);
        result
    }

    fn trace_lifecycle(&mut self, kind: LifecycleKind, path: &str, visited: usize) {
        self.tracer.lifecycle(&LifecycleEvent {
            kind,
            path,
            visited,
        });
    }
}

fn check_args(path: &str, event: &str) -> Result<(), DispatchError> {
    if path.is_empty() {
        Err(DispatchError::EmptyPath)
    } else if event.is_empty() {
        Err(DispatchError::EmptyEventName)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    struct TestNode {
        name: &'static str,
        path: RefCell<String>,
        children: Vec<Option<NodeRef>>,
        log: Log,
        stops: bool,
    }

    impl TestNode {
        fn record(&self, what: &str) {
            self.log.borrow_mut().push(format!("{what}:{}", self.name));
        }
    }

    impl SceneNode for TestNode {
        fn children(&self) -> Vec<Option<NodeRef>> {
            self.children.clone()
        }

        fn location(&self) -> String {
            self.path.borrow().clone()
        }

        fn on_mount(&self, parent: Option<&NodeRef>, path: &str) {
            *self.path.borrow_mut() = path.to_string();
            let parent = parent.map_or(String::from("-"), |p| p.location());
            self.log
                .borrow_mut()
                .push(format!("mount:{}@{path}<{parent}", self.name));
        }

        fn on_dismount(&self) {
            self.record("dismount");
        }

        fn on_show(&self) {
            self.record("show");
        }

        fn on_hide(&self) {
            self.record("hide");
        }

        fn on_receive(&self, event: &str, payload: &mut Event) {
            self.record(event);
            if self.stops {
                payload.stop_propagation();
            }
        }
    }

    fn node(name: &'static str, children: Vec<Option<NodeRef>>, log: &Log) -> NodeRef {
        Rc::new(TestNode {
            name,
            path: RefCell::new(String::new()),
            children,
            log: log.clone(),
            stops: false,
        })
    }

    fn stopper(name: &'static str, log: &Log) -> NodeRef {
        Rc::new(TestNode {
            name,
            path: RefCell::new(String::new()),
            children: Vec::new(),
            log: log.clone(),
            stops: true,
        })
    }

    /// root -> A -> [B, C], B -> [D]
    fn sample_tree(log: &Log) -> NodeRef {
        let d = node("D", vec![], log);
        let b = node("B", vec![Some(d)], log);
        let c = node("C", vec![], log);
        let a = node("A", vec![Some(b), Some(c)], log);
        node("root", vec![Some(a)], log)
    }

    fn take(log: &Log) -> Vec<String> {
        core::mem::take(&mut *log.borrow_mut())
    }

    fn present(registry: &NodeRegistry<'_>) -> Vec<String> {
        registry.paths().map(String::from).collect()
    }

    #[test]
    fn register_then_get_returns_same_handle() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        let root = node("root", vec![], &log);
        registry.register_node_at_path("body", root.clone()).unwrap();

        let got = registry.get_node("body").unwrap();
        assert!(same_node(&got, &root));
        assert!(registry.is_registered("body"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_registration_fails() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("body", node("a", vec![], &log))
            .unwrap();
        assert_eq!(
            registry.register_node_at_path("body", node("b", vec![], &log)),
            Err(DispatchError::AlreadyRegistered {
                path: "body".into()
            })
        );
    }

    #[test]
    fn empty_path_is_rejected() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        assert_eq!(
            registry.register_node_at_path("", node("a", vec![], &log)),
            Err(DispatchError::EmptyPath)
        );
        assert_eq!(
            registry.lookup_node("").err(),
            Some(DispatchError::EmptyPath)
        );
        assert_eq!(
            registry.dispatch("body", "", &mut Event::empty()),
            Err(DispatchError::EmptyEventName)
        );
    }

    #[test]
    fn registration_mounts_subtree_at_derived_paths() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();

        assert_eq!(
            present(&registry),
            ["root", "root/0", "root/0/0", "root/0/0/0", "root/0/1"]
        );
        assert_eq!(
            take(&log),
            [
                "mount:root@root<-",
                "mount:A@root/0<root",
                "mount:B@root/0/0<root/0",
                "mount:D@root/0/0/0<root/0/0",
                "mount:C@root/0/1<root/0",
            ]
        );
    }

    #[test]
    fn placeholders_keep_their_index() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        let c = node("c", vec![], &log);
        registry
            .register_node_at_path("p", node("p", vec![None, Some(c)], &log))
            .unwrap();
        assert!(!registry.is_registered("p/0"));
        assert!(registry.is_registered("p/1"));
    }

    #[test]
    fn mount_requires_parent() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        assert_eq!(
            registry.register_node_at_path("x/0", node("a", vec![], &log)),
            Err(DispatchError::ParentNotRegistered {
                path: "x/0".into(),
                parent: "x".into(),
            })
        );
        assert!(!registry.is_registered("x/0"));
        assert!(take(&log).is_empty());
    }

    #[test]
    fn mount_unregistered_fails() {
        let mut registry = NodeRegistry::new();
        assert_eq!(
            registry.mount("nowhere"),
            Err(DispatchError::NotRegistered {
                path: "nowhere".into()
            })
        );
    }

    #[test]
    fn deregister_requires_same_handle() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("body", node("a", vec![], &log))
            .unwrap();
        let other = node("b", vec![], &log);
        assert_eq!(
            registry.deregister_node_at_path("body", &other),
            Err(DispatchError::NodeMismatch {
                path: "body".into()
            })
        );
        assert!(registry.is_registered("body"));
        assert_eq!(
            registry.deregister_node_at_path("elsewhere", &other),
            Err(DispatchError::NotRegistered {
                path: "elsewhere".into()
            })
        );
    }

    #[test]
    fn deregister_dismounts_subtree() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        let root = sample_tree(&log);
        registry.register_node_at_path("root", root.clone()).unwrap();
        let _ = take(&log);

        registry.deregister_node_at_path("root", &root).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get_node("root/0/0").is_none());
        assert_eq!(
            take(&log),
            [
                "dismount:root",
                "dismount:A",
                "dismount:B",
                "dismount:D",
                "dismount:C"
            ]
        );
    }

    #[test]
    fn mount_then_dismount_restores_present_set() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();
        registry.dismount("root").unwrap();
        let before = present(&registry);
        assert_eq!(before, ["root"]);

        registry.mount("root").unwrap();
        assert_eq!(registry.len(), 5);
        registry.dismount("root").unwrap();
        assert_eq!(present(&registry), before);
    }

    #[test]
    fn dispatch_is_breadth_first_and_skips_target() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();
        let _ = take(&log);

        let delivered = registry
            .dispatch("root", "x", &mut Event::empty())
            .unwrap();
        assert_eq!(delivered, 4);
        assert_eq!(take(&log), ["x:A", "x:B", "x:C", "x:D"]);
    }

    #[test]
    fn dispatch_from_leaf_reaches_nothing() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();
        let _ = take(&log);

        let delivered = registry
            .dispatch("root/0/1", "x", &mut Event::empty())
            .unwrap();
        assert_eq!(delivered, 0);
        assert!(take(&log).is_empty());
    }

    #[test]
    fn ui_event_bubbles_until_stopped() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("r", node("root", vec![], &log))
            .unwrap();
        registry
            .register_node_at_path("a", stopper("A", &log))
            .unwrap();
        let target = node("B", vec![], &log);
        registry.register_node_at_path("b", target.clone()).unwrap();
        let _ = take(&log);

        let mut payload = Event::new(5_u32);
        let delivered = registry
            .dispatch_ui_event("r/a/b", "click", &mut payload)
            .unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(take(&log), ["click:B", "click:A"]);
        assert!(payload.is_propagation_stopped());
        assert!(same_node(payload.target().unwrap(), &target));
        assert_eq!(payload.data::<u32>(), Some(&5));
    }

    #[test]
    fn ui_event_skips_unresolved_segments() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("r", node("root", vec![], &log))
            .unwrap();
        registry
            .register_node_at_path("b", node("B", vec![], &log))
            .unwrap();
        let _ = take(&log);

        let mut payload = Event::empty();
        payload.stop_propagation();
        let delivered = registry
            .dispatch_ui_event("r/missing/b", "tap", &mut payload)
            .unwrap();
        // The stale stop flag is cleared before delivery.
        assert_eq!(delivered, 2);
        assert_eq!(take(&log), ["tap:B", "tap:root"]);
    }

    #[test]
    fn lookup_resolves_segments_as_keys() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        let a = node("a", vec![], &log);
        registry.register_node_at_path("a", a.clone()).unwrap();

        let chain = registry.lookup_chain("x/a").unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].is_none());
        assert!(same_node(chain[1].as_ref().unwrap(), &a));

        let last = registry.lookup_node("a/x").unwrap();
        assert!(last.is_none());
    }

    #[test]
    fn show_and_hide_reach_each_node_once() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();
        let _ = take(&log);

        registry.show("root").unwrap();
        assert_eq!(
            take(&log),
            ["show:root", "show:A", "show:B", "show:C", "show:D"]
        );

        registry.hide("root/0/0").unwrap();
        assert_eq!(take(&log), ["hide:B", "hide:D"]);
    }

    #[test]
    fn show_fails_on_unregistered_descendant() {
        let log = Log::default();
        let mut registry = NodeRegistry::new();
        let root = sample_tree(&log);
        registry.register_node_at_path("root", root).unwrap();
        let b = registry.get_node("root/0/0").unwrap();
        registry.deregister_node_at_path("root/0/0", &b).unwrap();

        assert_eq!(
            registry.show("root"),
            Err(DispatchError::NotRegistered {
                path: "root/0/0".into()
            })
        );
    }

    #[test]
    fn error_display() {
        use alloc::string::ToString;

        assert_eq!(
            DispatchError::ParentNotRegistered {
                path: "a/0".into(),
                parent: "a".into()
            }
            .to_string(),
            "cannot mount `a/0`: parent not registered at expected location `a`"
        );
        assert_eq!(DispatchError::EmptyEventName.to_string(), "event name is empty");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn registry_reports_to_tracer() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Counts {
            registered: usize,
            lifecycle: Vec<(LifecycleKind, usize)>,
            dispatched: Vec<usize>,
        }
        impl TraceSink for Counts {
            fn on_register(&mut self, _e: &RegistryEvent<'_>) {
                self.registered += 1;
            }
            fn on_lifecycle(&mut self, e: &LifecycleEvent<'_>) {
                self.lifecycle.push((e.kind, e.visited));
            }
            fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
                self.dispatched.push(e.delivered);
            }
        }

        let log = Log::default();
        let mut sink = Counts::default();
        let mut registry = NodeRegistry::with_tracer(Tracer::new(&mut sink));
        registry
            .register_node_at_path("root", sample_tree(&log))
            .unwrap();
        registry.show("root").unwrap();
        registry.dispatch("root", "x", &mut Event::empty()).unwrap();
        drop(registry);

        assert_eq!(sink.registered, 5);
        assert_eq!(
            sink.lifecycle,
            [(LifecycleKind::Mount, 5), (LifecycleKind::Show, 5)]
        );
        assert_eq!(sink.dispatched, [4]);
    }
}
