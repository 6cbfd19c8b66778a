// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the registry and propagation passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`NodeRegistry`](crate::registry::NodeRegistry) calls as it registers
//! nodes, walks subtrees, and dispatches events. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates per-slot propagation records
//!   ([`TraceSink::on_slot_changes`]).

use crate::propagate::PropagationChanges;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which subtree walk produced a [`LifecycleEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// `mount`: subtree registered and `on_mount` called.
    Mount,
    /// `dismount`: `on_dismount` called and subtree deregistered.
    Dismount,
    /// `show`: `on_show` called on the subtree.
    Show,
    /// `hide`: `on_hide` called on the subtree.
    Hide,
}

/// How an event was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Breadth-first to every descendant of the path.
    Broadcast,
    /// From the resolved node up through its ancestors.
    Bubble,
}

/// Which inherited value a propagation pass recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropagationKind {
    /// Opacity.
    Opacity,
    /// Transform.
    Transform,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a path entry is registered or deregistered.
#[derive(Clone, Copy, Debug)]
pub struct RegistryEvent<'a> {
    /// The path affected.
    pub path: &'a str,
}

/// Emitted once per lifecycle walk.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleEvent<'a> {
    /// Which walk.
    pub kind: LifecycleKind,
    /// Root of the walk.
    pub path: &'a str,
    /// Number of nodes whose hook ran.
    pub visited: usize,
}

/// Emitted once per dispatch call.
#[derive(Clone, Copy, Debug)]
pub struct DispatchEvent<'a> {
    /// Broadcast or bubble.
    pub mode: DispatchMode,
    /// Path the dispatch started from.
    pub path: &'a str,
    /// Event name.
    pub event: &'a str,
    /// Number of `on_receive` calls made.
    pub delivered: usize,
    /// Whether a receiver stopped propagation.
    pub stopped: bool,
}

/// Emitted after a propagation pass.
#[derive(Clone, Copy, Debug)]
pub struct PropagateEvent {
    /// Which value was recomputed.
    pub kind: PropagationKind,
    /// Number of slots recomputed.
    pub updated: usize,
    /// Number of slots whose value changed.
    pub changed: usize,
}

impl PropagateEvent {
    /// Summarizes the result of a
    /// [`PropagationStore::update`](crate::propagate::PropagationStore::update).
    #[must_use]
    pub fn from_changes(kind: PropagationKind, changes: &PropagationChanges) -> Self {
        Self {
            kind,
            updated: changes.updated.len(),
            changed: changes.changed.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the registry and propagation passes.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a path is registered.
    fn on_register(&mut self, e: &RegistryEvent<'_>) {
        _ = e;
    }

    /// Called after a path is deregistered.
    fn on_deregister(&mut self, e: &RegistryEvent<'_>) {
        _ = e;
    }

    /// Called after a mount, dismount, show, or hide walk.
    fn on_lifecycle(&mut self, e: &LifecycleEvent<'_>) {
        _ = e;
    }

    /// Called after a dispatch completes.
    fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
        _ = e;
    }

    /// Called after a propagation pass.
    fn on_propagate(&mut self, e: &PropagateEvent) {
        _ = e;
    }

    /// Called with the slots whose value changed in a propagation pass
    /// (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_slot_changes(&mut self, kind: PropagationKind, slots: &[u32]) {
        _ = (kind, slots);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a registration [`RegistryEvent`].
    #[inline]
    pub fn register(&mut self, e: &RegistryEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_register(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a deregistration [`RegistryEvent`].
    #[inline]
    pub fn deregister(&mut self, e: &RegistryEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_deregister(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LifecycleEvent`].
    #[inline]
    pub fn lifecycle(&mut self, e: &LifecycleEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_lifecycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DispatchEvent`].
    #[inline]
    pub fn dispatch(&mut self, e: &DispatchEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PropagateEvent`].
    #[inline]
    pub fn propagate(&mut self, e: &PropagateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_propagate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PropagateEvent`] summarizing `changes`, followed by the
    /// changed slots when `trace-rich` is on.
    #[inline]
    pub fn propagation(&mut self, kind: PropagationKind, changes: &PropagationChanges) {
        self.propagate(&PropagateEvent::from_changes(kind, changes));
        #[cfg(feature = "trace-rich")]
        self.slot_changes(kind, &changes.changed);
    }

    /// Emits changed slots (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn slot_changes(&mut self, kind: PropagationKind, slots: &[u32]) {
        if let Some(s) = &mut self.sink {
            s.on_slot_changes(kind, slots);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn sample_dispatch() -> DispatchEvent<'static> {
        DispatchEvent {
            mode: DispatchMode::Broadcast,
            path: "body/0",
            event: "click",
            delivered: 3,
            stopped: false,
        }
    }

    #[test]
    fn propagate_event_from_changes() {
        let changes = PropagationChanges {
            updated: vec![0, 1, 2],
            changed: vec![1],
        };
        let e = PropagateEvent::from_changes(PropagationKind::Opacity, &changes);
        assert_eq!(e.kind, PropagationKind::Opacity);
        assert_eq!(e.updated, 3);
        assert_eq!(e.changed, 1);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_register(&RegistryEvent { path: "body" });
        sink.on_dispatch(&sample_dispatch());
        sink.on_lifecycle(&LifecycleEvent {
            kind: LifecycleKind::Show,
            path: "body",
            visited: 1,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.register(&RegistryEvent { path: "body" });
        tracer.dispatch(&sample_dispatch());
        tracer.propagation(PropagationKind::Transform, &PropagationChanges::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            delivered: Vec<usize>,
            propagated: Vec<(PropagationKind, usize)>,
        }
        impl TraceSink for RecordingSink {
            fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
                self.delivered.push(e.delivered);
            }
            fn on_propagate(&mut self, e: &PropagateEvent) {
                self.propagated.push((e.kind, e.changed));
            }
        }

        let mut sink = RecordingSink {
            delivered: Vec::new(),
            propagated: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.dispatch(&sample_dispatch());
        tracer.propagation(
            PropagationKind::Opacity,
            &PropagationChanges {
                updated: vec![0, 1],
                changed: vec![1],
            },
        );
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.delivered, &[3]);
        assert_eq!(sink.propagated, &[(PropagationKind::Opacity, 1)]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn rich_tracer_reports_slots() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct SlotSink {
            slots: Vec<u32>,
        }
        impl TraceSink for SlotSink {
            fn on_slot_changes(&mut self, _kind: PropagationKind, slots: &[u32]) {
                self.slots.extend_from_slice(slots);
            }
        }

        let mut sink = SlotSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.propagation(
            PropagationKind::Transform,
            &PropagationChanges {
                updated: vec![4, 5],
                changed: vec![5],
            },
        );
        drop(tracer);
        assert_eq!(sink.slots, &[5]);
    }
}
