// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use trellis_core::trace::{
    DispatchEvent, DispatchMode, LifecycleEvent, LifecycleKind, PropagateEvent, PropagationKind,
    RegistryEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn lifecycle_name(kind: LifecycleKind) -> &'static str {
    match kind {
        LifecycleKind::Mount => "mount",
        LifecycleKind::Dismount => "dismount",
        LifecycleKind::Show => "show",
        LifecycleKind::Hide => "hide",
    }
}

fn mode_name(mode: DispatchMode) -> &'static str {
    match mode {
        DispatchMode::Broadcast => "broadcast",
        DispatchMode::Bubble => "bubble",
    }
}

fn kind_name(kind: PropagationKind) -> &'static str {
    match kind {
        PropagationKind::Opacity => "opacity",
        PropagationKind::Transform => "transform",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_register(&mut self, e: &RegistryEvent<'_>) {
        let _ = writeln!(self.writer, "[register] path={}", e.path);
    }

    fn on_deregister(&mut self, e: &RegistryEvent<'_>) {
        let _ = writeln!(self.writer, "[deregister] path={}", e.path);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[{}] path={} visited={}",
            lifecycle_name(e.kind),
            e.path,
            e.visited,
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
        let stopped = if e.stopped { " STOPPED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[dispatch:{}] path={} event={} delivered={}{stopped}",
            mode_name(e.mode),
            e.path,
            e.event,
            e.delivered,
        );
    }

    fn on_propagate(&mut self, e: &PropagateEvent) {
        let _ = writeln!(
            self.writer,
            "[propagate:{}] updated={} changed={}",
            kind_name(e.kind),
            e.updated,
            e.changed,
        );
    }

    fn on_slot_changes(&mut self, kind: PropagationKind, slots: &[u32]) {
        let _ = writeln!(self.writer, "[slots:{}] {slots:?}", kind_name(kind));
    }
}
