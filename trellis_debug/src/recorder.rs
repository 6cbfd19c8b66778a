// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records: a one-byte tag followed by the event's
//! fields. Strings are stored as a `u32` byte length followed by UTF-8 bytes.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_slot_changes`](TraceSink::on_slot_changes)) store only
//! the count.

use trellis_core::trace::{
    DispatchEvent, DispatchMode, LifecycleEvent, LifecycleKind, PropagateEvent, PropagationKind,
    RegistryEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REGISTER: u8 = 1;
const TAG_DEREGISTER: u8 = 2;
const TAG_LIFECYCLE: u8 = 3;
const TAG_DISPATCH: u8 = 4;
const TAG_PROPAGATE: u8 = 5;
const TAG_SLOT_CHANGES_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, n: usize) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "counts capped at u32::MAX for recording"
        )]
        self.write_u32(n.min(u32::MAX as usize) as u32);
    }

    fn write_str(&mut self, s: &str) {
        let len = s.len().min(u32::MAX as usize);
        self.write_count(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len]);
    }

    fn write_lifecycle(&mut self, kind: LifecycleKind) {
        self.write_u8(match kind {
            LifecycleKind::Mount => 0,
            LifecycleKind::Dismount => 1,
            LifecycleKind::Show => 2,
            LifecycleKind::Hide => 3,
        });
    }

    fn write_mode(&mut self, mode: DispatchMode) {
        self.write_u8(match mode {
            DispatchMode::Broadcast => 0,
            DispatchMode::Bubble => 1,
        });
    }

    fn write_kind(&mut self, kind: PropagationKind) {
        self.write_u8(match kind {
            PropagationKind::Opacity => 0,
            PropagationKind::Transform => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_register(&mut self, e: &RegistryEvent<'_>) {
        self.write_u8(TAG_REGISTER);
        self.write_str(e.path);
    }

    fn on_deregister(&mut self, e: &RegistryEvent<'_>) {
        self.write_u8(TAG_DEREGISTER);
        self.write_str(e.path);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent<'_>) {
        self.write_u8(TAG_LIFECYCLE);
        self.write_lifecycle(e.kind);
        self.write_str(e.path);
        self.write_count(e.visited);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
        self.write_u8(TAG_DISPATCH);
        self.write_mode(e.mode);
        self.write_str(e.path);
        self.write_str(e.event);
        self.write_count(e.delivered);
        self.write_u8(u8::from(e.stopped));
    }

    fn on_propagate(&mut self, e: &PropagateEvent) {
        self.write_u8(TAG_PROPAGATE);
        self.write_kind(e.kind);
        self.write_count(e.updated);
        self.write_count(e.changed);
    }

    fn on_slot_changes(&mut self, kind: PropagationKind, slots: &[u32]) {
        self.write_u8(TAG_SLOT_CHANGES_COUNT);
        self.write_kind(kind);
        self.write_count(slots.len());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A path was registered.
    Register {
        /// The registered path.
        path: String,
    },
    /// A path was deregistered.
    Deregister {
        /// The deregistered path.
        path: String,
    },
    /// A lifecycle walk completed.
    Lifecycle {
        /// Which walk.
        kind: LifecycleKind,
        /// Root of the walk.
        path: String,
        /// Number of nodes whose hook ran.
        visited: u32,
    },
    /// A dispatch completed.
    Dispatch {
        /// Broadcast or bubble.
        mode: DispatchMode,
        /// Path the dispatch started from.
        path: String,
        /// Event name.
        event: String,
        /// Number of receivers.
        delivered: u32,
        /// Whether a receiver stopped propagation.
        stopped: bool,
    },
    /// A propagation pass completed.
    Propagate {
        /// Which value.
        kind: PropagationKind,
        /// Number of slots recomputed.
        updated: u32,
        /// Number of slots whose value changed.
        changed: u32,
    },
    /// Changed-slot count for a propagation pass.
    SlotChangesCount {
        /// Which value.
        kind: PropagationKind,
        /// Number of changed slots.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecodeIter<'a> {
    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        String::from_utf8(self.read_bytes(len)?.to_vec()).ok()
    }

    fn read_lifecycle(&mut self) -> Option<LifecycleKind> {
        match self.read_u8()? {
            0 => Some(LifecycleKind::Mount),
            1 => Some(LifecycleKind::Dismount),
            2 => Some(LifecycleKind::Show),
            3 => Some(LifecycleKind::Hide),
            _ => None,
        }
    }

    fn read_mode(&mut self) -> Option<DispatchMode> {
        match self.read_u8()? {
            0 => Some(DispatchMode::Broadcast),
            1 => Some(DispatchMode::Bubble),
            _ => None,
        }
    }

    fn read_kind(&mut self) -> Option<PropagationKind> {
        match self.read_u8()? {
            0 => Some(PropagationKind::Opacity),
            1 => Some(PropagationKind::Transform),
            _ => None,
        }
    }

    fn decode_lifecycle(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Lifecycle {
            kind: self.read_lifecycle()?,
            path: self.read_str()?,
            visited: self.read_u32()?,
        })
    }

    fn decode_dispatch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Dispatch {
            mode: self.read_mode()?,
            path: self.read_str()?,
            event: self.read_str()?,
            delivered: self.read_u32()?,
            stopped: self.read_u8()? != 0,
        })
    }

    fn decode_propagate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Propagate {
            kind: self.read_kind()?,
            updated: self.read_u32()?,
            changed: self.read_u32()?,
        })
    }

    fn decode_slot_changes_count(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotChangesCount {
            kind: self.read_kind()?,
            count: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_REGISTER => Some(RecordedEvent::Register {
                path: self.read_str()?,
            }),
            TAG_DEREGISTER => Some(RecordedEvent::Deregister {
                path: self.read_str()?,
            }),
            TAG_LIFECYCLE => self.decode_lifecycle(),
            TAG_DISPATCH => self.decode_dispatch(),
            TAG_PROPAGATE => self.decode_propagate(),
            TAG_SLOT_CHANGES_COUNT => self.decode_slot_changes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
