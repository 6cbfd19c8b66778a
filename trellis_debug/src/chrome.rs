// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The core performs no I/O and reads no clock, so events carry no
//! timestamps. Each event is placed at its ordinal position in the
//! recording (`ts` = 0, 1, 2, ... µs), which keeps the timeline ordered.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of instant events, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(ts, recorded)| to_json(ts, recorded))
        .collect();

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(ts: usize, recorded: RecordedEvent) -> Value {
    let (name, cat, args) = match recorded {
        RecordedEvent::Register { path } => ("Register", "Registry", json!({ "path": path })),
        RecordedEvent::Deregister { path } => {
            ("Deregister", "Registry", json!({ "path": path }))
        }
        RecordedEvent::Lifecycle {
            kind,
            path,
            visited,
        } => (
            "Lifecycle",
            "Lifecycle",
            json!({
                "kind": format!("{kind:?}"),
                "path": path,
                "visited": visited,
            }),
        ),
        RecordedEvent::Dispatch {
            mode,
            path,
            event,
            delivered,
            stopped,
        } => (
            "Dispatch",
            "Dispatch",
            json!({
                "mode": format!("{mode:?}"),
                "path": path,
                "event": event,
                "delivered": delivered,
                "stopped": stopped,
            }),
        ),
        RecordedEvent::Propagate {
            kind,
            updated,
            changed,
        } => (
            "Propagate",
            "Propagate",
            json!({
                "kind": format!("{kind:?}"),
                "updated": updated,
                "changed": changed,
            }),
        ),
        RecordedEvent::SlotChangesCount { kind, count } => (
            "SlotChanges",
            "Rich",
            json!({
                "kind": format!("{kind:?}"),
                "count": count,
            }),
        ),
    };

    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}
