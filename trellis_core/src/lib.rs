// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-addressed scene-graph core: node registry, event dispatch, and
//! inherited transform/opacity propagation.
//!
//! `trellis_core` sits between application code and a rendering layer. It is
//! `no_std` compatible (with `alloc`), never owns scene nodes, and performs
//! no I/O.
//!
//! # Architecture
//!
//! ```text
//!   Application
//!       │ register / show / hide / dispatch
//!       ▼
//!   NodeRegistry ──► SceneNode hooks (on_mount, on_show, on_receive, ...)
//!
//!   Application
//!       │ set_dirty / set_parent / set_break_point
//!       ▼
//!   PropagationStore::update() ──► PropagationChanges ──► Presenter::apply()
//! ```
//!
//! **[`path`]**: slash-delimited scene paths (`"body/0/2"`) and the helpers
//! the registry derives child paths with.
//!
//! **[`node`]**: the [`SceneNode`](node::SceneNode) capability trait. Every
//! hook has a no-op default.
//!
//! **[`event`]**: the [`Event`](event::Event) payload with its
//! propagation-stopped flag and target.
//!
//! **[`registry`]**: [`NodeRegistry`](registry::NodeRegistry) maps paths to
//! nodes and drives mount/dismount (depth-first), show/hide and dispatch
//! (breadth-first), and bubbling UI events.
//!
//! **[`propagate`]**: struct-of-arrays [`PropagationStore`] with
//! generational handles. Local values accumulate down the tree; world values
//! are computed only on *breakpoints*.
//!
//! **[`dirty`]**: dirty channels driving incremental updates via
//! `understory_dirty`.
//!
//! **[`transform`]**: the column-major [`Transform3d`](transform::Transform3d).
//!
//! **[`backend`]**: the [`Presenter`](backend::Presenter) trait rendering
//! layers implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-slot
//!   propagation change events.
//!
//! [`PropagationStore`]: propagate::PropagationStore

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod dirty;
pub mod event;
pub mod node;
pub mod path;
pub mod propagate;
pub mod registry;
pub mod trace;
pub mod transform;
