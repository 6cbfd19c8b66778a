// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds a small scene, drives the registry and propagation stores through a
//! few frames, and exports the recorded trace.
//!
//! Trace lines are printed to stderr as they happen. A Chrome trace is written
//! to `trace.json` in the current directory; open it in `chrome://tracing` or
//! [Perfetto](https://ui.perfetto.dev/).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Affine, Vec2};
use trellis_core::backend::Presenter;
use trellis_core::event::Event;
use trellis_core::node::{NodeRef, SceneNode};
use trellis_core::path;
use trellis_core::propagate::{
    Inherit, OpacityStore, PropagationChanges, PropagationStore, StateId, TransformStore,
};
use trellis_core::registry::NodeRegistry;
use trellis_core::trace::{
    DispatchEvent, LifecycleEvent, PropagateEvent, PropagationKind, RegistryEvent, TraceSink,
    Tracer,
};
use trellis_core::transform::Transform3d;
use trellis_debug::chrome;
use trellis_debug::pretty::PrettyPrintSink;
use trellis_debug::recorder::RecorderSink;

const FRAMES: usize = 3;

// -- Scene --

struct Widget {
    name: &'static str,
    path: RefCell<String>,
    opacity: Cell<f32>,
    offset: Cell<Vec2>,
    children: Vec<Option<NodeRef>>,
    stops: bool,
}

impl Widget {
    fn new(name: &'static str, children: Vec<Option<NodeRef>>) -> Rc<Self> {
        Self::build(name, children, false)
    }

    /// A childless widget that stops any event it receives.
    fn stopping(name: &'static str) -> Rc<Self> {
        Self::build(name, Vec::new(), true)
    }

    fn build(name: &'static str, children: Vec<Option<NodeRef>>, stops: bool) -> Rc<Self> {
        Rc::new(Self {
            name,
            path: RefCell::new(String::new()),
            opacity: Cell::new(1.0),
            offset: Cell::new(Vec2::ZERO),
            children,
            stops,
        })
    }
}

impl SceneNode for Widget {
    fn children(&self) -> Vec<Option<NodeRef>> {
        self.children.clone()
    }

    fn location(&self) -> String {
        self.path.borrow().clone()
    }

    fn on_mount(&self, _parent: Option<&NodeRef>, path: &str) {
        *self.path.borrow_mut() = path.to_string();
    }

    fn on_receive(&self, event: &str, payload: &mut Event) {
        println!("  {} received {event}", self.name);
        if self.stops {
            payload.stop_propagation();
        }
    }

    fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    fn transform(&self) -> Transform3d {
        Transform3d::from_affine(Affine::translate(self.offset.get()))
    }
}

// -- Trace fan-out --

/// Forwards every event to both a pretty printer and a recorder.
struct Tee<'a> {
    pretty: &'a mut dyn TraceSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_register(&mut self, e: &RegistryEvent<'_>) {
        self.pretty.on_register(e);
        self.recorder.on_register(e);
    }

    fn on_deregister(&mut self, e: &RegistryEvent<'_>) {
        self.pretty.on_deregister(e);
        self.recorder.on_deregister(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent<'_>) {
        self.pretty.on_lifecycle(e);
        self.recorder.on_lifecycle(e);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent<'_>) {
        self.pretty.on_dispatch(e);
        self.recorder.on_dispatch(e);
    }

    fn on_propagate(&mut self, e: &PropagateEvent) {
        self.pretty.on_propagate(e);
        self.recorder.on_propagate(e);
    }

    fn on_slot_changes(&mut self, kind: PropagationKind, slots: &[u32]) {
        self.pretty.on_slot_changes(kind, slots);
        self.recorder.on_slot_changes(kind, slots);
    }
}

// -- Presentation --

/// Prints the world value of every changed breakpoint.
struct PrintPresenter;

impl Presenter<f32> for PrintPresenter {
    fn apply(&mut self, store: &OpacityStore, changes: &PropagationChanges) {
        for &idx in &changes.changed {
            if let Some(world) = store.world_at(idx) {
                println!("  slot {idx}: opacity {world:.3}");
            }
        }
    }
}

impl Presenter<Transform3d> for PrintPresenter {
    fn apply(&mut self, store: &TransformStore, changes: &PropagationChanges) {
        for &idx in &changes.changed {
            if let Some(world) = store.world_at(idx) {
                let [x, y, _] = world.translation();
                println!("  slot {idx}: translate ({x}, {y})");
            }
        }
    }
}

/// Creates one slot per registered path under `root`, parented the way the
/// paths nest. Leaves become breakpoints, as does `root`.
fn mirror<V: Inherit>(
    registry: &NodeRegistry<'_>,
    store: &mut PropagationStore<V>,
    root: &str,
) -> Result<HashMap<StateId, NodeRef>, Box<dyn Error>> {
    // Sorted order puts every parent before its children.
    let paths: Vec<String> = registry
        .paths()
        .filter(|p| path::is_child_of(p, root))
        .map(str::to_string)
        .collect();

    let mut ids: HashMap<String, StateId> = HashMap::new();
    let mut nodes = HashMap::new();
    for p in paths {
        let Some(node) = registry.get_node(&p) else {
            continue;
        };
        let id = store.create();
        if let Some(&parent) = ids.get(path::parent(&p)) {
            store.set_parent(id, Some(parent))?;
        }
        if p == root || node.children().is_empty() {
            store.set_break_point(id);
        }
        ids.insert(p, id);
        nodes.insert(id, node);
    }
    Ok(nodes)
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut pretty = PrettyPrintSink::stderr();
    let mut recorder = RecorderSink::new();
    let mut tee = Tee {
        pretty: &mut pretty,
        recorder: &mut recorder,
    };

    {
        let mut registry = NodeRegistry::with_tracer(Tracer::new(&mut tee));

        // body ─┬─ header
        //       └─ panel ─┬─ label
        //                 └─ button
        let label: NodeRef = Widget::new("label", Vec::new());
        let button: NodeRef = Widget::new("button", Vec::new());
        let panel = Widget::new("panel", vec![Some(label), None, Some(button)]);
        let panel_node: NodeRef = panel.clone();
        let header: NodeRef = Widget::new("header", Vec::new());
        let body: NodeRef = Widget::new("body", vec![Some(header), Some(panel_node)]);

        registry.register_node_at_path("body", body.clone())?;
        registry.show("body")?;

        println!("broadcast resize:");
        registry.dispatch("body", "resize", &mut Event::new((800_u32, 600_u32)))?;

        // Selector-style registration: each segment is its own key.
        registry.register_node_at_path("toolbar", Widget::stopping("toolbar"))?;
        registry.register_node_at_path("save", Widget::new("save", Vec::new()))?;
        println!("bubble click:");
        registry.dispatch_ui_event("toolbar/save", "click", &mut Event::empty())?;

        let mut opacity = OpacityStore::new();
        let mut transform = TransformStore::new();
        let opacity_nodes = mirror(&registry, &mut opacity, "body")?;
        let transform_nodes = mirror(&registry, &mut transform, "body")?;
        let panel_slot = opacity_nodes
            .iter()
            .find(|(_, node)| node.location() == "body/1")
            .map(|(id, _)| *id);
        let panel_transform_slot = transform_nodes
            .iter()
            .find(|(_, node)| node.location() == "body/1")
            .map(|(id, _)| *id);

        let mut presenter = PrintPresenter;
        let mut changes = PropagationChanges::default();
        for frame in 0..FRAMES {
            println!("frame {frame}:");
            opacity.update_into(|id| opacity_nodes[&id].opacity(), &mut changes);
            registry
                .tracer_mut()
                .propagation(PropagationKind::Opacity, &changes);
            presenter.apply(&opacity, &changes);

            transform.update_into(|id| transform_nodes[&id].transform(), &mut changes);
            registry
                .tracer_mut()
                .propagation(PropagationKind::Transform, &changes);
            presenter.apply(&transform, &changes);

            // Fade the panel and slide it right for the next frame.
            panel.opacity.set(panel.opacity.get() * 0.5);
            panel.offset.set(panel.offset.get() + Vec2::new(10.0, 0.0));
            if let Some(id) = panel_slot {
                opacity.set_dirty(id);
            }
            if let Some(id) = panel_transform_slot {
                transform.set_dirty(id);
            }
        }

        registry.hide("body")?;
        registry.deregister_node_at_path("body", &body)?;
    }

    let file = File::create("trace.json")?;
    chrome::export(recorder.as_bytes(), &mut BufWriter::new(file))?;
    eprintln!("wrote trace.json ({} bytes recorded)", recorder.as_bytes().len());
    Ok(())
}
