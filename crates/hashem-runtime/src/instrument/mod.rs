//! Execution instrumentation bus.
//!
//! The engine owns one [`Instrumenter`]. Observers attach an
//! [`ExecutionSink`] together with an [`EventFilter`]; the evaluator reports
//! enter and return events for every node whose tags intersect an attached
//! filter. Bindings are kept as a copy-on-write snapshot so dispatch never
//! holds the registry lock while a sink runs.

mod event;
mod listener;
pub(crate) mod probe;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use hashem_syntax::NodeTags;
use parking_lot::RwLock;
use tracing::debug;

use crate::engine::{Engine, LoadedSource};

pub use event::ExecutionEvent;
pub use listener::{ExecutionListener, ExecutionListenerBuilder, ListenerHandle};

/// Identifies one attached binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Which nodes a binding observes and what each event carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub tags: NodeTags,
    pub collect_inputs: bool,
    pub collect_return: bool,
    pub collect_exceptions: bool,
}

impl EventFilter {
    #[must_use]
    pub fn new(tags: NodeTags) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }
}

/// Receiver of execution events. Callbacks run on the executing thread.
pub trait ExecutionSink: Send + Sync {
    /// Called before a matched node executes.
    fn on_enter(&self, _event: &ExecutionEvent<'_>) {}

    /// Called after a matched node completed, normally or with an error.
    fn on_return(&self, _event: &ExecutionEvent<'_>) {}

    /// Called when a context loads a source into the engine.
    fn on_source_loaded(&self, _engine: &Engine, _loaded: &LoadedSource) {}
}

pub(crate) struct Binding {
    pub(crate) id: ListenerId,
    pub(crate) filter: EventFilter,
    pub(crate) sink: Arc<dyn ExecutionSink>,
    active: AtomicBool,
}

impl Binding {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Registry of attached bindings.
pub struct Instrumenter {
    bindings: RwLock<Arc<Vec<Arc<Binding>>>>,
    mask: AtomicU8,
    next_id: AtomicU64,
}

impl Default for Instrumenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrumenter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(Arc::new(Vec::new())),
            mask: AtomicU8::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// Attach `sink`; it sees events after every binding attached before it.
    pub fn attach(&self, filter: EventFilter, sink: Arc<dyn ExecutionSink>) -> ListenerId {
        debug_assert!(!filter.tags.is_empty(), "empty event filter");
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut bindings = self.bindings.write();
        let mut next = Vec::with_capacity(bindings.len() + 1);
        next.extend(bindings.iter().cloned());
        next.push(Arc::new(Binding {
            id,
            filter,
            sink,
            active: AtomicBool::new(true),
        }));
        self.publish(&mut bindings, next);
        debug!(listener = id.0, tags = ?filter.tags, "attached execution listener");
        id
    }

    /// Detach a binding. Returns `false` if it was already gone.
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut bindings = self.bindings.write();
        let Some(position) = bindings.iter().position(|binding| binding.id == id) else {
            return false;
        };
        bindings[position].active.store(false, Ordering::Release);
        let mut next: Vec<_> = bindings.iter().cloned().collect();
        next.remove(position);
        self.publish(&mut bindings, next);
        debug!(listener = id.0, "detached execution listener");
        true
    }

    /// Returns `true` while at least one binding is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mask.load(Ordering::Acquire) != 0
    }

    /// Returns `true` if some binding observes nodes carrying any of `tags`.
    #[must_use]
    pub fn wants(&self, tags: NodeTags) -> bool {
        self.mask.load(Ordering::Acquire) & tags.bits() != 0
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.bindings.read().len()
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Binding>>> {
        Arc::clone(&self.bindings.read())
    }

    pub(crate) fn source_loaded(&self, engine: &Engine, loaded: &LoadedSource) {
        for binding in self.snapshot().iter() {
            if binding.is_active() {
                binding.sink.on_source_loaded(engine, loaded);
            }
        }
    }

    fn publish(&self, slot: &mut Arc<Vec<Arc<Binding>>>, next: Vec<Arc<Binding>>) {
        let mask = next
            .iter()
            .fold(NodeTags::empty(), |mask, binding| mask | binding.filter.tags);
        *slot = Arc::new(next);
        self.mask.store(mask.bits(), Ordering::Release);
    }
}
