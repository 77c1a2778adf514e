use std::sync::Arc;

use hashem_syntax::NodeTags;

use crate::engine::Engine;

use super::{EventFilter, ExecutionEvent, ExecutionSink, ListenerId};

type Callback = Box<dyn Fn(&ExecutionEvent<'_>) + Send + Sync>;

/// Closure-based execution listener.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use hashem_runtime::{Context, Engine, ExecutionListener, Source};
///
/// let engine = Engine::builder().build();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let listener = ExecutionListener::builder()
///     .on_return(move |event| sink.lock().unwrap().push(event.section().characters().to_string()))
///     .statements(true)
///     .attach(&engine);
///
/// let mut context = Context::new(&engine);
/// context.eval(&Source::new("hashemi", "bebin main() { bede 1; }", "main.hashem")).unwrap();
/// context.invoke("main", &[]).unwrap();
/// listener.close();
///
/// assert_eq!(*seen.lock().unwrap(), vec!["bede 1".to_string()]);
/// ```
pub struct ExecutionListener;

impl ExecutionListener {
    #[must_use]
    pub fn builder() -> ExecutionListenerBuilder {
        ExecutionListenerBuilder::default()
    }
}

#[derive(Default)]
pub struct ExecutionListenerBuilder {
    on_enter: Option<Callback>,
    on_return: Option<Callback>,
    filter: EventFilter,
}

impl ExecutionListenerBuilder {
    #[must_use]
    pub fn on_enter(mut self, callback: impl Fn(&ExecutionEvent<'_>) + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_return(
        mut self,
        callback: impl Fn(&ExecutionEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_return = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn roots(self, enabled: bool) -> Self {
        self.tag(NodeTags::ROOT, enabled)
    }

    #[must_use]
    pub fn statements(self, enabled: bool) -> Self {
        self.tag(NodeTags::STATEMENT, enabled)
    }

    #[must_use]
    pub fn expressions(self, enabled: bool) -> Self {
        self.tag(NodeTags::EXPRESSION, enabled)
    }

    #[must_use]
    pub fn collect_input_values(mut self, enabled: bool) -> Self {
        self.filter.collect_inputs = enabled;
        self
    }

    #[must_use]
    pub fn collect_return_value(mut self, enabled: bool) -> Self {
        self.filter.collect_return = enabled;
        self
    }

    #[must_use]
    pub fn collect_exceptions(mut self, enabled: bool) -> Self {
        self.filter.collect_exceptions = enabled;
        self
    }

    /// Start receiving events from every context of `engine`.
    ///
    /// # Panics
    ///
    /// Panics if none of roots, statements or expressions is selected.
    #[must_use = "dropping the handle detaches the listener"]
    pub fn attach(self, engine: &Engine) -> ListenerHandle {
        assert!(
            !self.filter.tags.is_empty(),
            "execution listener must select at least one node category"
        );
        let sink = CallbackSink {
            on_enter: self.on_enter,
            on_return: self.on_return,
        };
        let id = engine.instrumenter().attach(self.filter, Arc::new(sink));
        ListenerHandle::new(engine.clone(), id)
    }

    fn tag(mut self, tag: NodeTags, enabled: bool) -> Self {
        self.filter.tags.set(tag, enabled);
        self
    }
}

struct CallbackSink {
    on_enter: Option<Callback>,
    on_return: Option<Callback>,
}

impl ExecutionSink for CallbackSink {
    fn on_enter(&self, event: &ExecutionEvent<'_>) {
        if let Some(callback) = &self.on_enter {
            callback(event);
        }
    }

    fn on_return(&self, event: &ExecutionEvent<'_>) {
        if let Some(callback) = &self.on_return {
            callback(event);
        }
    }
}

/// Attached binding; detaches when closed or dropped.
pub struct ListenerHandle {
    engine: Engine,
    id: ListenerId,
}

impl ListenerHandle {
    pub(crate) fn new(engine: Engine, id: ListenerId) -> Self {
        Self { engine, id }
    }

    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Stop receiving events.
    pub fn close(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.engine.instrumenter().detach(self.id);
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle").field("id", &self.id).finish()
    }
}
