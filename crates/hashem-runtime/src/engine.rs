//! Engine and evaluation contexts.
//!
//! An [`Engine`] is shared by every [`Context`] created from it: it owns the
//! output streams, the configuration, the instrumenter and the registry of
//! loaded sources. A context holds the function table of the sources it
//! evaluated and runs functions on the calling thread.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use hashem_syntax::ast::FunctionDecl;
use hashem_syntax::{parse, Source, SourceSection};
use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{Error, RuntimeError};
use crate::eval::{call_value, EvalContext};
use crate::instrument::Instrumenter;
use crate::memory::CallStack;
use crate::stdlib;
use crate::value::{FunctionRef, Value};

pub(crate) type FunctionTable = IndexMap<SmolStr, Arc<FunctionDecl>>;

type Stream = Box<dyn Write + Send>;

/// A source evaluated by some context, with the sections of its statements.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    source: Source,
    statements: Vec<SourceSection>,
}

impl LoadedSource {
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Statement sections in source order.
    #[must_use]
    pub fn statements(&self) -> &[SourceSection] {
        &self.statements
    }
}

struct EngineInner {
    config: EngineConfig,
    out: Mutex<Stream>,
    err: Mutex<Stream>,
    instrumenter: Instrumenter,
    loaded: Mutex<Vec<Arc<LoadedSource>>>,
}

/// Shared runtime services. Cloning is cheap.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn instrumenter(&self) -> &Instrumenter {
        &self.inner.instrumenter
    }

    /// Every source evaluated so far, in load order.
    #[must_use]
    pub fn loaded_sources(&self) -> Vec<Arc<LoadedSource>> {
        self.inner.loaded.lock().clone()
    }

    pub(crate) fn out(&self) -> MutexGuard<'_, Stream> {
        self.inner.out.lock()
    }

    /// Write one diagnostic line to the error stream.
    pub(crate) fn write_err(&self, message: &str) {
        let mut err = self.inner.err.lock();
        if let Err(io) = writeln!(err, "{message}").and_then(|()| err.flush()) {
            warn!("failed to write diagnostic: {io}");
        }
    }

    /// Record `source` unless it was loaded before; returns the new entry.
    fn register(&self, source: &Source, statements: Vec<SourceSection>) -> Option<Arc<LoadedSource>> {
        let mut loaded = self.inner.loaded.lock();
        if loaded.iter().any(|entry| entry.source == *source) {
            return None;
        }
        let entry = Arc::new(LoadedSource {
            source: source.clone(),
            statements,
        });
        loaded.push(Arc::clone(&entry));
        Some(entry)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("listeners", &self.inner.instrumenter.listener_count())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`]. Streams default to stdout and stderr.
#[derive(Default)]
pub struct EngineBuilder {
    out: Option<Stream>,
    err: Option<Stream>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Stream receiving program output.
    #[must_use]
    pub fn out(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    /// Stream receiving diagnostics.
    #[must_use]
    pub fn err(mut self, err: impl Write + Send + 'static) -> Self {
        self.err = Some(Box::new(err));
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                config: self.config,
                out: Mutex::new(self.out.unwrap_or_else(|| Box::new(std::io::stdout()))),
                err: Mutex::new(self.err.unwrap_or_else(|| Box::new(std::io::stderr()))),
                instrumenter: Instrumenter::new(),
                loaded: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// Function namespace plus the call stack of one evaluating thread.
pub struct Context {
    engine: Engine,
    functions: FunctionTable,
    stack: CallStack,
}

impl Context {
    #[must_use]
    pub fn new(engine: &Engine) -> Self {
        Self {
            engine: engine.clone(),
            functions: IndexMap::new(),
            stack: CallStack::new(),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Parse `source` and register its functions.
    ///
    /// A function declared again by a later source replaces the earlier
    /// declaration.
    pub fn eval(&mut self, source: &Source) -> Result<(), Error> {
        let language = &self.engine.config().language;
        if source.language() != language.as_str() {
            return Err(Error::UnsupportedLanguage(source.language().into()));
        }
        let program = parse(source)?;
        let statements = program.statement_sections();
        for function in program.functions {
            debug!(function = %function.name, source = source.name(), "registered function");
            self.functions
                .insert(function.name.clone(), Arc::new(function));
        }
        if let Some(loaded) = self.engine.register(source, statements) {
            self.engine
                .instrumenter()
                .source_loaded(&self.engine, &loaded);
        }
        Ok(())
    }

    #[must_use]
    pub fn bindings(&self) -> Bindings<'_> {
        Bindings {
            functions: &self.functions,
        }
    }

    /// Call `function` with `args` on the current thread.
    pub fn execute(&mut self, function: &Value, args: &[Value]) -> Result<Value, Error> {
        let mut ctx = EvalContext::new(&self.engine, &self.functions, &mut self.stack);
        let result = call_value(&mut ctx, function, args.to_vec());
        if result.is_err() {
            self.stack.clear();
        }
        result.map_err(Error::from)
    }

    /// Look `name` up in the bindings and call it.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, Error> {
        let function = self
            .bindings()
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.into()))?;
        self.execute(&function, args)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("depth", &self.stack.depth())
            .finish_non_exhaustive()
    }
}

/// Read-only view of the names callable from a context.
#[derive(Clone, Copy)]
pub struct Bindings<'a> {
    functions: &'a FunctionTable,
}

impl Bindings<'_> {
    /// User functions shadow builtins of the same name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(function) = self.functions.get(name) {
            return Some(Value::Function(FunctionRef::User(Arc::clone(function))));
        }
        stdlib::lookup(name).map(|builtin| Value::Function(FunctionRef::Builtin(builtin)))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// User function names in registration order.
    pub fn function_names(&self) -> impl Iterator<Item = &SmolStr> + '_ {
        self.functions.keys()
    }
}
