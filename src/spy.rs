use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use crate::{
    AccessKind, CallRecord, CallResult, Callable, Config, Result, SpyId, SpyState, Value,
    interceptor::Installation,
};

/// An instrumented callable.
///
/// Every invocation is appended to the call log and routed to the
/// replacement set with [`will_call`](Spy::will_call), or to the delegate the
/// spy was created with. Failures raised by the delegate are recorded and
/// returned to the caller unchanged.
///
/// `Spy` is a cheap handle: clones observe and control the same spy.
///
/// # Example
///
/// ```rust
/// use spyhole::{Callable, SpyRegistry, Value};
///
/// let registry = SpyRegistry::new();
/// let double = Callable::new("double", |args| {
///     Ok(Value::from(args[0].as_number().unwrap_or(0.0) * 2.0))
/// });
/// let spy = registry.create_spy(Some(double));
///
/// assert_eq!(spy.call(&[Value::from(4)]).unwrap(), Value::from(8));
/// spy.will_call(Callable::new("zero", |_| Ok(Value::from(0))));
/// assert_eq!(spy.call(&[Value::from(4)]).unwrap(), Value::from(0));
///
/// assert_eq!(spy.name(), "double");
/// assert_eq!(spy.call_count(), 2);
/// ```
#[derive(Clone)]
pub struct Spy {
    inner: Arc<SpyInner>,
}

struct SpyInner {
    core: Arc<SpyCore>,
    callable: Callable,
    installation: OnceLock<Installation>,
}

/// Routing and call log shared by the spy handle and its callable.
///
/// The callable holds only this part, so an installed spy never keeps its
/// own handle, installation or target alive.
struct SpyCore {
    id: SpyId,
    name: Arc<str>,
    initial: Option<Callable>,
    routing: Mutex<Routing>,
    calls: Mutex<Vec<CallRecord>>,
}

#[derive(Default)]
struct Routing {
    replacement: Option<Callable>,
    state: SpyState,
}

impl SpyCore {
    fn call(&self, args: &[Value]) -> CallResult {
        let delegate = self.delegate();
        let index = {
            let mut calls = self.calls();
            let index = calls.len();
            calls.push(CallRecord::new(index, args));
            index
        };

        let result = match &delegate {
            Some(delegate) => delegate.call(args),
            None => Ok(Value::Undefined),
        };
        tracing::trace!(spy = %self.name, index, failed = result.is_err(), "Spy called");

        if let Some(record) = self.calls().get_mut(index) {
            record.settle(&result);
        }
        result
    }

    fn delegate(&self) -> Option<Callable> {
        let routing = self.routing.lock().expect("Spy routing lock poisoned");
        routing.replacement.clone().or_else(|| self.initial.clone())
    }

    fn calls(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.calls.lock().expect("Spy call log lock poisoned")
    }
}

impl Spy {
    pub(crate) fn new(initial: Option<Callable>, config: &Config) -> Self {
        let name = config.display_name(initial.as_ref().and_then(Callable::name));
        let core = Arc::new(SpyCore {
            id: SpyId::new(),
            name: name.clone(),
            initial,
            routing: Mutex::new(Routing::default()),
            calls: Mutex::new(Vec::with_capacity(config.call_log_capacity)),
        });
        let target = core.clone();
        Spy {
            inner: Arc::new(SpyInner {
                core,
                callable: Callable::new(name, move |args| target.call(args)),
                installation: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn attach(&self, installation: Installation) {
        let _ = self.inner.installation.set(installation);
    }

    #[inline]
    pub fn id(&self) -> SpyId {
        self.inner.core.id
    }

    /// Display name, derived from the wrapped delegate.
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.core.name
    }

    /// The function value standing in for the intercepted member.
    ///
    /// Calling it is the same as calling [`Spy::call`]; its identity is
    /// stable for the whole life of the spy.
    pub fn callable(&self) -> Callable {
        self.inner.callable.clone()
    }

    /// Invokes the spy, recording the call.
    pub fn call(&self, args: &[Value]) -> CallResult {
        self.inner.core.call(args)
    }

    /// Routes all further invocations to `implementation`.
    ///
    /// Calls recorded so far are kept as they are.
    pub fn will_call(&self, implementation: Callable) -> &Self {
        let mut routing = self.inner.core.routing.lock().expect("Spy routing lock poisoned");
        routing.replacement = Some(implementation);
        self
    }

    /// Puts the spied member back and routes invocations to the original
    /// delegate again.
    ///
    /// For a spy installed by an [`Interceptor`](crate::Interceptor) the
    /// exact descriptor captured at interception time is re-applied to the
    /// object that owned it. The descriptor is re-applied only once, so
    /// repeated sweeps cannot undo a spy layered on top later. Any override
    /// set since the last restore is always discarded.
    pub fn restore(&self) -> Result {
        let core = &self.inner.core;
        if self.is_active() {
            if let Some(installation) = self.inner.installation.get() {
                installation.reinstall()?;
            }
            tracing::debug!(spy = %core.name, id = %core.id, "Spy restored");
        }

        let mut routing = core.routing.lock().expect("Spy routing lock poisoned");
        routing.replacement = None;
        routing.state = SpyState::Restored;
        Ok(())
    }

    /// The behavior the spy was created around.
    ///
    /// For an intercepted member this is the callable found in the original
    /// descriptor. When the member was materialized lazily through a getter,
    /// the getter is invoked again to produce a live original. Bare spies
    /// created without a delegate return `None`.
    pub fn original(&self) -> Result<Option<Callable>> {
        match self.inner.installation.get() {
            Some(installation) => installation.original().map(Some),
            None => Ok(self.inner.core.initial.clone()),
        }
    }

    pub fn state(&self) -> SpyState {
        let routing = self.inner.core.routing.lock().expect("Spy routing lock poisoned");
        routing.state
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Name of the intercepted member, `None` for bare spies.
    pub fn member(&self) -> Option<&str> {
        self.inner.installation.get().map(Installation::name)
    }

    /// Accessor kind replaced on the target, `None` for bare spies.
    pub fn kind(&self) -> Option<AccessKind> {
        self.inner.installation.get().map(Installation::kind)
    }

    /// True when the member was a value materialized through a getter.
    pub fn is_deferred(&self) -> bool {
        self.inner
            .installation
            .get()
            .is_some_and(Installation::is_deferred)
    }

    // ==================== Call log ====================

    /// Snapshot of every recorded call, in invocation order.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.core.calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.core.calls().len()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// The nth recorded call (0-indexed), if any.
    pub fn nth_call(&self, index: usize) -> Option<CallRecord> {
        self.inner.core.calls().get(index).cloned()
    }

    pub fn last_call(&self) -> Option<CallRecord> {
        self.inner.core.calls().last().cloned()
    }
}

impl PartialEq for Spy {
    fn eq(&self, other: &Self) -> bool {
        self.inner.core.id == other.inner.core.id
    }
}

impl Eq for Spy {}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("id", &self.inner.core.id)
            .field("name", &self.inner.core.name)
            .field("state", &self.state())
            .field("calls", &self.call_count())
            .finish()
    }
}
