use std::sync::{Arc, Mutex, OnceLock};

use crate::{Callable, Config, Spy};

/// Collection of every spy created through it.
///
/// Spies register themselves on creation and are never removed. The registry
/// only enumerates them: sweeping them (for instance restoring every active
/// spy after a test) is left to the test framework.
///
/// Registries are cheap handles. Use [`SpyRegistry::global`] for the
/// process-wide one, or [`SpyRegistry::new`] for an isolated collection.
///
/// # Example
///
/// ```rust
/// use spyhole::SpyRegistry;
///
/// let registry = SpyRegistry::new();
/// let spy = registry.create_spy(None);
/// spy.call(&[]).unwrap();
///
/// for spy in registry.active() {
///     spy.restore().unwrap();
/// }
/// assert!(registry.active().is_empty());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SpyRegistry {
    spies: Arc<Mutex<Vec<Spy>>>,
}

static GLOBAL: OnceLock<SpyRegistry> = OnceLock::new();

impl SpyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`spy_on`](crate::spy_on) and
    /// [`create_spy`](crate::create_spy).
    pub fn global() -> &'static SpyRegistry {
        GLOBAL.get_or_init(SpyRegistry::new)
    }

    /// Wraps `initial` in a new spy with the default [`Config`] and
    /// registers it.
    ///
    /// Use [`create_spy_with`](SpyRegistry::create_spy_with), or an
    /// [`Interceptor`](crate::Interceptor) carrying a config, to change the
    /// default name or call-log capacity.
    pub fn create_spy(&self, initial: Option<Callable>) -> Spy {
        self.create_spy_with(initial, &Config::default())
    }

    /// Wraps `initial` in a new spy configured by `config` and registers it.
    pub fn create_spy_with(&self, initial: Option<Callable>, config: &Config) -> Spy {
        let spy = Spy::new(initial, config);
        self.register(spy.clone());
        spy
    }

    pub(crate) fn register(&self, spy: Spy) {
        tracing::trace!(spy = %spy.name(), id = %spy.id(), "Spy registered");
        let mut spies = self.spies.lock().expect("SpyRegistry lock poisoned");
        spies.push(spy);
    }

    /// Every registered spy, in creation order.
    pub fn spies(&self) -> Vec<Spy> {
        let spies = self.spies.lock().expect("SpyRegistry lock poisoned");
        spies.clone()
    }

    /// Registered spies that have not been restored yet.
    pub fn active(&self) -> Vec<Spy> {
        self.spies()
            .into_iter()
            .filter(Spy::is_active)
            .collect()
    }

    pub fn len(&self) -> usize {
        let spies = self.spies.lock().expect("SpyRegistry lock poisoned");
        spies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
