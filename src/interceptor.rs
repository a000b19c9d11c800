use std::sync::Arc;

use crate::{
    AccessKind, AccessorSelector, Callable, Config, Error, Object, PropertyDescriptor, Result,
    Spy, SpyRegistry, Value,
};

/// Replaces members of objects with spies.
///
/// - Resolve the member on the target or the nearest prototype owning it.
/// - Wrap the original behavior (or a supplied mock) in a [`Spy`].
/// - Install the spy in place of the original accessor, on the same owner.
///
/// Every spy is registered into the interceptor's [`SpyRegistry`].
/// [`Spy::restore`] puts the original descriptor back verbatim.
///
/// # Example
///
/// ```rust
/// use spyhole::{Callable, Interceptor, Object, PropertyDescriptor, SpyRegistry, Value};
///
/// let obj = Object::new();
/// let greet = Callable::new("greet", |_| Ok(Value::from("hi")));
/// obj.define("greet", PropertyDescriptor::method(greet.clone())).unwrap();
///
/// let interceptor = Interceptor::new(SpyRegistry::new());
/// let spy = interceptor.intercept(&obj.clone().into(), "greet", None).unwrap();
///
/// assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hi"));
/// assert_eq!(spy.call_count(), 1);
///
/// spy.restore().unwrap();
/// assert_eq!(obj.get("greet").unwrap(), Value::from(greet));
/// ```
#[derive(Clone)]
pub struct Interceptor {
    registry: SpyRegistry,
    config: Arc<Config>,
}

impl Interceptor {
    pub fn new(registry: SpyRegistry) -> Self {
        Self {
            registry,
            config: Arc::new(Config::default()),
        }
    }

    /// Interceptor registering into [`SpyRegistry::global`].
    pub fn global() -> Self {
        Self::new(SpyRegistry::global().clone())
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn registry(&self) -> &SpyRegistry {
        &self.registry
    }

    /// Wraps a bare callable in a registered spy.
    pub fn create_spy(&self, initial: Option<Callable>) -> Spy {
        self.registry.create_spy_with(initial, &self.config)
    }

    /// Replaces the member named by `selector` with a spy.
    ///
    /// The spy delegates to `mock` when given, otherwise to the original
    /// behavior. Its expected shape follows the selector: no arguments for a
    /// getter, one value for a setter, the method's own signature otherwise.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTarget`] if `target` is `undefined` or `null`
    /// - [`Error::PrimitiveTarget`] if `target` cannot carry properties
    /// - [`Error::MemberNotFound`] if neither the target nor its prototypes
    ///   define the member
    /// - [`Error::AccessorNotFound`] / [`Error::NotCallable`] if the member
    ///   has nothing callable in the selected slot
    /// - [`Error::NotConfigurable`] if the member is not configurable
    /// - [`Error::Thrown`] if a lazily materializing getter fails
    ///
    /// All of these are raised before the target is modified.
    pub fn intercept(
        &self,
        target: &Value,
        selector: impl Into<AccessorSelector>,
        mock: Option<Callable>,
    ) -> Result<Spy> {
        let object = host_of(target)?;
        let selector = selector.into();
        let resolution = Resolution::resolve(&object, &selector)?;
        let name = selector.name().clone();

        let delegate = mock.unwrap_or_else(|| resolution.effective.clone());
        let spy = Spy::new(Some(delegate), &self.config);

        let replacement = if resolution.deferred {
            let callable = spy.callable();
            Callable::getter(format!("get {name}"), move || {
                Ok(Value::Function(callable.clone()))
            })
        } else {
            spy.callable()
        };
        let installed = resolution
            .descriptor
            .replace_slot(resolution.kind, replacement);
        resolution.owner.define(&name, installed)?;

        let owner = if resolution.owner.ptr_eq(&object) {
            "own"
        } else {
            "prototype"
        };
        tracing::debug!(
            member = %name,
            kind = %resolution.kind,
            owner,
            deferred = resolution.deferred,
            spy = %spy.id(),
            "Spy installed"
        );

        spy.attach(Installation {
            owner: resolution.owner,
            name,
            descriptor: resolution.descriptor,
            kind: resolution.kind,
            origin: resolution.origin,
            deferred: resolution.deferred,
        });
        self.registry.register(spy.clone());
        Ok(spy)
    }
}

/// Intercepts a member using the process-wide registry.
///
/// See [`Interceptor::intercept`].
pub fn spy_on(
    target: &Value,
    selector: impl Into<AccessorSelector>,
    mock: Option<Callable>,
) -> Result<Spy> {
    Interceptor::global().intercept(target, selector, mock)
}

/// Creates a spy registered in the process-wide registry.
pub fn create_spy(initial: Option<Callable>) -> Spy {
    Interceptor::global().create_spy(initial)
}

/// The property bag a target value exposes.
fn host_of(target: &Value) -> Result<Object> {
    match target {
        Value::Object(object) => Ok(object.clone()),
        Value::Function(callable) => Ok(callable.properties().clone()),
        other if other.is_absent() => Err(Error::MissingTarget),
        other => Err(Error::PrimitiveTarget(other.type_name())),
    }
}

/// Where a selected member lives and what stands behind it.
struct Resolution {
    owner: Object,
    descriptor: PropertyDescriptor,
    /// Slot that will receive the spy.
    kind: AccessKind,
    /// Callable found in that slot.
    origin: Callable,
    /// Behavior the spy delegates to when no mock is given.
    effective: Callable,
    /// A value member backed by a getter.
    deferred: bool,
}

impl Resolution {
    fn resolve(object: &Object, selector: &AccessorSelector) -> Result<Self> {
        let name = selector.name();
        let (owner, descriptor) = object
            .find_descriptor(name)
            .ok_or_else(|| Error::MemberNotFound(name.clone()))?;
        if !descriptor.is_configurable() {
            return Err(Error::NotConfigurable(name.clone()));
        }

        let mut kind = selector.kind();
        let deferred =
            kind == AccessKind::Value && descriptor.value().is_none() && descriptor.get().is_some();
        if deferred {
            kind = AccessKind::Getter;
        }

        let origin = match descriptor.slot(kind) {
            Some(origin) => origin.clone(),
            None if kind == AccessKind::Value && descriptor.value().is_some() => {
                return Err(Error::NotCallable(name.clone()));
            }
            None => {
                return Err(Error::AccessorNotFound {
                    name: name.clone(),
                    kind,
                });
            }
        };

        let effective = if deferred {
            materialize(&origin, name)?
        } else {
            origin.clone()
        };

        Ok(Self {
            owner,
            descriptor,
            kind,
            origin,
            effective,
            deferred,
        })
    }
}

/// Runs a getter expected to produce a function.
fn materialize(getter: &Callable, name: &Arc<str>) -> Result<Callable> {
    match getter.call(&[])? {
        Value::Function(callable) => Ok(callable),
        _ => Err(Error::NotCallable(name.clone())),
    }
}

/// Record of a member replaced by a spy, enough to undo the replacement.
pub(crate) struct Installation {
    owner: Object,
    name: Arc<str>,
    descriptor: PropertyDescriptor,
    kind: AccessKind,
    origin: Callable,
    deferred: bool,
}

impl Installation {
    /// Re-applies the captured descriptor to the object that owned it.
    pub(crate) fn reinstall(&self) -> Result {
        self.owner.define(&self.name, self.descriptor.clone())?;
        tracing::debug!(member = %self.name, kind = %self.kind, "Original accessor reinstalled");
        Ok(())
    }

    pub(crate) fn original(&self) -> Result<Callable> {
        if self.deferred {
            materialize(&self.origin, &self.name)
        } else {
            Ok(self.origin.clone())
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> AccessKind {
        self.kind
    }

    pub(crate) fn is_deferred(&self) -> bool {
        self.deferred
    }
}
