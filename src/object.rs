use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, RwLock},
};

use crate::{CallResult, Error, PropertyDescriptor, Result, Thrown, Value};

/// Property storage the interceptor reads from and writes to.
///
/// Implementations own the descriptors; callers only read them and replace
/// them wholesale. Redefinition must honour configurability the way
/// [`PlainObject`] does.
pub trait HostObject: Send + Sync {
    /// The descriptor stored directly on this object, if any.
    fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor>;

    /// Creates or replaces the named property.
    fn define_descriptor(&self, name: &str, descriptor: PropertyDescriptor) -> Result;

    fn prototype(&self) -> Option<Object>;

    fn own_keys(&self) -> Vec<Arc<str>>;
}

/// A cheap, identity-comparable handle to a [`HostObject`].
#[derive(Clone)]
pub struct Object {
    host: Arc<dyn HostObject>,
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Empty object without a prototype.
    pub fn new() -> Self {
        Self::from_host(PlainObject::new(None))
    }

    pub fn with_prototype(prototype: &Object) -> Self {
        Self::from_host(PlainObject::new(Some(prototype.clone())))
    }

    pub fn from_host(host: impl HostObject + 'static) -> Self {
        Self {
            host: Arc::new(host),
        }
    }

    pub fn prototype(&self) -> Option<Object> {
        self.host.prototype()
    }

    pub fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.host.own_descriptor(name)
    }

    pub fn own_keys(&self) -> Vec<Arc<str>> {
        self.host.own_keys()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.own_descriptor(name).is_some()
    }

    pub fn define(&self, name: &str, descriptor: PropertyDescriptor) -> Result {
        self.host.define_descriptor(name, descriptor)
    }

    /// Finds the nearest descriptor for `name` along the prototype chain,
    /// together with the object that owns it.
    ///
    /// A chain that loops back on itself ends at the first repeated object.
    pub fn find_descriptor(&self, name: &str) -> Option<(Object, PropertyDescriptor)> {
        let mut visited: Vec<Object> = Vec::new();
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if visited.iter().any(|seen| seen.ptr_eq(&object)) {
                tracing::warn!(member = name, "Cyclic prototype chain");
                break;
            }
            if let Some(descriptor) = object.own_descriptor(name) {
                return Some((object, descriptor));
            }
            current = object.prototype();
            visited.push(object);
        }
        None
    }

    /// Reads a property: the stored value, or the getter's result.
    ///
    /// Missing members and accessors without a getter read as `undefined`.
    pub fn get(&self, name: &str) -> CallResult {
        match self.find_descriptor(name) {
            Some((_, PropertyDescriptor::Data { value, .. })) => Ok(value),
            Some((_, PropertyDescriptor::Accessor { get: Some(get), .. })) => get.call(&[]),
            Some((_, PropertyDescriptor::Accessor { get: None, .. })) | None => {
                Ok(Value::Undefined)
            }
        }
    }

    /// Writes a property.
    ///
    /// Setters are invoked wherever they live on the chain. Writable data
    /// found on a prototype is shadowed by a new own property, leaving the
    /// prototype untouched.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> std::result::Result<(), Thrown> {
        let value = value.into();
        match self.find_descriptor(name) {
            Some((_, PropertyDescriptor::Accessor { set: Some(set), .. })) => {
                set.call(&[value])?;
                Ok(())
            }
            Some((_, PropertyDescriptor::Accessor { set: None, .. })) => Err(Thrown::new(format!(
                "Cannot set property {name} which has only a getter"
            ))),
            Some((_, PropertyDescriptor::Data {
                writable: false, ..
            })) => Err(Thrown::new(format!(
                "Cannot assign to read only property '{name}'"
            ))),
            Some((owner, PropertyDescriptor::Data {
                writable: true,
                enumerable,
                configurable,
                ..
            })) if owner.ptr_eq(self) => self
                .define(
                    name,
                    PropertyDescriptor::Data {
                        value,
                        writable: true,
                        enumerable,
                        configurable,
                    },
                )
                .map_err(|e| Thrown::new(e.to_string())),
            Some(_) | None => self
                .define(name, PropertyDescriptor::data(value))
                .map_err(|e| Thrown::new(e.to_string())),
        }
    }

    /// Reads `name` and invokes it with `args`.
    pub fn call(&self, name: &str, args: &[Value]) -> CallResult {
        match self.get(name)? {
            Value::Function(f) => f.call(args),
            other => Err(Thrown::new(format!(
                "{name} is not a function (got {})",
                other.type_name()
            ))),
        }
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.host, &other.host)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.own_keys())
            .finish_non_exhaustive()
    }
}

/// The default [`HostObject`]: a property table plus a fixed prototype.
pub struct PlainObject {
    properties: RwLock<BTreeMap<Arc<str>, PropertyDescriptor>>,
    prototype: Option<Object>,
}

impl PlainObject {
    pub fn new(prototype: Option<Object>) -> Self {
        Self {
            properties: RwLock::new(BTreeMap::new()),
            prototype,
        }
    }
}

impl HostObject for PlainObject {
    fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        let properties = self.properties.read().expect("PlainObject lock poisoned");
        properties.get(name).cloned()
    }

    fn define_descriptor(&self, name: &str, descriptor: PropertyDescriptor) -> Result {
        let mut properties = self.properties.write().expect("PlainObject lock poisoned");
        if let Some(current) = properties.get(name) {
            if !current.is_configurable() && !is_compatible(current, &descriptor) {
                return Err(Error::NotConfigurable(name.into()));
            }
        }
        properties.insert(name.into(), descriptor);
        Ok(())
    }

    fn prototype(&self) -> Option<Object> {
        self.prototype.clone()
    }

    fn own_keys(&self) -> Vec<Arc<str>> {
        let properties = self.properties.read().expect("PlainObject lock poisoned");
        properties.keys().cloned().collect()
    }
}

/// Whether `next` may replace the non-configurable `current`.
fn is_compatible(current: &PropertyDescriptor, next: &PropertyDescriptor) -> bool {
    if next.is_configurable() || next.is_enumerable() != current.is_enumerable() {
        return false;
    }
    match (current, next) {
        (
            PropertyDescriptor::Data {
                writable: true, ..
            },
            PropertyDescriptor::Data { .. },
        ) => true,
        (
            PropertyDescriptor::Data {
                writable: false,
                value: current_value,
                ..
            },
            PropertyDescriptor::Data {
                writable: next_writable,
                value: next_value,
                ..
            },
        ) => !next_writable && current_value == next_value,
        (PropertyDescriptor::Accessor { .. }, PropertyDescriptor::Accessor { .. }) => {
            current.same_as(next)
        }
        _ => false,
    }
}
