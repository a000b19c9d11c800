use std::fmt;

use crate::{Callable, Value};

/// Which access path of a member is intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    /// Direct value, i.e. a method.
    Value,
    Getter,
    Setter,
}

impl AccessKind {
    pub fn is_accessor(&self) -> bool {
        !matches!(self, AccessKind::Value)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Value => write!(f, "value"),
            AccessKind::Getter => write!(f, "getter"),
            AccessKind::Setter => write!(f, "setter"),
        }
    }
}

/// Metadata describing how a named member is stored on an object.
///
/// A data descriptor holds a value and its writability; an accessor
/// descriptor holds an optional getter and an optional setter. Accessors
/// have no notion of writability at all.
#[derive(Debug, Clone)]
pub enum PropertyDescriptor {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Callable>,
        set: Option<Callable>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data {
            value: value.into(),
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Writable, configurable, non-enumerable function property, the way
    /// methods are usually laid out.
    pub fn method(callable: Callable) -> Self {
        Self::Data {
            value: Value::Function(callable),
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    pub fn accessor(get: Option<Callable>, set: Option<Callable>) -> Self {
        Self::Accessor {
            get,
            set,
            enumerable: false,
            configurable: true,
        }
    }

    pub fn getter(get: Callable) -> Self {
        Self::accessor(Some(get), None)
    }

    pub fn setter(set: Callable) -> Self {
        Self::accessor(None, Some(set))
    }

    pub fn with_configurable(mut self, flag: bool) -> Self {
        match &mut self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => {
                *configurable = flag
            }
        }
        self
    }

    pub fn with_enumerable(mut self, flag: bool) -> Self {
        match &mut self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable = flag,
        }
        self
    }

    /// No-op for accessor descriptors.
    pub fn with_writable(mut self, flag: bool) -> Self {
        if let Self::Data { writable, .. } = &mut self {
            *writable = flag;
        }
        self
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    /// `None` for accessor descriptors, which cannot carry the attribute.
    pub fn writable(&self) -> Option<bool> {
        match self {
            Self::Data { writable, .. } => Some(*writable),
            Self::Accessor { .. } => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    pub fn get(&self) -> Option<&Callable> {
        match self {
            Self::Accessor { get, .. } => get.as_ref(),
            Self::Data { .. } => None,
        }
    }

    pub fn set(&self) -> Option<&Callable> {
        match self {
            Self::Accessor { set, .. } => set.as_ref(),
            Self::Data { .. } => None,
        }
    }

    /// The callable occupying the slot of the given kind, if any.
    ///
    /// For [`AccessKind::Value`] this is the stored value, provided it is a
    /// function.
    pub fn slot(&self, kind: AccessKind) -> Option<&Callable> {
        match kind {
            AccessKind::Value => self.value().and_then(Value::as_callable),
            AccessKind::Getter => self.get(),
            AccessKind::Setter => self.set(),
        }
    }

    /// Builds a copy of this descriptor with the `kind` slot pointing at
    /// `callable`. Every other attribute is kept.
    ///
    /// Filling an accessor slot always yields an accessor descriptor, so a
    /// `writable` attribute never survives the switch. The paired accessor of
    /// the opposite kind is carried over unchanged.
    pub fn replace_slot(&self, kind: AccessKind, callable: Callable) -> Self {
        let enumerable = self.is_enumerable();
        let configurable = self.is_configurable();
        match kind {
            AccessKind::Value => Self::Data {
                value: Value::Function(callable),
                writable: self.writable().unwrap_or(true),
                enumerable,
                configurable,
            },
            AccessKind::Getter => Self::Accessor {
                get: Some(callable),
                set: self.set().cloned(),
                enumerable,
                configurable,
            },
            AccessKind::Setter => Self::Accessor {
                get: self.get().cloned(),
                set: Some(callable),
                enumerable,
                configurable,
            },
        }
    }

    /// Same kind, same flags, same value and callable identities.
    pub fn same_as(&self, other: &PropertyDescriptor) -> bool {
        match (self, other) {
            (
                Self::Data {
                    value: v1,
                    writable: w1,
                    enumerable: e1,
                    configurable: c1,
                },
                Self::Data {
                    value: v2,
                    writable: w2,
                    enumerable: e2,
                    configurable: c2,
                },
            ) => v1 == v2 && w1 == w2 && e1 == e2 && c1 == c2,
            (
                Self::Accessor {
                    get: g1,
                    set: s1,
                    enumerable: e1,
                    configurable: c1,
                },
                Self::Accessor {
                    get: g2,
                    set: s2,
                    enumerable: e2,
                    configurable: c2,
                },
            ) => same_slot(g1, g2) && same_slot(s1, s2) && e1 == e2 && c1 == c2,
            _ => false,
        }
    }
}

fn same_slot(a: &Option<Callable>, b: &Option<Callable>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.ptr_eq(b),
        (None, None) => true,
        _ => false,
    }
}
