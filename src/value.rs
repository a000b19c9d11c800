use std::{fmt, future::IntoFuture, sync::Arc};

use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};

use crate::{Callable, Object};

/// A dynamically typed value flowing through objects, callables and spies.
///
/// Objects, functions and deferred values are handles: cloning them is cheap
/// and equality compares identity, not contents.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Object(Object),
    Function(Callable),
    Deferred(Deferred),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Deferred(_) => "deferred",
        }
    }

    /// `undefined` or `null`.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// True for values that cannot carry properties.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Function(_))
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Value::Deferred(d) => Some(d),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(c) => write!(f, "[function {}]", c.name().unwrap_or("(anonymous)")),
            Value::Deferred(_) => write!(f, "[deferred]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Function(c)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}

type SharedValue = Shared<BoxFuture<'static, Value>>;

/// An asynchronous result that has not been resolved yet.
///
/// Spies never poll it: a delegate returning a `Deferred` has it recorded and
/// handed back untouched. The value can be awaited any number of times, from
/// the call log or from the returned value alike.
#[derive(Clone)]
pub struct Deferred {
    inner: Arc<SharedValue>,
}

impl Deferred {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Self {
            inner: Arc::new(future.boxed().shared()),
        }
    }

    /// A deferred value that is already settled.
    pub fn resolved(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(async move { value })
    }

    /// Returns the settled value without waiting, if it is already known.
    pub fn peek(&self) -> Option<Value> {
        self.inner.peek().cloned()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl IntoFuture for Deferred {
    type Output = Value;
    type IntoFuture = SharedValue;

    fn into_future(self) -> Self::IntoFuture {
        (*self.inner).clone()
    }
}

/// A failure raised by a callable, carrying whatever value was thrown.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct Thrown(Value);

impl Thrown {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
