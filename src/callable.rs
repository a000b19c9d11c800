use std::{fmt, sync::Arc};

use crate::{Object, Thrown, Value};

/// Outcome of invoking a [`Callable`].
pub type CallResult = std::result::Result<Value, Thrown>;

type Body = dyn Fn(&[Value]) -> CallResult + Send + Sync;

/// A shared function value.
///
/// Cloning a `Callable` yields the same function: [`ptr_eq`](Callable::ptr_eq)
/// and `Value` equality compare identity. Each callable also owns a property
/// bag, so a function can carry static members of its own.
///
/// # Example
///
/// ```rust
/// use spyhole::{Callable, Value};
///
/// let add = Callable::new("add", |args| {
///     let sum: f64 = args.iter().filter_map(Value::as_number).sum();
///     Ok(Value::from(sum))
/// });
/// let inc = add.bind(vec![Value::from(1)]);
///
/// assert_eq!(inc.name(), Some("bound add"));
/// assert_eq!(inc.call(&[Value::from(41)]).unwrap(), Value::from(42));
/// ```
#[derive(Clone)]
pub struct Callable {
    inner: Arc<CallableInner>,
}

struct CallableInner {
    name: Option<Arc<str>>,
    body: Box<Body>,
    properties: Object,
}

impl Callable {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::build(Some(name.into()), Box::new(body))
    }

    pub fn anonymous<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::build(None, Box::new(body))
    }

    /// A no-argument callable, the shape expected of property getters.
    pub fn getter<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn() -> CallResult + Send + Sync + 'static,
    {
        Self::new(name, move |_| body())
    }

    /// A single-argument callable, the shape expected of property setters.
    /// A missing argument is passed as `undefined`.
    pub fn setter<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(Value) -> std::result::Result<(), Thrown> + Send + Sync + 'static,
    {
        Self::new(name, move |args| {
            body(args.first().cloned().unwrap_or_default())?;
            Ok(Value::Undefined)
        })
    }

    fn build(name: Option<Arc<str>>, body: Box<Body>) -> Self {
        Self {
            inner: Arc::new(CallableInner {
                name,
                body,
                properties: Object::new(),
            }),
        }
    }

    /// The reported name, `None` for anonymous functions.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref().filter(|n| !n.is_empty())
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> CallResult {
        (self.inner.body)(args)
    }

    /// Returns a new callable with `args` prepended to every invocation.
    ///
    /// The result is named `"bound <name>"`.
    pub fn bind(&self, args: Vec<Value>) -> Callable {
        let target = self.clone();
        let name = format!("bound {}", self.name().unwrap_or_default());
        Callable::new(name, move |rest| {
            let mut full = Vec::with_capacity(args.len() + rest.len());
            full.extend_from_slice(&args);
            full.extend_from_slice(rest);
            target.call(&full)
        })
    }

    /// Static members of this function.
    pub fn properties(&self) -> &Object {
        &self.inner.properties
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable")
            .field(&self.name().unwrap_or("(anonymous)"))
            .finish()
    }
}
