//! Spyhole - spies and member interception for test doubles
//!
//! Replace a method, getter or setter of an object with a [`Spy`] that
//! records every call and can substitute behavior, then put the exact
//! original back with [`Spy::restore`].
//!
//! # Example
//!
//! ```rust
//! use spyhole::{AccessorSelector, Callable, Object, PropertyDescriptor, Value, spy_on};
//!
//! let obj = Object::new();
//! obj.define(
//!     "value",
//!     PropertyDescriptor::getter(Callable::getter("value", || Ok(Value::from(42)))),
//! )?;
//!
//! let mock = Callable::getter("mock", || Ok(Value::from(99)));
//! let spy = spy_on(&obj.clone().into(), AccessorSelector::getter("value"), Some(mock))?;
//! assert_eq!(obj.get("value")?, Value::from(99));
//!
//! spy.restore()?;
//! assert_eq!(obj.get("value")?, Value::from(42));
//! assert_eq!(spy.call_count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod call_record;
mod callable;
mod config;
mod descriptor;
mod error;
mod interceptor;
mod object;
mod registry;
mod selector;
mod spy;
mod spy_id;
mod value;

pub use call_record::{CallOutcome, CallRecord};
pub use callable::{CallResult, Callable};
pub use config::Config;
pub use descriptor::{AccessKind, PropertyDescriptor};
pub use error::{Error, ErrorKind};
pub use interceptor::{Interceptor, create_spy, spy_on};
pub use object::{HostObject, Object, PlainObject};
pub use registry::SpyRegistry;
pub use selector::AccessorSelector;
pub use spy::Spy;
pub use spy_id::{SpyId, SpyState};
pub use value::{Deferred, Thrown, Value};

pub type Result<T = ()> = std::result::Result<T, Error>;
