use std::{fmt, sync::Arc};

use crate::AccessKind;

/// Names the member to intercept and which of its access paths.
///
/// A bare name selects a method. Getters and setters must be tagged
/// explicitly: a property may carry both, and a setter may exist without a
/// getter, so the intent is never inferred.
///
/// ```rust
/// use spyhole::{AccessKind, AccessorSelector};
///
/// let method: AccessorSelector = "greet".into();
/// assert_eq!(method.kind(), AccessKind::Value);
/// assert_eq!(AccessorSelector::setter("value").kind(), AccessKind::Setter);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessorSelector {
    Method(Arc<str>),
    Getter(Arc<str>),
    Setter(Arc<str>),
}

impl AccessorSelector {
    pub fn method(name: impl Into<Arc<str>>) -> Self {
        Self::Method(name.into())
    }

    pub fn getter(name: impl Into<Arc<str>>) -> Self {
        Self::Getter(name.into())
    }

    pub fn setter(name: impl Into<Arc<str>>) -> Self {
        Self::Setter(name.into())
    }

    pub fn name(&self) -> &Arc<str> {
        match self {
            Self::Method(name) | Self::Getter(name) | Self::Setter(name) => name,
        }
    }

    pub fn kind(&self) -> AccessKind {
        match self {
            Self::Method(_) => AccessKind::Value,
            Self::Getter(_) => AccessKind::Getter,
            Self::Setter(_) => AccessKind::Setter,
        }
    }
}

impl From<&str> for AccessorSelector {
    fn from(name: &str) -> Self {
        Self::Method(name.into())
    }
}

impl From<String> for AccessorSelector {
    fn from(name: String) -> Self {
        Self::Method(name.into())
    }
}

impl From<Arc<str>> for AccessorSelector {
    fn from(name: Arc<str>) -> Self {
        Self::Method(name)
    }
}

impl fmt::Display for AccessorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(name) => write!(f, "{name}"),
            Self::Getter(name) => write!(f, "get {name}"),
            Self::Setter(name) => write!(f, "set {name}"),
        }
    }
}
