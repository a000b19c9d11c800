use std::{fmt, sync::Arc};

use crate::{AccessKind, Thrown};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Could not find an object to spy upon")]
    MissingTarget,

    #[error("Cannot spy on a primitive value ({0})")]
    PrimitiveTarget(&'static str),

    #[error("'{0}' does not exist")]
    MemberNotFound(Arc<str>),

    #[error("'{name}' has no {kind} to intercept")]
    AccessorNotFound { name: Arc<str>, kind: AccessKind },

    #[error("'{0}' is not a function")]
    NotCallable(Arc<str>),

    #[error("'{0}' is not declared configurable")]
    NotConfigurable(Arc<str>),

    #[error("Callable raised an error: {0}")]
    Thrown(#[from] Thrown),
}

/// Broad class of an [`Error`].
///
/// Setup mistakes (`Argument`, `Lookup`, `Permission`) are raised before the
/// target is touched. `Runtime` carries a failure raised by user code that
/// ran during interception, such as a lazily materializing getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Argument,
    Lookup,
    Permission,
    Runtime,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingTarget | Error::PrimitiveTarget(_) => ErrorKind::Argument,
            Error::MemberNotFound(_) | Error::AccessorNotFound { .. } | Error::NotCallable(_) => {
                ErrorKind::Lookup
            }
            Error::NotConfigurable(_) => ErrorKind::Permission,
            Error::Thrown(_) => ErrorKind::Runtime,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Argument => write!(f, "ArgumentError"),
            ErrorKind::Lookup => write!(f, "LookupError"),
            ErrorKind::Permission => write!(f, "PermissionError"),
            ErrorKind::Runtime => write!(f, "RuntimeError"),
        }
    }
}
