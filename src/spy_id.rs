use std::fmt;

use uuid::Uuid;

/// Unique identifier of a [`Spy`](crate::Spy).
///
/// Two handles refer to the same spy exactly when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpyId(u128);

impl SpyId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4().as_u128())
    }

    #[inline]
    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for SpyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_u128(self.0))
    }
}

/// Lifecycle of a spy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpyState {
    #[default]
    Active,
    /// Terminal. Routing is back to the original delegate and any accessor
    /// replaced by the spy has been put back.
    Restored,
}

impl SpyState {
    pub fn is_active(&self) -> bool {
        matches!(self, SpyState::Active)
    }

    pub fn is_restored(&self) -> bool {
        matches!(self, SpyState::Restored)
    }
}

impl fmt::Display for SpyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpyState::Active => write!(f, "Active"),
            SpyState::Restored => write!(f, "Restored"),
        }
    }
}
