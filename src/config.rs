use std::sync::Arc;

/// Configuration for spies created by an [`Interceptor`](crate::Interceptor).
///
/// Use the builder methods to customize, or [`Default`] for the usual
/// behavior.
///
/// # Examples
///
/// ```rust
/// use spyhole::Config;
///
/// let config = Config::default()
///     .with_default_name("double")     // Label for anonymous delegates
///     .with_call_log_capacity(64);     // Pre-size logs of hot spies
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name given to spies whose delegate has no name.
    /// Default: "spy"
    pub default_name: Arc<str>,

    /// Naming prefix of partially applied functions. It is stripped from the
    /// delegate's name before it becomes the spy's display name.
    /// Default: "bound "
    pub bound_prefix: Arc<str>,

    /// Number of call records each spy allocates up front.
    /// Default: 8
    pub call_log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_name: "spy".into(),
            bound_prefix: "bound ".into(),
            call_log_capacity: 8,
        }
    }
}

impl Config {
    pub fn with_default_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.default_name = name.into();
        self
    }

    pub fn with_bound_prefix(mut self, prefix: impl Into<Arc<str>>) -> Self {
        self.bound_prefix = prefix.into();
        self
    }

    pub fn with_call_log_capacity(mut self, capacity: usize) -> Self {
        self.call_log_capacity = capacity;
        self
    }

    /// Derives a spy's display name from its delegate's reported name.
    pub(crate) fn display_name(&self, name: Option<&str>) -> Arc<str> {
        match name {
            Some(name) => {
                let name = name.strip_prefix(&*self.bound_prefix).unwrap_or(name);
                if name.is_empty() {
                    self.default_name.clone()
                } else {
                    name.into()
                }
            }
            None => self.default_name.clone(),
        }
    }
}
