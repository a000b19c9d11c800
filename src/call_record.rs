use std::sync::Arc;

use crate::{CallResult, Thrown, Value};

/// What a recorded invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The delegate is still running. Only visible from re-entrant calls.
    Pending,
    Returned(Value),
    Threw(Thrown),
}

/// A single invocation of a spy.
///
/// # Fields
///
/// - `index`: position in the spy's call log, counting from zero
/// - `arguments`: the exact arguments passed
/// - `outcome`: the returned value or the raised failure
#[derive(Debug, Clone)]
pub struct CallRecord {
    index: usize,
    arguments: Arc<[Value]>,
    outcome: CallOutcome,
}

impl CallRecord {
    pub(crate) fn new(index: usize, arguments: &[Value]) -> Self {
        Self {
            index,
            arguments: arguments.into(),
            outcome: CallOutcome::Pending,
        }
    }

    pub(crate) fn settle(&mut self, result: &CallResult) {
        self.outcome = match result {
            Ok(value) => CallOutcome::Returned(value.clone()),
            Err(thrown) => CallOutcome::Threw(thrown.clone()),
        };
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    #[inline]
    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    /// The returned value, if the call completed normally.
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Returned(value) => Some(value),
            _ => None,
        }
    }

    /// The raised failure, if the call failed.
    pub fn error(&self) -> Option<&Thrown> {
        match &self.outcome {
            CallOutcome::Threw(thrown) => Some(thrown),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CallOutcome::Threw(_))
    }
}
