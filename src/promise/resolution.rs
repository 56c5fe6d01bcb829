//! The candidate-settlement sum type consumed by the resolution algorithm.

use std::fmt;

use super::thenable::Thenable;
use super::Promise;

/// What a promise may be resolved with, or what a reaction handler may
/// produce.
///
/// The original algorithm probes an arbitrary dynamic value for a callable
/// `then` property; here the distinction is carried in the type. `Value`
/// fulfills directly, `Promise` and `Foreign` are adopted (the target takes
/// on their eventual outcome), and `Reject` is the typed stand-in for a
/// handler raising an error.
pub enum Resolution<T, E> {
    /// A plain value: fulfill directly, no adoption step.
    Value(T),
    /// Another promise of the same kind: adopt its eventual outcome.
    Promise(Promise<T, E>),
    /// A foreign future-like object: adopt via [`Thenable::subscribe`],
    /// one scheduler job later.
    Foreign(Box<dyn Thenable<T, E>>),
    /// An immediate rejection with the given reason.
    Reject(E),
}

impl<T, E> Resolution<T, E> {
    /// Wraps a foreign thenable.
    pub fn foreign(thenable: impl Thenable<T, E> + 'static) -> Self {
        Self::Foreign(Box::new(thenable))
    }
}

/// `Ok` resolves with the value, `Err` rejects with the reason.
impl<T, E> From<Result<T, E>> for Resolution<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(reason) => Self::Reject(reason),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Promise(promise) => f.debug_tuple("Promise").field(promise).finish(),
            Self::Foreign(_) => f.write_str("Foreign(..)"),
            Self::Reject(reason) => f.debug_tuple("Reject").field(reason).finish(),
        }
    }
}
