//! Interop with foreign future-like objects.

use super::resolution::Resolution;
use super::Promise;
use crate::error::SelfResolution;

/// Callback handed to a thenable for resolving the adopting promise.
///
/// Accepts a full [`Resolution`] so a thenable may itself resolve with
/// another promise or thenable; the algorithm re-enters and keeps
/// flattening.
pub type ResolveFn<T, E> = Box<dyn FnOnce(Resolution<T, E>)>;

/// Callback handed to a thenable for rejecting the adopting promise.
pub type RejectFn<E> = Box<dyn FnOnce(E)>;

/// A foreign future-like object whose outcome a promise can adopt.
///
/// This is the typed replacement for duck-typed `then` probing: anything
/// that can deliver exactly one resolution-or-rejection implements it and
/// can be fed to the resolution algorithm through
/// [`Resolution::Foreign`].
///
/// The adopting side guards both callbacks with one shared settle-once
/// latch, so a misbehaving implementation that invokes both (or whose
/// synchronous `Err` return follows a callback invocation) has no effect
/// beyond the first signal. `subscribe` itself is only ever invoked from a
/// scheduler job, never from inside the resolution call.
pub trait Thenable<T, E> {
    /// Registers the adoption callbacks, consuming the thenable.
    ///
    /// A synchronous `Err` rejects the adopting promise, unless one of the
    /// callbacks was already invoked.
    fn subscribe(
        self: Box<Self>,
        on_resolve: ResolveFn<T, E>,
        on_reject: RejectFn<E>,
    ) -> Result<(), E>;
}

/// A promise is itself thenable: subscription is reaction registration.
impl<T, E> Thenable<T, E> for Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
{
    fn subscribe(
        self: Box<Self>,
        on_resolve: ResolveFn<T, E>,
        on_reject: RejectFn<E>,
    ) -> Result<(), E> {
        self.register(
            Box::new(move |value| on_resolve(Resolution::Value(value))),
            on_reject,
        );
        Ok(())
    }
}
