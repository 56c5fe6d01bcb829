//! Error values produced by the promise machinery.
//!
//! The error surface is deliberately small. Promises reject with a caller
//! chosen reason type `E`; the machinery itself only ever needs to
//! synthesize one distinguished reason, [`SelfResolution`], so the reason
//! type carries the bound `E: From<SelfResolution>`. A `thiserror` enum
//! with a `#[from]` variant satisfies it in one line.
//!
//! Everything else in the original error taxonomy collapses under typed
//! construction:
//!
//! - Misuse that a dynamic host reports at the call site (a non-callable
//!   initiation function, chaining on a non-promise receiver, a missing
//!   scheduler) is unrepresentable here; the signatures do not admit it.
//! - Failures inside the machinery (a fallible initiation function, a
//!   foreign thenable failing to subscribe, a handler signalling an error)
//!   are always converted into a rejection of the appropriate promise and
//!   never escape as panics.

use thiserror::Error;

/// A promise was resolved with itself.
///
/// Adopting one's own outcome can never settle, so the resolution
/// algorithm converts the attempt into a rejection carrying this value.
/// Reason types opt in via `From`:
///
/// ```
/// use promissory::SelfResolution;
///
/// #[derive(Debug, Clone, thiserror::Error)]
/// enum AppError {
///     #[error("request failed: {0}")]
///     Request(String),
///     #[error(transparent)]
///     Cycle(#[from] SelfResolution),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("promise resolved with itself")]
pub struct SelfResolution;
