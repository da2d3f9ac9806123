// SPDX-License-Identifier: MPL-2.0

//! Caller-owned cancellation (§5: "Cancellation is delivered via a cancellation token the caller
//! owns").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable handle a caller can trip from another thread (a timeout timer, a UI
/// "stop" button) to ask an in-flight [`resolve`](crate::resolve) call to return
/// [`ResolveError::Cancelled`](crate::error::ResolveError::Cancelled) promptly.
///
/// The resolver checks the token before each *select* step and before each provider call (§5); it
/// never checks it mid-computation of `VersionSet` algebra, since those are not suspension
/// points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that starts out not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
