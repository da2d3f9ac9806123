// SPDX-License-Identifier: MPL-2.0

//! Observability hooks into the search (§4.G). Side-effect only: a [`Delegate`] never influences
//! which version gets picked, only what the caller gets told about the picking.

use crate::constraint::Constraint;
use crate::package::PackageId;

/// Observer notified of the resolver's decisions, backtracks, and conflicts.
///
/// Every method has a no-op default so an implementor only needs to override the hooks it cares
/// about. Implementations must not mutate resolver state — there is none exposed to mutate — and
/// should be cheap, since `will_resolve`/`did_resolve` fire once per package in the final solution
/// and `will_backtrack` can fire many times in a single resolution.
pub trait Delegate<Id: PackageId> {
    /// About to pick a version for `package`.
    fn will_resolve(&mut self, _package: &Id) {}

    /// `package` was tentatively bound to `version`.
    fn did_resolve(&mut self, _package: &Id, _version: &semver::Version) {}

    /// Backtracking past the most recent decision for `package` because a later frame failed.
    fn will_backtrack(&mut self, _package: &Id) {}

    /// `constraint` could not be satisfied; `reason` is a short human-readable explanation.
    fn conflict(&mut self, _constraint: &Constraint<Id>, _reason: &str) {}
}

/// A [`Delegate`] that observes nothing. The default when a caller has no use for the hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelegate;

impl<Id: PackageId> Delegate<Id> for NoopDelegate {}
