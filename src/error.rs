// SPDX-License-Identifier: MPL-2.0

//! The error taxonomy of §7. Local conflicts (empty intersection, exhausted alternatives at a
//! non-root frame) are deliberately *not* represented here — they are control-flow signals
//! internal to the search and only crystallize into [`ResolveError::Unsatisfiable`] once the root
//! frame itself exhausts.

use std::error::Error as StdError;

use thiserror::Error;

use crate::package::PackageId;
use crate::version::Version;
use crate::witness::UnsatisfiableWitness;

/// Every way [`resolve`](crate::resolve) can fail.
#[derive(Debug, Error)]
pub enum ResolveError<Id: PackageId, E: StdError + 'static> {
    /// The search exhausted every alternative at the root without finding a solution.
    #[error("no solution: {0}")]
    Unsatisfiable(UnsatisfiableWitness<Id>),

    /// The dependency graph at the chosen versions contains a cycle among bound packages.
    /// Rejected by policy rather than resolved as a fixed point (§9, Open Questions).
    #[error("dependency cycle: {}", cycle_path(.0))]
    CycleDetected(Vec<Id>),

    /// A root or transitive constraint named a package the provider has never heard of.
    #[error("unknown package {0}")]
    UnknownPackage(Id),

    /// The provider's `getContainer` or `getDependencies` call failed.
    #[error("provider failed to load {package}: {source}")]
    ProviderFailure {
        /// The package whose data could not be loaded.
        package: Id,
        /// The underlying error from the provider.
        #[source]
        source: E,
    },

    /// A provider returned dependencies for a package/version pair naming an empty
    /// [`VersionSet`](version_set::VersionSet) — the dependency could never be satisfied by
    /// construction, which is always a mistake on the provider's part rather than a normal
    /// conflict.
    #[error("{package} {version} depends on {dependent} with an empty version set")]
    ForbiddenEmptyDependency {
        /// The package whose dependency is malformed.
        package: Id,
        /// The version of `package` at fault.
        version: Version,
        /// The dependency named with an empty set.
        dependent: Id,
    },

    /// The caller's [`CancelToken`](crate::cancel::CancelToken) was tripped.
    #[error("resolution cancelled")]
    Cancelled,
}

fn cycle_path<Id: PackageId>(path: &[Id]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
