// SPDX-License-Identifier: MPL-2.0

//! A backtracking dependency resolver core: given a set of root version constraints and a way to
//! enumerate packages and their per-version dependencies, computes a self-consistent assignment
//! of one concrete version per required package, or proves that none exists.
//!
//! # Basic example
//!
//! ```
//! use version_solve::{resolve, Constraint, OfflineProvider, VS};
//!
//! let mut provider = OfflineProvider::<&str>::new();
//! provider.add("root", version("1.0.0"), [
//!     Constraint::new("menu", VS::range(version("1.0.0"), version("2.0.0"))),
//!     Constraint::new("icons", VS::range(version("1.0.0"), version("2.0.0"))),
//! ]);
//! provider.add("menu", version("1.0.0"), [
//!     Constraint::new("dropdown", VS::range(version("1.0.0"), version("2.0.0"))),
//! ]);
//! provider.add("dropdown", version("1.0.0"), [
//!     Constraint::new("icons", VS::range(version("1.0.0"), version("2.0.0"))),
//! ]);
//! provider.add("icons", version("1.0.0"), []);
//!
//! let roots = [Constraint::new("root", VS::exact(version("1.0.0")))];
//! let solution = resolve(&roots, &provider).unwrap();
//! assert_eq!(solution.len(), 4);
//!
//! fn version(text: &str) -> version_solve::Version {
//!     version_solve::version::parse(text).unwrap()
//! }
//! ```
//!
//! # Providers
//!
//! [`OfflineProvider`] is an in-memory catalog built up front, good for tests and small embedded
//! catalogs. Implement [`PackageProvider`] directly for a catalog backed by the network or disk,
//! and wrap it in [`CachingProvider`] to get the per-key caching §5 of the design asks of any
//! provider used concurrently. With the default `serde` feature, [`fixture::load`] builds an
//! [`OfflineProvider`] straight from the mock-graph JSON format test suites in this space tend to
//! use.
//!
//! # Errors and conflicts
//!
//! [`resolve`] returns [`ResolveError::Unsatisfiable`] carrying an [`UnsatisfiableWitness`] when
//! no assignment exists; the witness renders as a short, human-readable explanation via its
//! `Display` impl. Every other failure mode — an unknown package, a provider I/O failure, a
//! cycle, cancellation — is a distinct [`ResolveError`] variant rather than a single opaque
//! error, so callers can match on what actually went wrong.
//!
//! # Observability
//!
//! Pass a [`Delegate`] implementation to [`resolve_with`] to observe decisions, backtracks, and
//! conflicts programmatically. Independently, this crate logs through the `log` facade — wire up
//! `env_logger` or any other subscriber to see a textual trace of the search.

#![warn(missing_docs)]

mod assignment;
mod cancel;
mod constraint;
mod delegate;
mod error;
#[cfg(feature = "serde")]
pub mod fixture;
mod package;
mod provider;
mod resolver;
pub mod version;
mod witness;

pub use cancel::CancelToken;
pub use constraint::{Constraint, VS};
pub use delegate::{Delegate, NoopDelegate};
pub use error::ResolveError;
#[cfg(feature = "serde")]
pub use fixture::{FixtureError, LoadedFixture};
pub use package::PackageId;
pub use provider::{matching_versions, CachingProvider, OfflineProvider, PackageProvider};
pub use resolver::{resolve, resolve_with, ResolverConfig, Solution};
pub use version::{MalformedVersion, Version};
pub use witness::UnsatisfiableWitness;
