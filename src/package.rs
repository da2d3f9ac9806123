// SPDX-License-Identifier: MPL-2.0

//! Trait for identifying packages.
//! Automatically implemented for any type already implementing
//! [Clone] + [Eq] + [Hash] + [Ord] + [Debug] + [Display](std::fmt::Display).

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// An opaque, hashable, totally-ordered package identifier (§3: "`PackageId` is an opaque,
/// hashable, totally-ordered identifier supplied by the provider").
///
/// The `Ord` bound is the one addition over a plain name-like type: it gives the resolver a
/// deterministic tie-break (§4.F step 2, "Break ties by the package's first-introduction order")
/// without requiring providers to hand out explicit sequence numbers.
///
/// Automatically implemented for any type that already implements
/// [Clone] + [Eq] + [Hash] + [Ord] + [Debug] + [Display].
pub trait PackageId: Clone + Eq + Hash + Ord + Debug + Display {}

impl<T: Clone + Eq + Hash + Ord + Debug + Display> PackageId for T {}
