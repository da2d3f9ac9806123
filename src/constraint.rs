// SPDX-License-Identifier: MPL-2.0

//! A constraint is one edge's demand on a target package (§3, §4.C).

use std::fmt;

use version_set::VersionSet;

use crate::package::PackageId;
use crate::version::Version;

/// The set of versions this crate's resolver reasons about: a [`VersionSet`] specialized to
/// [`Version`].
pub type VS = VersionSet<Version>;

/// A pair `(package, versions)`: "`package` must resolve to a version in `versions`."
///
/// Pure value type; equality and hashing follow the derived field-wise implementation, matching
/// §4.C ("Equality and hashing by `(PackageId, VersionSet)`").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint<Id: PackageId> {
    /// The package this constraint names.
    pub package: Id,
    /// The set of versions of `package` this constraint admits.
    pub versions: VS,
}

impl<Id: PackageId> Constraint<Id> {
    /// Build a constraint from a package and a version set.
    pub fn new(package: Id, versions: VS) -> Self {
        Self { package, versions }
    }
}

impl<Id: PackageId> fmt::Display for Constraint<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package, self.versions)
    }
}
