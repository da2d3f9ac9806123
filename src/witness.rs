// SPDX-License-Identifier: MPL-2.0

//! The conflict witness returned on `Unsatisfiable` (§4.F "Conflict witness", supplemented per
//! SPEC_FULL.md §C.3 with a human-readable rendering — the flat analogue of the teacher's
//! `DefaultStringReporter`, scaled to this spec's non-derivation-tree witness shape).

use std::fmt;

use crate::constraint::Constraint;
use crate::package::PackageId;

/// The minimal set of constraints active at the deepest conflict reached during search: enough
/// to point a human at the two (or more) incompatible edges that made resolution fail.
#[derive(Debug, Clone)]
pub struct UnsatisfiableWitness<Id: PackageId> {
    /// The package whose requirements became unsatisfiable.
    pub package: Id,
    /// Every constraint that was folded into `package`'s requirements before it went empty, in
    /// the order they were introduced.
    pub constraints: Vec<Constraint<Id>>,
}

impl<Id: PackageId> UnsatisfiableWitness<Id> {
    pub(crate) fn new(package: Id, constraints: Vec<Constraint<Id>>) -> Self {
        Self {
            package,
            constraints,
        }
    }
}

impl<Id: PackageId> fmt::Display for UnsatisfiableWitness<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraints.as_slice() {
            [] => write!(f, "no versions of {} satisfy the empty set", self.package),
            [only] => write!(
                f,
                "because {} requires {} of {}, which does not exist",
                only.package, only.versions, self.package
            ),
            constraints => {
                write!(f, "because ")?;
                for (idx, c) in constraints.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "{} requires {} of {}", c.package, c.versions, self.package)?;
                }
                write!(
                    f,
                    ", every version of {} is excluded",
                    self.package
                )
            }
        }
    }
}
