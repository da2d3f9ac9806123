// SPDX-License-Identifier: MPL-2.0

//! The resolver's working state (§3 "Assignment", §4.F "decision frame"): bindings, accumulated
//! requirements, the direct-dependency edges recorded for each binding, and the undo records that
//! let the search backtrack in `O(|delta|)` instead of recomputing from scratch.

use indexmap::IndexMap;

use crate::constraint::{Constraint, VS};
use crate::package::PackageId;
use crate::version::Version;

/// One tentative binding plus everything needed to undo it.
///
/// `requirement_deltas` records, for every package whose `requirements` entry changed while
/// folding in this frame's dependencies, what it was before: `Some(previous)` to restore it,
/// `None` if the package was mentioned here for the first time and should be forgotten entirely
/// on undo.
struct Frame<Id: PackageId> {
    package: Id,
    requirement_deltas: Vec<(Id, Option<VS>)>,
}

/// Bindings, requirements, and the undo stack of decision frames (§3, §4.F).
///
/// `requirements` is an [`IndexMap`] rather than a hash map for a reason beyond iteration speed:
/// its insertion order *is* the "first-introduction order" §4.F step 2 tie-breaks selection on,
/// with no extra bookkeeping required.
pub(crate) struct Assignment<Id: PackageId> {
    bindings: IndexMap<Id, Version>,
    requirements: IndexMap<Id, VS>,
    edges: IndexMap<Id, Vec<Id>>,
    frames: Vec<Frame<Id>>,
}

impl<Id: PackageId> Assignment<Id> {
    pub(crate) fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
            requirements: IndexMap::new(),
            edges: IndexMap::new(),
            frames: Vec::new(),
        }
    }

    pub(crate) fn is_bound(&self, package: &Id) -> bool {
        self.bindings.contains_key(package)
    }

    pub(crate) fn requirement(&self, package: &Id) -> VS {
        self.requirements.get(package).cloned().unwrap_or_else(VS::any)
    }

    /// Every package currently mentioned in `requirements` but not yet bound, in first-introduction
    /// order.
    pub(crate) fn pending(&self) -> impl Iterator<Item = (usize, &Id, &VS)> {
        let bindings = &self.bindings;
        self.requirements
            .iter()
            .enumerate()
            .filter(move |(_, (id, _))| !bindings.contains_key(*id))
            .map(|(idx, (id, vs))| (idx, id, vs))
    }

    pub(crate) fn bindings(&self) -> &IndexMap<Id, Version> {
        &self.bindings
    }

    pub(crate) fn edges(&self) -> &IndexMap<Id, Vec<Id>> {
        &self.edges
    }

    /// Intersect `package`'s requirement with `with`, recording the prior value in `deltas` if it
    /// changes. Returns the new requirement.
    fn fold(&mut self, package: &Id, with: &VS, deltas: &mut Vec<(Id, Option<VS>)>) -> VS {
        match self.requirements.get(package) {
            Some(existing) => {
                let new = existing.intersect(with);
                deltas.push((package.clone(), Some(existing.clone())));
                self.requirements.insert(package.clone(), new.clone());
                new
            }
            None => {
                deltas.push((package.clone(), None));
                self.requirements.insert(package.clone(), with.clone());
                with.clone()
            }
        }
    }

    /// Seed a root constraint `(package, requirement)` before any binding has been made. Returns
    /// the resulting requirement; an empty result is an unconditional `Unsatisfiable` (§4.F step
    /// 1), not a local conflict, since there is no frame to backtrack into yet.
    pub(crate) fn seed(&mut self, package: &Id, requirement: &VS) -> VS {
        let mut deltas = Vec::new();
        self.fold(package, requirement, &mut deltas)
        // Root seeding is not undoable and not part of any frame; it simply becomes the starting
        // state every frame is pushed on top of.
    }

    /// Attempt to bind `package` to `version` and fold `dependencies` into the assignment.
    ///
    /// On success, pushes a frame and records `edges[package]` for cycle detection. On conflict —
    /// an empty intersection, or a dependency on an already-bound package outside the new
    /// requirement — undoes every delta applied so far in this attempt and returns the offending
    /// `(package, requirement)` pair as the local witness.
    pub(crate) fn try_bind(
        &mut self,
        package: &Id,
        version: &Version,
        dependencies: &[Constraint<Id>],
    ) -> Result<(), (Id, VS)> {
        let mut deltas = Vec::new();
        let mut edge_ids = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            edge_ids.push(dep.package.clone());
            let new = self.fold(&dep.package, &dep.versions, &mut deltas);
            let rejected = if new.is_empty() {
                true
            } else if let Some(bound_version) = self.bindings.get(&dep.package) {
                !new.contains(bound_version)
            } else {
                false
            };
            if rejected {
                self.undo_deltas(deltas);
                return Err((dep.package.clone(), new));
            }
        }
        self.bindings.insert(package.clone(), version.clone());
        self.edges.insert(package.clone(), edge_ids);
        self.frames.push(Frame {
            package: package.clone(),
            requirement_deltas: deltas,
        });
        Ok(())
    }

    /// Undo the most recent frame, dropping its binding and restoring every requirement it
    /// touched. Panics if there is no frame, which would indicate a bug in the search loop.
    pub(crate) fn undo_last(&mut self) {
        let frame = self.frames.pop().expect("undo_last called with no frame to undo");
        self.bindings.shift_remove(&frame.package);
        self.edges.shift_remove(&frame.package);
        self.undo_deltas(frame.requirement_deltas);
    }

    fn undo_deltas(&mut self, deltas: Vec<(Id, Option<VS>)>) {
        for (package, previous) in deltas.into_iter().rev() {
            match previous {
                Some(vs) => {
                    self.requirements.insert(package, vs);
                }
                None => {
                    self.requirements.shift_remove(&package);
                }
            }
        }
    }
}
