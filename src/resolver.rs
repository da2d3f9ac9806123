// SPDX-License-Identifier: MPL-2.0

//! The backtracking search (§4.F, the heart of this crate): depth-first, semver-aware unit
//! propagation over an [`Assignment`], driven by a [`PackageProvider`] and pruned by
//! [`VersionSet`](version_set::VersionSet) intersection.
//!
//! This is natural recursion, not an explicit frame stack — §9 allows either "when stack depth
//! is bounded by real-world graph size," and one call frame per pending package keeps the
//! implementation a direct transcription of the seven numbered steps in §4.F rather than a
//! hand-rolled continuation stack.

use std::cmp::Reverse;

use log::{debug, info, trace};
use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;

use crate::assignment::Assignment;
use crate::cancel::CancelToken;
use crate::constraint::{Constraint, VS};
use crate::delegate::{Delegate, NoopDelegate};
use crate::error::ResolveError;
use crate::package::PackageId;
use crate::provider::{matching_versions, PackageProvider};
use crate::version::Version;
use crate::witness::UnsatisfiableWitness;

/// A complete assignment: one chosen version per package reached from the roots.
pub type Solution<Id> = FxHashMap<Id, Version>;

/// Programmatic configuration for [`resolve_with`] (SPEC_FULL.md §B: the resolver core takes no
/// files or environment variables — this struct, passed by the caller, is the entire
/// configuration surface).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Cache requirement sets that previously led to every version of a package being rejected,
    /// and skip enumeration entirely for a future frame whose requirement is a subset of one
    /// already known to fail (§9, "Nogood caching").
    pub nogood_cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { nogood_cache: true }
    }
}

/// Resolve `roots` against `provider` with default configuration, no delegate, and no way to
/// cancel — the common case for a one-shot resolution (§6: `resolve(constraints, provider,
/// delegate?, cancel?)` with both optional arguments at their defaults).
pub fn resolve<P: PackageProvider>(
    roots: &[Constraint<P::Id>],
    provider: &P,
) -> Result<Solution<P::Id>, ResolveError<P::Id, P::Err>> {
    resolve_with(
        roots,
        provider,
        &ResolverConfig::default(),
        &mut NoopDelegate,
        &CancelToken::new(),
    )
}

/// Resolve `roots` against `provider`, reporting to `delegate` and honoring `cancel`.
pub fn resolve_with<P: PackageProvider>(
    roots: &[Constraint<P::Id>],
    provider: &P,
    config: &ResolverConfig,
    delegate: &mut dyn Delegate<P::Id>,
    cancel: &CancelToken,
) -> Result<Solution<P::Id>, ResolveError<P::Id, P::Err>> {
    let mut search = Search {
        provider,
        config,
        assignment: Assignment::new(),
        conflict_cache: FxHashMap::default(),
        deepest_conflict: None,
    };
    search.run(roots, delegate, cancel)
}

/// One resolution's mutable state: the [`Assignment`] under construction, the nogood cache, and
/// the deepest conflict witnessed so far (§4.F: "the witness is the set of constraints active at
/// the deepest conflict").
struct Search<'a, P: PackageProvider> {
    provider: &'a P,
    config: &'a ResolverConfig,
    assignment: Assignment<P::Id>,
    /// Requirement sets previously exhausted for a package, each tagged with the recursion depth
    /// at which it was recorded. A nogood is only sound for as long as the bindings it was
    /// derived under remain on the assignment stack, so every entry recorded at depth `>= d` is
    /// purged the moment a frame at depth `d` backtracks (see `invalidate_cache_from`) — otherwise
    /// a nogood learned against one sibling branch's bindings would wrongly prune a later branch
    /// where those bindings no longer hold.
    conflict_cache: FxHashMap<P::Id, Vec<(VS, usize)>>,
    deepest_conflict: Option<(usize, UnsatisfiableWitness<P::Id>)>,
}

enum VisitState {
    Visiting,
    Done,
}

impl<'a, P: PackageProvider> Search<'a, P> {
    fn run(
        &mut self,
        roots: &[Constraint<P::Id>],
        delegate: &mut dyn Delegate<P::Id>,
        cancel: &CancelToken,
    ) -> Result<Solution<P::Id>, ResolveError<P::Id, P::Err>> {
        for root in roots {
            let new = self.assignment.seed(&root.package, &root.versions);
            if new.is_empty() {
                return Err(ResolveError::Unsatisfiable(UnsatisfiableWitness::new(
                    root.package.clone(),
                    vec![root.clone()],
                )));
            }
        }

        if self.decide(delegate, cancel, 0)? {
            self.extract_solution()
        } else {
            let (_, witness) = self
                .deepest_conflict
                .take()
                .expect("search failed without recording a conflict witness");
            Err(ResolveError::Unsatisfiable(witness))
        }
    }

    /// Steps 2-7 of §4.F, one call frame per pending package.
    fn decide(
        &mut self,
        delegate: &mut dyn Delegate<P::Id>,
        cancel: &CancelToken,
        depth: usize,
    ) -> Result<bool, ResolveError<P::Id, P::Err>> {
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let Some(package) = self.select_pending(cancel)? else {
            return Ok(true);
        };

        delegate.will_resolve(&package);
        let requirement = self.assignment.requirement(&package);

        if self.config.nogood_cache {
            let already_failing = self
                .conflict_cache
                .get(&package)
                .is_some_and(|nogoods| nogoods.iter().any(|(failed, _)| requirement.subset_of(failed)));
            if already_failing {
                trace!("{package}: requirement {requirement} subsumed by a known nogood");
                self.record_conflict(depth, package.clone(), vec![Constraint::new(package.clone(), requirement)]);
                return Ok(false);
            }
        }

        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        let versions = self
            .provider
            .versions(&package)
            .map_err(|source| ResolveError::ProviderFailure {
                package: package.clone(),
                source,
            })?
            .ok_or_else(|| ResolveError::UnknownPackage(package.clone()))?;

        // The most recent conflict seen directly in this loop (a candidate of `package` itself
        // was rejected because one of its dependencies folded some other package's requirement to
        // empty, or to a set excluding that package's existing binding). When every candidate is
        // rejected this way, this — not `package`'s own unchanged outer requirement — is the real
        // cause, and is what the post-loop witness/nogood should name.
        let mut last_conflict: Option<(P::Id, VS)> = None;

        for version in matching_versions(&versions, &requirement) {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            let dependencies = self
                .provider
                .dependencies(&package, version)
                .map_err(|source| ResolveError::ProviderFailure {
                    package: package.clone(),
                    source,
                })?;

            for dep in &dependencies {
                if dep.versions.is_empty() {
                    return Err(ResolveError::ForbiddenEmptyDependency {
                        package: package.clone(),
                        version: version.clone(),
                        dependent: dep.package.clone(),
                    });
                }
            }

            match self.assignment.try_bind(&package, version, &dependencies) {
                Err((conflicted, failing_requirement)) => {
                    debug!("{package} {version}: {conflicted} would need {failing_requirement}");
                    delegate.conflict(
                        &Constraint::new(conflicted.clone(), failing_requirement.clone()),
                        "empty after intersecting with an existing requirement",
                    );
                    last_conflict = Some((conflicted, failing_requirement));
                    continue;
                }
                Ok(()) => {
                    info!("{package} -> {version}");
                    delegate.did_resolve(&package, version);
                    if self.decide(delegate, cancel, depth + 1)? {
                        return Ok(true);
                    }
                    trace!("backtracking past {package} {version}");
                    delegate.will_backtrack(&package);
                    self.assignment.undo_last();
                    // Everything cached at or below the frame just undone was derived while this
                    // attempt's bindings were active and can no longer be assumed to hold.
                    if self.config.nogood_cache {
                        self.invalidate_cache_from(depth + 1);
                    }
                }
            }
        }

        // Every candidate for `package` was tried and rejected (§4.F step 7).
        if self.config.nogood_cache {
            self.conflict_cache
                .entry(package.clone())
                .or_default()
                .push((requirement.clone(), depth));
        }
        match last_conflict {
            Some((conflicted, failing_requirement)) => {
                // `package` is the dependent whose candidate needed `failing_requirement` of
                // `conflicted`; name that edge rather than repeating `conflicted` on both sides.
                self.record_conflict(depth, conflicted, vec![Constraint::new(package, failing_requirement)]);
            }
            None => {
                self.record_conflict(depth, package.clone(), vec![Constraint::new(package, requirement)]);
            }
        }
        Ok(false)
    }

    /// Drop every cached nogood recorded at a depth `>= min_depth`: it was computed against
    /// bindings introduced at or below a frame that is now being undone, so it no longer
    /// necessarily holds (see the field doc on `conflict_cache`).
    fn invalidate_cache_from(&mut self, min_depth: usize) {
        self.conflict_cache.retain(|_, nogoods| {
            nogoods.retain(|(_, recorded_depth)| *recorded_depth < min_depth);
            !nogoods.is_empty()
        });
    }

    /// Keep the witness from the deepest conflict reached across the whole search, per §4.F.
    fn record_conflict(&mut self, depth: usize, package: P::Id, constraints: Vec<Constraint<P::Id>>) {
        let deeper_or_equal = self
            .deepest_conflict
            .as_ref()
            .map_or(true, |(recorded_depth, _)| depth >= *recorded_depth);
        if deeper_or_equal {
            self.deepest_conflict = Some((depth, UnsatisfiableWitness::new(package, constraints)));
        }
    }

    /// Most-constrained-variable selection, tie-broken by first-introduction order (§4.F step 2).
    /// Rebuilt from scratch on every call rather than maintained incrementally across
    /// backtracking — `Assignment::pending` and a provider lookup per candidate are cheap enough
    /// at the scale this resolver targets, and a freshly built queue can never go stale.
    fn select_pending(&self, cancel: &CancelToken) -> Result<Option<P::Id>, ResolveError<P::Id, P::Err>> {
        let mut queue: PriorityQueue<P::Id, (Reverse<usize>, Reverse<usize>)> = PriorityQueue::new();
        for (introduction_order, id, requirement) in self.assignment.pending() {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            let versions = self
                .provider
                .versions(id)
                .map_err(|source| ResolveError::ProviderFailure {
                    package: id.clone(),
                    source,
                })?
                .ok_or_else(|| ResolveError::UnknownPackage(id.clone()))?;
            let candidate_count = matching_versions(&versions, requirement).count();
            queue.push(id.clone(), (Reverse(candidate_count), Reverse(introduction_order)));
        }
        Ok(queue.pop().map(|(id, _)| id))
    }

    fn extract_solution(&self) -> Result<Solution<P::Id>, ResolveError<P::Id, P::Err>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(ResolveError::CycleDetected(cycle));
        }
        Ok(self
            .assignment
            .bindings()
            .iter()
            .map(|(id, version)| (id.clone(), version.clone()))
            .collect())
    }

    /// Depth-first cycle detection over the direct-dependency edges recorded for each binding
    /// (§4.F: "cycleDetected(path) if the dependency graph at the chosen versions contains a
    /// cycle among packages").
    fn find_cycle(&self) -> Option<Vec<P::Id>> {
        let edges = self.assignment.edges();
        let mut state: FxHashMap<P::Id, VisitState> = FxHashMap::default();
        let mut path = Vec::new();
        for start in edges.keys() {
            if !state.contains_key(start) {
                if let Some(cycle) = self.visit(start, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit(
        &self,
        node: &P::Id,
        state: &mut FxHashMap<P::Id, VisitState>,
        path: &mut Vec<P::Id>,
    ) -> Option<Vec<P::Id>> {
        state.insert(node.clone(), VisitState::Visiting);
        path.push(node.clone());
        if let Some(children) = self.assignment.edges().get(node) {
            for child in children {
                match state.get(child) {
                    None => {
                        if let Some(cycle) = self.visit(child, state, path) {
                            return Some(cycle);
                        }
                    }
                    Some(VisitState::Visiting) => {
                        let start = path.iter().position(|p| p == child).expect("in-progress node is on the path");
                        let mut cycle = path[start..].to_vec();
                        cycle.push(child.clone());
                        return Some(cycle);
                    }
                    Some(VisitState::Done) => {}
                }
            }
        }
        path.pop();
        state.insert(node.clone(), VisitState::Done);
        None
    }
}
