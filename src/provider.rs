// SPDX-License-Identifier: MPL-2.0

//! The catalog capability the resolver consumes (§4.E), plus two concrete implementations: an
//! in-memory [`OfflineProvider`] for tests and small embedded catalogs, and a [`CachingProvider`]
//! decorator that adds the single-flight caching §5 asks of any provider used concurrently.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::constraint::{Constraint, VS};
use crate::package::PackageId;
use crate::version::Version;

/// Lazy catalog: given a package identifier, yields its available versions and, for any chosen
/// version, its direct dependencies.
///
/// `getContainer`/`Container` from §4.E are flattened here into two methods directly on the
/// trait — `versions` plays the role of `getContainer(id).versions()` and `dependencies` the
/// role of `getContainer(id).getDependencies(version)` — since nothing in this crate needs to
/// hold a `Container` handle open between the two calls.
pub trait PackageProvider {
    /// How this provider names packages.
    type Id: PackageId;

    /// The error a lookup can fail with. Surfaced to the caller as
    /// [`ResolveError::ProviderFailure`](crate::error::ResolveError::ProviderFailure); never a
    /// local conflict.
    type Err: StdError + 'static;

    /// All versions of `id` this provider knows about, in descending order. `Ok(None)` means the
    /// package is entirely unknown (→ `ResolveError::UnknownPackage`), as distinct from
    /// `Ok(Some(&[]))`, which means the package is known but currently has no published
    /// versions (→ an ordinary local conflict wherever it is required).
    ///
    /// The returned slice is conceptually a restartable iterator the resolver indexes into
    /// explicitly (§9: "Model as a restartable iterator over an immutable, provider-owned
    /// vector"); implementations are expected to cache it after the first call, which is why the
    /// return type is reference-counted.
    fn versions(&self, id: &Self::Id) -> Result<Option<Arc<[Version]>>, Self::Err>;

    /// The direct dependencies of `id` at `version`. Deterministic: same inputs, same output,
    /// every time (§4.E).
    fn dependencies(
        &self,
        id: &Self::Id,
        version: &Version,
    ) -> Result<Vec<Constraint<Self::Id>>, Self::Err>;
}

/// Whether `set` mentions a pre-release version anywhere in its bounds — used to decide whether
/// pre-releases are in play for a given requirement (SPEC_FULL.md §C.2: a pre-release only
/// participates when something asked for that specific pre-release line).
fn mentions_prerelease(set: &VS) -> bool {
    set.iter().any(|(lo, hi)| bound_is_prerelease(lo) || bound_is_prerelease(hi))
}

fn bound_is_prerelease(bound: &Bound<Version>) -> bool {
    match bound {
        Bound::Included(v) | Bound::Excluded(v) => !v.pre.is_empty(),
        Bound::Unbounded => false,
    }
}

/// Versions of `id` matching `requirement`, newest first, applying the default pre-release
/// policy: a pre-release is only a candidate when `requirement` itself names a pre-release.
pub fn matching_versions<'a>(
    all: &'a [Version],
    requirement: &'a VS,
) -> impl Iterator<Item = &'a Version> + 'a {
    let allow_prerelease = mentions_prerelease(requirement);
    all.iter()
        .filter(move |v| (allow_prerelease || v.pre.is_empty()) && requirement.contains(v))
}

/// A basic, in-memory [`PackageProvider`].
///
/// Mirrors how most resolver test suites build mock graphs: register every package/version pair
/// and its dependencies up front, then hand the provider to [`crate::resolve`].
#[derive(Debug, Clone, Default)]
pub struct OfflineProvider<Id: PackageId> {
    packages: IndexMap<Id, BTreeMap<Version, Vec<Constraint<Id>>>>,
}

impl<Id: PackageId> OfflineProvider<Id> {
    /// An empty provider with no registered packages.
    pub fn new() -> Self {
        Self {
            packages: IndexMap::new(),
        }
    }

    /// Register `package`'s dependencies at `version`. A second call for the same pair replaces
    /// the first — there is no incremental "add one more dependency" API, so that
    /// [`dependencies`](PackageProvider::dependencies) can promise it always returns the complete
    /// set.
    pub fn add(
        &mut self,
        package: Id,
        version: Version,
        dependencies: impl IntoIterator<Item = Constraint<Id>>,
    ) {
        self.packages
            .entry(package)
            .or_default()
            .insert(version, dependencies.into_iter().collect());
    }

    /// Every package this provider has at least one version registered for.
    pub fn packages(&self) -> impl Iterator<Item = &Id> {
        self.packages.keys()
    }
}

impl<Id: PackageId> PackageProvider for OfflineProvider<Id> {
    type Id = Id;
    type Err = std::convert::Infallible;

    fn versions(&self, id: &Id) -> Result<Option<Arc<[Version]>>, Self::Err> {
        Ok(self
            .packages
            .get(id)
            .map(|versions| versions.keys().rev().cloned().collect::<Vec<_>>().into()))
    }

    fn dependencies(&self, id: &Id, version: &Version) -> Result<Vec<Constraint<Id>>, Self::Err> {
        Ok(self
            .packages
            .get(id)
            .and_then(|versions| versions.get(version))
            .cloned()
            .unwrap_or_default())
    }
}

/// Wraps any [`PackageProvider`] with a cache so that repeat lookups for the same package (or
/// package/version pair) hit memory instead of re-running the wrapped provider — the §3
/// "cached on first query" and §5 "guard those caches... per-key single-flight" requirements for
/// a provider whose underlying lookups are not free (network, disk).
///
/// The lock is held for the duration of a cache-miss computation, which gives concurrent callers
/// asking for the same key the single-flight behavior §5 asks for: they block on the same mutex
/// rather than duplicating the underlying work.
pub struct CachingProvider<P: PackageProvider> {
    inner: P,
    versions_cache: Mutex<IndexMap<P::Id, Arc<[Version]>>>,
    #[allow(clippy::type_complexity)]
    dependencies_cache: Mutex<IndexMap<(P::Id, Version), Arc<Vec<Constraint<P::Id>>>>>,
}

impl<P: PackageProvider> CachingProvider<P> {
    /// Wrap `inner` with an initially empty cache.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            versions_cache: Mutex::new(IndexMap::new()),
            dependencies_cache: Mutex::new(IndexMap::new()),
        }
    }
}

impl<P: PackageProvider> PackageProvider for CachingProvider<P> {
    type Id = P::Id;
    type Err = P::Err;

    fn versions(&self, id: &Self::Id) -> Result<Option<Arc<[Version]>>, Self::Err> {
        let mut cache = self.versions_cache.lock().unwrap();
        if let Some(hit) = cache.get(id) {
            return Ok(Some(hit.clone()));
        }
        match self.inner.versions(id)? {
            None => Ok(None),
            Some(versions) => {
                cache.insert(id.clone(), versions.clone());
                Ok(Some(versions))
            }
        }
    }

    fn dependencies(
        &self,
        id: &Self::Id,
        version: &Version,
    ) -> Result<Vec<Constraint<Self::Id>>, Self::Err> {
        let key = (id.clone(), version.clone());
        let mut cache = self.dependencies_cache.lock().unwrap();
        if let Some(hit) = cache.get(&key) {
            return Ok((**hit).clone());
        }
        let dependencies = Arc::new(self.inner.dependencies(id, version)?);
        cache.insert(key, dependencies.clone());
        Ok((*dependencies).clone())
    }
}
