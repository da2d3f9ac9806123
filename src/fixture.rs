// SPDX-License-Identifier: MPL-2.0

//! The JSON mock-graph fixture format of spec §6, as a first-class, feature-gated
//! [`PackageProvider`] rather than ad hoc test-only parsing — the "JSON-fixture provider" promised
//! alongside [`OfflineProvider`] by SPEC_FULL.md §A. The resolver core itself never sees JSON: this
//! module only builds the same [`OfflineProvider`] a caller could have constructed by hand.
//!
//! ```text
//! {
//!   "containers": [
//!     { "name": "<id>", "versions": { "<version>": [ { "container": "<id>", "requirement": "<set>" }, ... ] } }
//!   ],
//!   "constraints": [ { "container": "<id>", "requirement": "<set>" } ],
//!   "result": { "<id>": "<version>", ... }
//! }
//! ```
//!
//! Requirement atoms are `"any"`, `"=X.Y.Z"`, or `"X.Y.Z..<A.B.C"`; a requirement may also be a
//! JSON array of atoms, unioned together (spec §6: "Version sets in fixtures are either ... or a
//! list for unions").

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::constraint::{Constraint, VS};
use crate::provider::OfflineProvider;
use crate::version::{self, MalformedVersion, Version};

/// Everything that can go wrong loading a fixture: malformed JSON, or a version/requirement atom
/// that does not parse. Kept separate from [`ResolveError`](crate::ResolveError) since it is a
/// loading-time failure, not a resolution-time one (§7 distinguishes fatal provider errors from
/// the format a particular provider happens to be built from).
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture text was not valid JSON, or did not match the expected shape.
    #[error("malformed fixture: {0}")]
    Json(#[from] serde_json::Error),

    /// A version embedded in the fixture failed to parse.
    #[error(transparent)]
    Version(#[from] MalformedVersion),

    /// A requirement atom was neither `"any"`, `"=X.Y.Z"`, nor `"X.Y.Z..<A.B.C"`.
    #[error("unrecognized requirement atom {0:?}")]
    UnrecognizedRequirement(String),
}

#[derive(Debug, Deserialize)]
struct Fixture {
    containers: Vec<FixtureContainer>,
    #[serde(default)]
    constraints: Vec<FixtureDependency>,
    #[serde(default)]
    result: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct FixtureContainer {
    name: String,
    versions: BTreeMap<String, Vec<FixtureDependency>>,
}

#[derive(Debug, Deserialize)]
struct FixtureDependency {
    container: String,
    requirement: RequirementSpec,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequirementSpec {
    Single(String),
    Union(Vec<String>),
}

fn parse_atom(text: &str) -> Result<VS, FixtureError> {
    if text == "any" {
        return Ok(VS::any());
    }
    if let Some(exact) = text.strip_prefix('=') {
        return Ok(VS::exact(version::parse(exact)?));
    }
    if let Some((lo, hi)) = text.split_once("..<") {
        return Ok(VS::range(version::parse(lo)?, version::parse(hi)?));
    }
    Err(FixtureError::UnrecognizedRequirement(text.to_string()))
}

fn parse_requirement(spec: &RequirementSpec) -> Result<VS, FixtureError> {
    match spec {
        RequirementSpec::Single(text) => parse_atom(text),
        RequirementSpec::Union(texts) => {
            let mut set = VS::empty();
            for text in texts {
                set = set.union(&parse_atom(text)?);
            }
            Ok(set)
        }
    }
}

/// The result of loading a fixture: a ready-to-use provider, the root constraints to resolve, and
/// (if the fixture declared one) the expected solution, keyed by package name to version text,
/// with an empty map meaning "expected unsatisfiable."
#[derive(Debug, Clone)]
pub struct LoadedFixture {
    /// The in-memory catalog built from the fixture's `containers`.
    pub provider: OfflineProvider<String>,
    /// The fixture's `constraints`, ready to pass to [`resolve`](crate::resolve).
    pub roots: Vec<Constraint<String>>,
    /// The fixture's `result`, if present.
    pub expected: Option<BTreeMap<String, String>>,
}

impl LoadedFixture {
    /// The expected solution's versions, parsed, for comparing directly against a [`Solution`
    /// ](crate::Solution).
    pub fn expected_versions(&self) -> Option<Result<BTreeMap<String, Version>, MalformedVersion>> {
        self.expected.as_ref().map(|expected| {
            expected
                .iter()
                .map(|(name, text)| version::parse(text).map(|v| (name.clone(), v)))
                .collect()
        })
    }
}

/// Parse a fixture and build the provider, roots, and expected solution it describes.
pub fn load(json: &str) -> Result<LoadedFixture, FixtureError> {
    let fixture: Fixture = serde_json::from_str(json)?;
    let mut provider = OfflineProvider::<String>::new();
    for container in &fixture.containers {
        for (version_text, deps) in &container.versions {
            let version = version::parse(version_text)?;
            let mut dependencies = Vec::with_capacity(deps.len());
            for dep in deps {
                dependencies.push(Constraint::new(dep.container.clone(), parse_requirement(&dep.requirement)?));
            }
            provider.add(container.name.clone(), version, dependencies);
        }
    }
    let mut roots = Vec::with_capacity(fixture.constraints.len());
    for dep in &fixture.constraints {
        roots.push(Constraint::new(dep.container.clone(), parse_requirement(&dep.requirement)?));
    }
    Ok(LoadedFixture {
        provider,
        roots,
        expected: fixture.result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_trivial_fan_out() {
        let json = r#"
        {
            "containers": [
                { "name": "a", "versions": { "1.0.0": [] } }
            ],
            "constraints": [ { "container": "a", "requirement": "any" } ],
            "result": { "a": "1.0.0" }
        }
        "#;
        let fixture = load(json).unwrap();
        assert_eq!(fixture.roots.len(), 1);
        let solution = crate::resolve(&fixture.roots, &fixture.provider).unwrap();
        let expected = fixture.expected_versions().unwrap().unwrap();
        assert_eq!(solution, expected.into_iter().collect());
    }

    #[test]
    fn union_requirement_parses_to_two_atoms() {
        let json = r#"
        {
            "containers": [ { "name": "lib", "versions": { "1.0.0": [], "2.0.0": [] } } ],
            "constraints": [ { "container": "lib", "requirement": ["=1.0.0", "=2.0.0"] } ]
        }
        "#;
        let fixture = load(json).unwrap();
        assert!(fixture.roots[0].versions.contains(&version::parse("1.0.0").unwrap()));
        assert!(fixture.roots[0].versions.contains(&version::parse("2.0.0").unwrap()));
    }

    #[test]
    fn rejects_unrecognized_atom() {
        let json = r#"
        {
            "containers": [],
            "constraints": [ { "container": "a", "requirement": "~>1.0.0" } ]
        }
        "#;
        assert!(matches!(load(json), Err(FixtureError::UnrecognizedRequirement(_))));
    }

    #[test]
    fn rejects_malformed_version() {
        let json = r#"
        {
            "containers": [ { "name": "a", "versions": { "not-a-version": [] } } ],
            "constraints": []
        }
        "#;
        assert!(matches!(load(json), Err(FixtureError::Version(_))));
    }
}
