// SPDX-License-Identifier: MPL-2.0

//! The version type manipulated throughout this crate.
//!
//! Rather than reimplement SemVer 2.0 precedence (numeric vs. alphanumeric pre-release
//! identifiers, build metadata ignored for ordering, etc.) we reuse the `semver` crate, whose
//! `Version` already orders exactly the way section 3 of the resolver's data model requires.

use std::fmt;

use thiserror::Error;

/// A parsed semantic version: `major.minor.patch[-prerelease][+build]`.
///
/// Ordering is total: numeric precedence on `(major, minor, patch)`, then pre-release identifiers
/// (a version with a pre-release always precedes the same triple with none), build metadata is
/// ignored.
pub type Version = semver::Version;

/// The version failed to parse as `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
#[derive(Debug, Clone, Error)]
#[error("malformed version {text:?}: {reason}")]
pub struct MalformedVersion {
    /// The offending substring as given by the caller.
    pub text: String,
    reason: String,
}

impl MalformedVersion {
    fn new(text: &str, source: semver::Error) -> Self {
        Self {
            text: text.to_string(),
            reason: source.to_string(),
        }
    }
}

/// Parse a version from text, per §4.A.
///
/// Rejects leading zeros in numeric identifiers and empty identifiers, same as the underlying
/// `semver` parser.
pub fn parse(text: &str) -> Result<Version, MalformedVersion> {
    Version::parse(text).map_err(|source| MalformedVersion::new(text, source))
}

/// `0.0.0`, the lowest version any fixture's pool needs as a default lower bound.
pub fn zero() -> Version {
    Version::new(0, 0, 0)
}
