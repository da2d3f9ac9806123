// SPDX-License-Identifier: MPL-2.0

//! A performance-oriented type for canonicalized sets of ordered values.
//!
//! [`VersionSet`] represents selectors such as `(>=1, <2) OR (==3) OR (>4)`. Internally it is an
//! ordered list of disjoint intervals (segments) with inclusive, exclusive, or open-ended bounds,
//! similar to a `Vec<(Bound<T>, Bound<T>)>` that is kept normalized after every operation.
//!
//! Build one from the primitive constructors and combine them with [`intersect`](VersionSet::intersect)
//! and [`union`](VersionSet::union):
//!  - [`empty()`](VersionSet::empty): no value at all
//!  - [`any()`](VersionSet::any): every value
//!  - [`exact(v)`](VersionSet::exact): only `v`
//!  - [`range(lo, hi)`](VersionSet::range): `lo <= x < hi`
//!  - [`strictly_lower_than(v)`](VersionSet::strictly_lower_than) / [`higher_than(v)`](VersionSet::higher_than)
//!
//! `VersionSet` is generic over any `Ord + Clone` type, not just package versions: it is the same
//! interval algebra a resolver needs for version ranges, reused here without version-specific
//! assumptions baked in.
//!
//! Note that equality has a subtlety shared with any Bound-based interval type: given a
//! `VersionSet<u32>`, the segments `(Unbounded, Included(42))` and `(Included(0), Included(42))`
//! are reported unequal even though they describe the same `u32`s, because we cannot know there is
//! nothing below `0`.

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Bound::{self, Excluded, Included, Unbounded};

#[cfg(any(feature = "proptest", test))]
use proptest::prelude::*;
use smallvec::{smallvec, SmallVec};

/// A canonicalized, disjoint set of intervals over `V`.
///
/// Two sets that describe the same values always normalize to the same segment vector, so
/// `VersionSet` implements structural `Eq`/`Hash` rather than value equivalence over all possible
/// `V`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VersionSet<V> {
    // A single inline segment is the common case (one bound, or a single range) and profiling
    // this kind of interval set consistently shows one inline slot beats the allocation avoided by
    // a larger one.
    segments: SmallVec<[Interval<V>; 1]>,
}

type Interval<V> = (Bound<V>, Bound<V>);

impl<V> VersionSet<V> {
    /// The empty set (∅): contains nothing.
    pub fn empty() -> Self {
        Self {
            segments: SmallVec::new(),
        }
    }

    /// The set of all values.
    pub fn any() -> Self {
        Self {
            segments: smallvec![(Unbounded, Unbounded)],
        }
    }

    /// `v <= x`.
    pub fn higher_than(v: impl Into<V>) -> Self {
        Self {
            segments: smallvec![(Included(v.into()), Unbounded)],
        }
    }

    /// `v < x`.
    pub fn strictly_higher_than(v: impl Into<V>) -> Self {
        Self {
            segments: smallvec![(Excluded(v.into()), Unbounded)],
        }
    }

    /// `x < v`.
    pub fn strictly_lower_than(v: impl Into<V>) -> Self {
        Self {
            segments: smallvec![(Unbounded, Excluded(v.into()))],
        }
    }

    /// `x <= v`.
    pub fn lower_than(v: impl Into<V>) -> Self {
        Self {
            segments: smallvec![(Unbounded, Included(v.into()))],
        }
    }

    /// The half-open range `lo <= x < hi`.
    pub fn range(lo: impl Into<V>, hi: impl Into<V>) -> Self {
        Self {
            segments: smallvec![(Included(lo.into()), Excluded(hi.into()))],
        }
    }

    /// Whether this set contains no value.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<V: Clone> VersionSet<V> {
    /// The singleton set containing exactly `v`.
    pub fn exact(v: impl Into<V>) -> Self {
        let v = v.into();
        Self {
            segments: smallvec![(Included(v.clone()), Included(v))],
        }
    }

    /// The complement: everything not in `self`.
    pub fn complement(&self) -> Self {
        match self.segments.first() {
            None => Self::any(),
            Some((Unbounded, Unbounded)) => Self::empty(),
            Some((Included(v), Unbounded)) => Self::strictly_lower_than(v.clone()),
            Some((Excluded(v), Unbounded)) => Self::lower_than(v.clone()),
            Some((Unbounded, Included(v))) => {
                Self::negate_segments(Excluded(v.clone()), &self.segments[1..])
            }
            Some((Unbounded, Excluded(v))) => {
                Self::negate_segments(Included(v.clone()), &self.segments[1..])
            }
            Some((Included(_), Included(_)))
            | Some((Included(_), Excluded(_)))
            | Some((Excluded(_), Included(_)))
            | Some((Excluded(_), Excluded(_))) => Self::negate_segments(Unbounded, &self.segments),
        }
    }

    fn negate_segments(start: Bound<V>, segments: &[Interval<V>]) -> Self {
        let mut complement_segments = SmallVec::new();
        let mut start = start;
        for (v1, v2) in segments {
            complement_segments.push((
                start,
                match v1 {
                    Included(v) => Excluded(v.clone()),
                    Excluded(v) => Included(v.clone()),
                    Unbounded => unreachable!(),
                },
            ));
            start = match v2 {
                Included(v) => Excluded(v.clone()),
                Excluded(v) => Included(v.clone()),
                Unbounded => Unbounded,
            }
        }
        if !matches!(start, Unbounded) {
            complement_segments.push((start, Unbounded));
        }
        Self {
            segments: complement_segments,
        }
    }
}

impl<V: Ord> VersionSet<V> {
    /// Whether this is the full set.
    pub fn is_any(&self) -> bool {
        matches!(self.segments.as_slice(), [(Unbounded, Unbounded)])
    }

    /// If this set contains exactly one value, return it.
    pub fn as_exact(&self) -> Option<&V> {
        match self.segments.as_slice() {
            [(Included(v1), Included(v2))] if v1 == v2 => Some(v1),
            _ => None,
        }
    }

    /// Whether `version` is a member of this set.
    pub fn contains(&self, version: &V) -> bool {
        self.segments
            .binary_search_by(|segment| within_bounds(version, segment).reverse())
            .is_ok()
    }

    fn check_invariants(self) -> Self {
        if cfg!(debug_assertions) {
            for p in self.segments.as_slice().windows(2) {
                assert!(end_before_start_with_gap(&p[0].1, &p[1].0));
            }
            for (s, e) in self.segments.iter() {
                assert!(valid_segment(s, e));
            }
        }
        self
    }
}

impl<V: Ord + Clone> VersionSet<V> {
    /// The union of this set and another.
    pub fn union(&self, other: &Self) -> Self {
        let mut output = SmallVec::new();
        let mut accumulator: Option<(&Bound<_>, &Bound<_>)> = None;
        let mut left_iter = self.segments.iter().peekable();
        let mut right_iter = other.segments.iter().peekable();
        loop {
            let smaller_interval = match (left_iter.peek(), right_iter.peek()) {
                (Some((left_start, left_end)), Some((right_start, right_end))) => {
                    if left_start_is_smaller(left_start.as_ref(), right_start.as_ref()) {
                        left_iter.next();
                        (left_start, left_end)
                    } else {
                        right_iter.next();
                        (right_start, right_end)
                    }
                }
                (Some((left_start, left_end)), None) => {
                    left_iter.next();
                    (left_start, left_end)
                }
                (None, Some((right_start, right_end))) => {
                    right_iter.next();
                    (right_start, right_end)
                }
                (None, None) => break,
            };

            if let Some(accumulator_) = accumulator {
                if end_before_start_with_gap(accumulator_.1, smaller_interval.0) {
                    output.push((accumulator_.0.clone(), accumulator_.1.clone()));
                    accumulator = Some(smaller_interval);
                } else {
                    let accumulator_end = match (accumulator_.1, smaller_interval.1) {
                        (_, Unbounded) | (Unbounded, _) => &Unbounded,
                        (Included(l), Excluded(r) | Included(r)) if l == r => accumulator_.1,
                        (Included(l) | Excluded(l), Included(r) | Excluded(r)) => {
                            if l > r {
                                accumulator_.1
                            } else {
                                smaller_interval.1
                            }
                        }
                    };
                    accumulator = Some((accumulator_.0, accumulator_end));
                }
            } else {
                accumulator = Some(smaller_interval)
            }
        }

        if let Some(accumulator) = accumulator {
            output.push((accumulator.0.clone(), accumulator.1.clone()));
        }

        Self { segments: output }.check_invariants()
    }

    /// The intersection of this set and another — the canonical pruning operation the resolver
    /// runs once per edge folded into a package's requirements.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut output = SmallVec::new();
        let mut left_iter = self.segments.iter().peekable();
        let mut right_iter = other.segments.iter().peekable();
        while let Some(((left_start, left_end), (right_start, right_end))) =
            left_iter.peek().zip(right_iter.peek())
        {
            let left_end_is_smaller = left_end_is_smaller(left_end.as_ref(), right_end.as_ref());
            let (other_start, end) = if left_end_is_smaller {
                left_iter.next();
                (right_start, left_end)
            } else {
                right_iter.next();
                (left_start, right_end)
            };
            if !valid_segment(other_start, end) {
                continue;
            }
            let start = match (left_start, right_start) {
                (Included(l), Included(r)) => Included(std::cmp::max(l, r)),
                (Excluded(l), Excluded(r)) => Excluded(std::cmp::max(l, r)),
                (Included(i), Excluded(e)) | (Excluded(e), Included(i)) => {
                    if i <= e {
                        Excluded(e)
                    } else {
                        Included(i)
                    }
                }
                (s, Unbounded) | (Unbounded, s) => s.as_ref(),
            };
            output.push((start.cloned(), end.clone()))
        }
        Self { segments: output }.check_invariants()
    }

    /// Whether no value can be in both `self` and `other`.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let mut left_iter = self.segments.iter().peekable();
        let mut right_iter = other.segments.iter().peekable();
        while let Some((left, right)) = left_iter.peek().zip(right_iter.peek()) {
            if !valid_segment(&right.0.as_ref(), &left.1.as_ref()) {
                left_iter.next();
            } else if !valid_segment(&left.0.as_ref(), &right.1.as_ref()) {
                right_iter.next();
            } else {
                return false;
            }
        }
        true
    }

    /// Whether every value in `self` is also in `other` — used by the resolver's nogood cache to
    /// decide whether a previously failed requirement set subsumes the current one.
    pub fn subset_of(&self, other: &Self) -> bool {
        let mut containing_iter = other.segments.iter();
        let subset_iter = self.segments.iter();
        let Some(mut containing_elem) = containing_iter.next() else {
            return subset_iter.count() == 0;
        };

        for subset_elem in subset_iter {
            while !valid_segment(&subset_elem.0.as_ref(), &containing_elem.1.as_ref()) {
                if let Some(next) = containing_iter.next() {
                    containing_elem = next;
                } else {
                    return false;
                }
            }
            if !left_start_is_smaller(containing_elem.0.as_ref(), subset_elem.0.as_ref()) {
                return false;
            }
            if !left_end_is_smaller(subset_elem.1.as_ref(), containing_elem.1.as_ref()) {
                return false;
            }
        }
        true
    }

    /// Iterate over the disjoint segments making up this set.
    pub fn iter(&self) -> impl Iterator<Item = (&Bound<V>, &Bound<V>)> {
        self.segments.iter().map(|(start, end)| (start, end))
    }
}

fn within_bounds<V: PartialOrd>(version: &V, segment: &Interval<V>) -> Ordering {
    let below_low = match &segment.0 {
        Included(low) => version < low,
        Excluded(low) => version <= low,
        Unbounded => false,
    };
    if below_low {
        return Ordering::Less;
    }
    let above_high = match &segment.1 {
        Included(high) => version > high,
        Excluded(high) => version >= high,
        Unbounded => false,
    };
    if above_high {
        return Ordering::Greater;
    }
    Ordering::Equal
}

fn valid_segment<T: PartialOrd>(start: &Bound<T>, end: &Bound<T>) -> bool {
    match (start, end) {
        (Included(s), Included(e)) => s <= e,
        (Included(s), Excluded(e)) | (Excluded(s), Included(e)) | (Excluded(s), Excluded(e)) => {
            s < e
        }
        (Unbounded, _) | (_, Unbounded) => true,
    }
}

/// Whether `end` (the end bound of one segment) leaves a gap before `start` (the start bound of
/// the next), i.e. the two segments do not touch and cannot be coalesced.
fn end_before_start_with_gap<V: PartialOrd>(end: &Bound<V>, start: &Bound<V>) -> bool {
    match (end, start) {
        (Unbounded, _) | (_, Unbounded) => false,
        (Included(e), Included(s)) => e < s,
        (Included(e), Excluded(s)) | (Excluded(e), Included(s)) | (Excluded(e), Excluded(s)) => {
            e <= s
        }
    }
}

fn left_start_is_smaller<V: PartialOrd>(left: Bound<&V>, right: Bound<&V>) -> bool {
    match (left, right) {
        (Unbounded, _) => true,
        (_, Unbounded) => false,
        (Included(l), Included(r)) => l <= r,
        (Included(l), Excluded(r)) => l <= r,
        (Excluded(l), Included(r)) => l < r,
        (Excluded(l), Excluded(r)) => l <= r,
    }
}

fn left_end_is_smaller<V: PartialOrd>(left: Bound<&V>, right: Bound<&V>) -> bool {
    match (left, right) {
        (Unbounded, _) => false,
        (_, Unbounded) => true,
        (Included(l), Included(r)) => l <= r,
        (Included(l), Excluded(r)) => l < r,
        (Excluded(l), Included(r)) => l <= r,
        (Excluded(l), Excluded(r)) => l <= r,
    }
}

impl<V: Display + Eq> Display for VersionSet<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            write!(f, "∅")?;
        } else {
            for (idx, segment) in self.segments.iter().enumerate() {
                if idx > 0 {
                    write!(f, " | ")?;
                }
                match segment {
                    (Unbounded, Unbounded) => write!(f, "*")?,
                    (Unbounded, Included(v)) => write!(f, "<={v}")?,
                    (Unbounded, Excluded(v)) => write!(f, "<{v}")?,
                    (Included(v), Unbounded) => write!(f, ">={v}")?,
                    (Excluded(v), Unbounded) => write!(f, ">{v}")?,
                    (Included(lo), Included(hi)) if lo == hi => write!(f, "={lo}")?,
                    (Included(lo), Excluded(hi)) => write!(f, ">={lo}, <{hi}")?,
                    (Included(lo), Included(hi)) => write!(f, ">={lo}, <={hi}")?,
                    (Excluded(lo), Excluded(hi)) => write!(f, ">{lo}, <{hi}")?,
                    (Excluded(lo), Included(hi)) => write!(f, ">{lo}, <={hi}")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(any(feature = "proptest", test))]
fn version_strat() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[cfg(any(feature = "proptest", test))]
/// A [`proptest`] strategy producing arbitrary `VersionSet<u32>` values, for fuzzing the algebraic
/// laws below and for any downstream crate (e.g. the resolver's own proptests) that wants a quick
/// source of non-trivial sets without depending on a real version type.
pub fn proptest_strategy() -> impl Strategy<Value = VersionSet<u32>> {
    prop::collection::vec(version_strat(), 0..10).prop_map(|mut ints| {
        ints.sort_unstable();
        ints.dedup();
        let mut segments = SmallVec::new();
        let mut it = ints.into_iter();
        while let (Some(lo), Some(hi)) = (it.next(), it.next()) {
            segments.push((Included(lo), Excluded(hi)));
        }
        VersionSet { segments }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_membership() {
        let r = VersionSet::<u32>::range(1, 5);
        assert!(!r.contains(&0));
        assert!(r.contains(&1));
        assert!(r.contains(&4));
        assert!(!r.contains(&5));
    }

    #[test]
    fn empty_is_annihilator() {
        let r = VersionSet::<u32>::range(1, 5);
        assert!(VersionSet::<u32>::empty().intersect(&r).is_empty());
    }

    #[test]
    fn any_is_identity() {
        let r = VersionSet::<u32>::range(1, 5);
        assert_eq!(VersionSet::<u32>::any().intersect(&r), r);
    }

    #[test]
    fn exact_is_singleton_range() {
        let a = VersionSet::<u32>::exact(3);
        assert!(a.contains(&3));
        assert!(!a.contains(&2));
        assert!(!a.contains(&4));
        assert_eq!(a.as_exact(), Some(&3));
    }

    #[test]
    fn union_coalesces_adjacent_ranges() {
        let a = VersionSet::<u32>::range(1, 3);
        let b = VersionSet::<u32>::range(3, 5);
        let u = a.union(&b);
        assert_eq!(u, VersionSet::<u32>::range(1, 5));
    }

    proptest! {
        #[test]
        fn intersection_is_symmetric(r1 in proptest_strategy(), r2 in proptest_strategy()) {
            assert_eq!(r1.intersect(&r2), r2.intersect(&r1));
        }

        #[test]
        fn intersection_with_any_is_identity(range in proptest_strategy()) {
            assert_eq!(VersionSet::any().intersect(&range), range);
        }

        #[test]
        fn intersection_with_empty_is_empty(range in proptest_strategy()) {
            assert_eq!(VersionSet::empty().intersect(&range), VersionSet::empty());
        }

        #[test]
        fn intersection_is_idempotent(r1 in proptest_strategy(), r2 in proptest_strategy()) {
            let a = r1.intersect(&r2);
            assert_eq!(a.intersect(&r1).intersect(&r2), a);
        }

        #[test]
        fn intersection_is_associative(r1 in proptest_strategy(), r2 in proptest_strategy(), r3 in proptest_strategy()) {
            let left = r1.intersect(&r2).intersect(&r3);
            let right = r1.intersect(&r2.intersect(&r3));
            assert_eq!(left, right);
        }

        #[test]
        fn union_of_complements_is_any(range in proptest_strategy()) {
            assert!(range.union(&range.complement()).is_any());
        }

        #[test]
        fn contains_matches_intersection(r1 in proptest_strategy(), r2 in proptest_strategy(), version in version_strat()) {
            let both = r1.contains(&version) && r2.contains(&version);
            assert_eq!(r1.intersect(&r2).contains(&version), both);
        }

        #[test]
        fn is_disjoint_through_intersection(r1 in proptest_strategy(), r2 in proptest_strategy()) {
            assert_eq!(r1.is_disjoint(&r2), r1.intersect(&r2).is_empty());
        }

        #[test]
        fn subset_of_through_intersection(r1 in proptest_strategy(), r2 in proptest_strategy()) {
            assert_eq!(r1.subset_of(&r2), r1.intersect(&r2) == r1);
        }
    }
}
