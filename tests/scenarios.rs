//! The concrete scenarios of spec §8 (S1-S6), plus cycle rejection.

use version_solve::{resolve, Constraint, OfflineProvider, ResolveError, VS};

fn init_log() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

fn v(text: &str) -> version_solve::Version {
    version_solve::version::parse(text).unwrap()
}

/// S1: trivial fan-out. Root depends on two unrelated leaves; both resolve independently.
#[test]
fn trivial_fan_out() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("root", v("1.0.0"), [
        Constraint::new("left", VS::any()),
        Constraint::new("right", VS::any()),
    ]);
    provider.add("left", v("1.0.0"), []);
    provider.add("right", v("1.0.0"), []);

    let roots = [Constraint::new("root", VS::exact(v("1.0.0")))];
    let solution = resolve(&roots, &provider).unwrap();
    assert_eq!(solution.len(), 3);
    assert_eq!(solution["left"], v("1.0.0"));
    assert_eq!(solution["right"], v("1.0.0"));
}

/// S2: diamond agreement. Two paths to `shared` intersect to a non-empty range.
#[test]
fn diamond_agreement() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("root", v("1.0.0"), [
        Constraint::new("a", VS::any()),
        Constraint::new("b", VS::any()),
    ]);
    provider.add("a", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("b", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("3.0.0")))]);
    provider.add("shared", v("1.5.0"), []);
    provider.add("shared", v("2.5.0"), []);

    let roots = [Constraint::new("root", VS::exact(v("1.0.0")))];
    let solution = resolve(&roots, &provider).unwrap();
    assert_eq!(solution["shared"], v("1.5.0"), "newest version within the intersected range wins");
}

/// S3: diamond conflict. Two paths to `shared` intersect to empty; no solution exists.
#[test]
fn diamond_conflict() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("root", v("1.0.0"), [
        Constraint::new("a", VS::any()),
        Constraint::new("b", VS::any()),
    ]);
    provider.add("a", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("b", v("1.0.0"), [Constraint::new("shared", VS::range(v("2.0.0"), v("3.0.0")))]);
    provider.add("shared", v("1.5.0"), []);
    provider.add("shared", v("2.5.0"), []);

    let roots = [Constraint::new("root", VS::exact(v("1.0.0")))];
    let err = resolve(&roots, &provider).unwrap_err();
    assert!(matches!(err, ResolveError::Unsatisfiable(_)));
}

/// S4: backtrack by version. The newest `a` leads to a dead end; the search must retreat to an
/// older `a` rather than declaring failure.
#[test]
fn backtrack_by_version() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("a", v("1.1.0"), [Constraint::new("b", VS::range(v("2.0.0"), v("3.0.0")))]);
    provider.add("a", v("1.2.0"), [Constraint::new("b", VS::range(v("2.0.0"), v("3.0.0")))]);
    provider.add("a", v("1.3.0"), [Constraint::new("b", VS::range(v("3.0.0"), v("4.0.0")))]);
    provider.add("b", v("2.0.0"), []);

    let roots = [Constraint::new("a", VS::range(v("1.0.0"), v("2.0.0")))];
    let solution = resolve(&roots, &provider).unwrap();
    assert_eq!(solution["a"], v("1.2.0"), "1.3.0 has no satisfiable b, so the search retreats to 1.2.0");
    assert_eq!(solution["b"], v("2.0.0"));
}

/// S5: deep chain. A long dependency chain exercises the recursion depth in a single pass; the
/// specific scale here just needs to be well beyond the handful of levels other tests use.
#[test]
fn deep_chain() {
    init_log();
    const DEPTH: u64 = 200;
    let mut provider = OfflineProvider::<String>::new();
    for i in 0..DEPTH {
        let next = if i + 1 < DEPTH {
            vec![Constraint::new(format!("pkg{}", i + 1), VS::exact(v("1.0.0")))]
        } else {
            vec![]
        };
        provider.add(format!("pkg{i}"), v("1.0.0"), next);
    }

    let roots = [Constraint::new("pkg0".to_string(), VS::exact(v("1.0.0")))];
    let solution = resolve(&roots, &provider).unwrap();
    assert_eq!(solution.len(), DEPTH as usize);
    for i in 0..DEPTH {
        assert_eq!(solution[&format!("pkg{i}")], v("1.0.0"));
    }
}

/// S6: unknown package. A root constraint names a package the provider has never heard of.
#[test]
fn unknown_package() {
    init_log();
    let provider = OfflineProvider::<&str>::new();
    let roots = [Constraint::new("ghost", VS::any())];
    let err = resolve(&roots, &provider).unwrap_err();
    assert!(matches!(err, ResolveError::UnknownPackage(id) if id == "ghost"));
}

/// A directly self-referential dependency is a one-node cycle, rejected the same way a longer one
/// would be (§9, Open Questions: cycles are rejected, not fixed-pointed).
#[test]
fn direct_cycle_is_rejected() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("a", v("1.0.0"), [Constraint::new("b", VS::any())]);
    provider.add("b", v("1.0.0"), [Constraint::new("a", VS::any())]);

    let roots = [Constraint::new("a", VS::exact(v("1.0.0")))];
    let err = resolve(&roots, &provider).unwrap_err();
    assert!(matches!(err, ResolveError::CycleDetected(_)));
}

/// S3's witness must name the package that actually ran out of versions (`shared`), not whichever
/// of the two diamond branches (`a`/`b`) happened to be decided last — its own outer requirement
/// never changes and would produce a self-referential, uninformative witness.
#[test]
fn diamond_conflict_witness_names_the_shared_dependency_not_the_branch() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("root", v("1.0.0"), [
        Constraint::new("a", VS::any()),
        Constraint::new("b", VS::any()),
    ]);
    provider.add("a", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("b", v("1.0.0"), [Constraint::new("shared", VS::range(v("2.0.0"), v("3.0.0")))]);
    provider.add("shared", v("1.5.0"), []);

    let roots = [Constraint::new("root", VS::exact(v("1.0.0")))];
    let err = resolve(&roots, &provider).unwrap_err();
    let ResolveError::Unsatisfiable(witness) = err else {
        panic!("expected Unsatisfiable, got {err:?}");
    };
    assert_eq!(witness.package, "shared", "witness: {witness}");
}

/// A nogood learned for one package under bindings made on a losing branch must not survive past
/// the backtrack that undoes those bindings: here `b` first fails while `shared` is pinned to
/// `5.5.0` by `a@2.0.0`, caching (unsoundly, if not invalidated) "`b` can never satisfy `any`" —
/// but once the search retreats to `a@1.0.0`, `shared` repins to `1.5.0` and `b` becomes
/// satisfiable again. A resolver that trusted the stale nogood would wrongly report
/// `Unsatisfiable` even though `{a:1.0.0, b:1.0.0, shared:1.5.0}` is a valid solution.
#[test]
fn nogood_cache_does_not_survive_the_backtrack_that_invalidates_it() {
    init_log();
    let mut provider = OfflineProvider::<&str>::new();
    provider.add("root", v("1.0.0"), [
        Constraint::new("a", VS::any()),
        Constraint::new("b", VS::any()),
    ]);
    provider.add("a", v("2.0.0"), [Constraint::new("shared", VS::range(v("5.0.0"), v("6.0.0")))]);
    provider.add("a", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("b", v("2.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("b", v("1.0.0"), [Constraint::new("shared", VS::range(v("1.0.0"), v("2.0.0")))]);
    provider.add("shared", v("1.5.0"), []);
    provider.add("shared", v("5.5.0"), []);

    let roots = [Constraint::new("root", VS::exact(v("1.0.0")))];
    let solution = resolve(&roots, &provider).unwrap();
    assert_eq!(solution["a"], v("1.0.0"));
    assert_eq!(solution["b"], v("2.0.0"));
    assert_eq!(solution["shared"], v("1.5.0"));
}
