//! Small shared helpers for the integration test suites: logging setup and a version-parsing
//! shortcut. The JSON mock-graph fixture format itself (spec §6) is parsed by the crate's own
//! [`version_solve::fixture`] module now, not duplicated here.

use version_solve::Version;

pub fn version(text: &str) -> Version {
    version_solve::version::parse(text).expect("fixture version must parse")
}

pub fn init_log() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}
