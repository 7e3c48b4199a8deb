//! Fuzz target for exclusion rule compilation and matching.
//!
//! Arbitrary pattern sources and flags must either compile or fail with a
//! configuration error, never panic.

#![no_main]

use arbitrary::Arbitrary;
use bulwark_csrf::{ExclusionRule, is_excluded};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRules {
    literals: Vec<String>,
    patterns: Vec<(String, String)>,
    paths: Vec<String>,
}

fuzz_target!(|data: FuzzRules| {
    let rules = data
        .literals
        .iter()
        .map(|l| ExclusionRule::literal(l.as_str()))
        .chain(
            data.patterns
                .iter()
                .map(|(source, flags)| ExclusionRule::pattern(source.as_str(), flags.as_str())),
        );

    let mut compiled = Vec::new();
    for rule in rules {
        match rule.compile() {
            Ok(rule) => compiled.push(rule),
            Err(e) => assert!(e.is_config_error()),
        }
    }

    for path in &data.paths {
        let excluded = is_excluded(path, &compiled);

        // A literal equal to the path always excludes it.
        if data.literals.iter().any(|l| l == path) {
            assert!(excluded);
        }
    }
});
