//! Test utility functions for logfwd

#![allow(dead_code)]

use logfwd::core::config::{OutputSpec, PipelineSpec};
use logfwd::core::secret::SecretBundle;

/// Normalize configuration text for comparison: trailing whitespace on
/// each line and leading/trailing blank lines are not significant.
pub fn trim_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// Assert two configurations are equal after [`trim_lines`]
pub fn assert_eq_trim_lines(actual: &str, expected: &str) {
    let (actual, expected) = (trim_lines(actual), trim_lines(expected));
    if actual != expected {
        let first_diff = actual
            .lines()
            .zip(expected.lines())
            .position(|(a, e)| a != e)
            .unwrap_or_else(|| actual.lines().count().min(expected.lines().count()));
        panic!(
            "configuration differs at line {}\n--- actual ---\n{}\n--- expected ---\n{}",
            first_diff + 1,
            actual,
            expected
        );
    }
}

/// The secure on-cluster output used across scenarios
pub fn oncluster_output() -> OutputSpec {
    OutputSpec::elasticsearch(
        "oncluster-elasticsearch",
        "https://es.svc.messaging.cluster.local:9654",
    )
    .with_secret("my-es-secret")
}

/// The plaintext output used across scenarios
pub fn other_output() -> OutputSpec {
    OutputSpec::elasticsearch(
        "other-elasticsearch",
        "http://es.svc.messaging.cluster.local:9654",
    )
    .with_secret("my-es-secret")
}

pub fn secure_pipeline(outputs: &[&str]) -> PipelineSpec {
    let mut pipeline = PipelineSpec::new("my-secure-pipeline", outputs);
    pipeline.input_refs = vec!["application".to_string()];
    pipeline
}

pub fn user_pass_secret() -> SecretBundle {
    SecretBundle::new("my-es-secret")
        .with_username("test-user")
        .with_password("test-pass")
}

/// Count non-overlapping occurrences of `needle`
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn trim_lines_ignores_trailing_space_and_outer_blanks() {
    assert_eq!(trim_lines("\n  a  \n\tb\t\n\n"), "  a\n\tb");
    assert_eq!(trim_lines(""), "");
}
