//! Custom assertions for inspectkit testing.

use crate::fixtures::CapturedOutput;

/// Assert that `output` recorded exactly `expected`, showing a diff
/// otherwise.
///
/// # Panics
///
/// Panics if the recorded lines differ from `expected`.
pub fn assert_output_lines(output: &CapturedOutput, expected: &[&str]) {
    let actual = output.lines();
    let actual: Vec<&str> = actual.iter().map(String::as_str).collect();
    pretty_assertions::assert_eq!(actual, expected);
}

/// Assert that `url` is a session URL of the form `ws=<host>:<port>/<token>`
/// with a non-empty token, and return the token.
///
/// # Panics
///
/// Panics if `url` is malformed or names a different host or port.
pub fn assert_session_url<'a>(url: &'a str, host: &str, port: u16) -> &'a str {
    let prefix = format!("ws={host}:{port}/");
    let Some(token) = url.strip_prefix(&prefix) else {
        panic!("Expected session URL starting with '{prefix}', but got '{url}'");
    };
    assert!(!token.is_empty(), "Session URL '{url}' has an empty token");
    assert!(
        !token.contains('/'),
        "Session URL token '{token}' must be a single path segment"
    );
    token
}

/// Assert that `lines` is a well-formed inspector banner for `port`.
///
/// # Panics
///
/// Panics if the banner does not have exactly two lines announcing `port`
/// and linking a session URL.
pub fn assert_banner(lines: &[String], port: u16) {
    assert_eq!(lines.len(), 2, "Expected a two-line banner, got {lines:?}");
    pretty_assertions::assert_eq!(lines[0], format!("Debugger listening on port {port}"));
    assert!(
        lines[1].contains(&format!(":{port}/")) && lines[1].contains("ws="),
        "Expected banner to link a session URL on port {port}, but got '{}'",
        lines[1]
    );
}

/// Macro for asserting the lines recorded by a [`CapturedOutput`].
///
/// # Example
///
/// ```rust
/// use inspectkit_testing::{assert_lines, CapturedOutput};
///
/// let output = CapturedOutput::new();
/// output.push("3");
/// output.push("l3: A");
/// assert_lines!(output, ["3", "l3: A"]);
/// ```
#[macro_export]
macro_rules! assert_lines {
    ($output:expr, [$($line:expr),* $(,)?]) => {
        $crate::assertions::assert_output_lines(&$output, &[$($line),*])
    };
}
