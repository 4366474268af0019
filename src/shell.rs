//! Shell quoting for export output.
//!
//! The `export` subcommand prints assignments that are evaluated with
//! `eval "$(secrets export)"`, so values must survive a POSIX shell parse.

/// Quote `value` for use on the right-hand side of a shell assignment.
///
/// Strings made only of safe characters pass through unchanged; everything
/// else (including the empty string) is wrapped in single quotes, with
/// embedded single quotes escaped as `'"'"'`.
pub fn quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

// =============================================================================
// Tests
// =============================================================================
