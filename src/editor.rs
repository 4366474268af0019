//! External editor round trip.
//!
//! Writes seed text to a temporary file, blocks on the user's editor, and
//! reads the result back. The temp file is removed on every exit path when
//! the `NamedTempFile` guard drops.

use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;

use crate::error::{Result, SecretsError};

/// Editor used when `$EDITOR` is unset.
const DEFAULT_EDITOR: &str = "nano";

/// Run the user's editor over `text` and return what they saved.
///
/// `$EDITOR` is split on whitespace so values like `code -w` work; the temp
/// file path is appended as the final argument. The call blocks until the
/// editor exits. The editor's exit status is not checked; the file contents
/// decide what happens next.
pub fn edit_text(text: &str, suffix: &str) -> Result<String> {
    let editor = env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string());

    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_EDITOR);
    let _ = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .map_err(|source| SecretsError::EditorLaunch {
            editor: editor.clone(),
            source,
        })?;

    let edited = fs::read_to_string(file.path())?;
    Ok(edited)
}

// =============================================================================
// Tests
// =============================================================================
