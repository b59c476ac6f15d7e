//! Error rendering for the `pgnudge` binary.

use std::io::{self, Write};

use pgnudge_core::GameError;

/// A structured error with optional suggestion and error code.
#[derive(Debug, PartialEq, Eq)]
pub struct CliError {
    /// Human-readable error message, including its context chain.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    pub error_code: Option<String>,
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GameError>())
            .map(GameError::code);
        Self {
            message: format!("{err:#}"),
            suggestion: code.and_then(|c| c.hint()).map(str::to_string),
            error_code: code.map(|c| c.code().to_string()),
        }
    }
}

/// Write `error` in human form.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_error<W: Write>(mut out: W, error: &CliError) -> io::Result<()> {
    match &error.error_code {
        Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
        None => writeln!(out, "error: {}", error.message)?,
    }
    if let Some(suggestion) = &error.suggestion {
        writeln!(out, "  suggestion: {suggestion}")?;
    }
    Ok(())
}

/// Render an error to stderr.
pub fn render_error(err: &anyhow::Error) {
    let error = CliError::from(err);
    // Nothing sensible is left to do if stderr itself is gone.
    let _ = write_error(io::stderr().lock(), &error);
}
