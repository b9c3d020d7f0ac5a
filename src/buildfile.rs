//! Reconciliation of `go.mod` with the private packages of a manifest.
//!
//! Generated content is always a pair of lines per private package:
//!
//! ```text
//! replace <name> => "<cache path>"
//! require <name> v1.0.0
//! ```
//!
//! Every `replace` line is treated as generated and dropped, and the first
//! later line mentioning the same name is dropped with it as its `require`
//! partner. Everything else is kept verbatim and in order. Fresh pairs for the
//! current private packages are appended at the end, so running the
//! reconciliation twice yields the same text.

use std::path::{Path, PathBuf};

use crate::error::GopkError;

pub const BUILD_FILE_NAME: &str = "go.mod";
pub const CHECKSUM_FILE_NAME: &str = "go.sum";

pub const OVERRIDE_KEYWORD: &str = "replace";
pub const OVERRIDE_SEPARATOR: &str = "=>";
pub const REQUIRE_KEYWORD: &str = "require";

/// Version pinned on every generated `require` line.
pub const PLACEHOLDER_VERSION: &str = "v1.0.0";

/// A private package redirected to its local checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub name: String,
    pub path: PathBuf,
}

impl Override {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn override_line(&self) -> String {
        format!(
            "{} {} {} \"{}\"",
            OVERRIDE_KEYWORD,
            self.name,
            OVERRIDE_SEPARATOR,
            escape_path(&self.path)
        )
    }

    pub fn require_line(&self) -> String {
        format!("{} {} {}", REQUIRE_KEYWORD, self.name, PLACEHOLDER_VERSION)
    }
}

/// Rebuild `content` so the generated block matches `overrides`.
///
/// Fails with `MalformedBuildFile` before producing anything if an override
/// line does not have exactly one `=>`.
pub fn reconcile(content: &str, overrides: &[Override]) -> Result<String, GopkError> {
    let mut pending: Vec<String> = Vec::new();
    let mut output = String::with_capacity(content.len());

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();

        if is_override_line(trimmed) {
            pending.push(override_target(trimmed, index + 1)?);
            continue;
        }

        if let Some(position) = matching_pending(&pending, line) {
            pending.remove(position);
            continue;
        }

        output.push_str(line);
        output.push('\n');
    }

    for entry in overrides {
        output.push_str(&entry.override_line());
        output.push('\n');
        output.push_str(&entry.require_line());
        output.push('\n');
    }

    Ok(output)
}

fn is_override_line(trimmed: &str) -> bool {
    trimmed.split_whitespace().next() == Some(OVERRIDE_KEYWORD)
}

// `replace <name> => "<path>"` -> `<name>`
fn override_target(trimmed: &str, line: usize) -> Result<String, GopkError> {
    let malformed = || GopkError::MalformedBuildFile {
        line,
        content: trimmed.to_string(),
    };

    let parts: Vec<&str> = trimmed.split(OVERRIDE_SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(malformed());
    }

    parts[0]
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(malformed)
}

// Longest pending name contained in the line, so `foo` does not claim the
// partner line of `foobar`.
fn matching_pending(pending: &[String], line: &str) -> Option<usize> {
    pending
        .iter()
        .enumerate()
        .filter(|(_, name)| line.contains(name.as_str()))
        .max_by_key(|(_, name)| name.len())
        .map(|(position, _)| position)
}

fn escape_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
