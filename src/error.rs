//! Error taxonomy for manifest, cache and build-file operations.
//!
//! Operations return `anyhow::Result`; the variants below are attached to the
//! chain so callers (and tests) can recover the category with
//! `err.downcast_ref::<GopkError>()`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GopkError {
    /// A required field was empty, or a package name is not a safe
    /// relative path.
    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// `init` was run in a project that already has a manifest.
    #[error("Manifest already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// No manifest file in the project root.
    #[error("No manifest found at {}. Run `gopk init` first.", .0.display())]
    ManifestNotFound(PathBuf),

    /// The persisted manifest could not be parsed into a valid manifest.
    #[error("Manifest at {} is corrupted: {reason}", path.display())]
    Corruption { path: PathBuf, reason: String },

    #[error("Another package named '{0}' already exists")]
    DuplicatePackage(String),

    /// An override line did not split into exactly two parts around `=>`.
    #[error("Malformed build file at line {line}: {content}")]
    MalformedBuildFile { line: usize, content: String },

    /// Cache eviction was refused by the filesystem.
    #[error("Permission denied while removing {}", .0.display())]
    Permission(PathBuf),

    /// An external process could not be started or reported failure.
    #[error("`{command}` failed: {reason}")]
    ExternalFailure { command: String, reason: String },

    /// A nested private project depends back on one of its ancestors.
    #[error("Dependency cycle detected: {name} ({}) is already being restored", root.display())]
    DependencyCycle { name: String, root: PathBuf },
}
