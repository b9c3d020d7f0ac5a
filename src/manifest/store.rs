//! Loading and persisting the project manifest.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use super::Manifest;
use crate::error::GopkError;
use crate::runtime::{Runtime, write_atomic};

pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Reads and writes `<project_root>/package.json`.
pub struct ManifestStore<'a, R: Runtime> {
    runtime: &'a R,
    project_root: PathBuf,
}

impl<'a, R: Runtime> ManifestStore<'a, R> {
    pub fn new(runtime: &'a R, project_root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_FILE_NAME)
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.manifest_path())
    }

    #[tracing::instrument(skip(self), fields(root = ?self.project_root))]
    pub fn load(&self) -> Result<Manifest> {
        let path = self.manifest_path();
        if !self.runtime.exists(&path) {
            return Err(GopkError::ManifestNotFound(path).into());
        }

        let content = self.runtime.read_to_string(&path)?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| GopkError::Corruption {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        manifest.validate().map_err(|e| GopkError::Corruption {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            "Loaded manifest {} with {} package(s)",
            manifest.name,
            manifest.packages.len()
        );
        Ok(manifest)
    }

    /// Render the manifest as indented JSON.
    pub fn render(manifest: &Manifest) -> Result<String> {
        let mut content =
            serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
        content.push('\n');
        Ok(content)
    }

    /// Persist a manifest for a new project. Refuses to replace an existing one.
    pub fn create(&self, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path();
        if self.runtime.exists(&path) {
            return Err(GopkError::AlreadyExists(path).into());
        }
        self.save(manifest)
    }

    /// Persist the manifest, replacing whatever is on disk.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let content = Self::render(manifest)?;
        let path = self.manifest_path();
        write_atomic(self.runtime, &path, content.as_bytes())
            .with_context(|| format!("Failed to save manifest to {:?}", path))
    }
}
