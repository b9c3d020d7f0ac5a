//! Local cache of cloned private packages.
//!
//! Layout: `<cache_root>/<package name>`. The presence of that directory is
//! the only state tracked.

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::GopkError;
use crate::manifest::validate_package_name;
use crate::runtime::Runtime;
use crate::toolchain::Toolchain;

pub struct PackageCache<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> PackageCache<'a, R> {
    pub fn new(runtime: &'a R, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: `<cache_root>/<name>`
    ///
    /// Only meaningful for names accepted by `validate_package_name`; anything
    /// that writes or deletes goes through `checked_path`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// `path_for`, refusing names that would resolve to the cache root itself
    /// or anywhere outside it.
    pub fn checked_path(&self, name: &str) -> Result<PathBuf> {
        validate_package_name(name)?;
        let path = self.path_for(name);
        if path == self.root || !path.starts_with(&self.root) {
            return Err(GopkError::Validation {
                field: "package name",
                reason: format!("'{}' resolves outside of {}", name, self.root.display()),
            }
            .into());
        }
        Ok(path)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.runtime.exists(&self.path_for(name))
    }

    /// Delete a cached package and everything under it.
    pub fn evict(&self, name: &str) -> Result<()> {
        let path = self.checked_path(name)?;
        if !self.runtime.exists(&path) {
            return Ok(());
        }
        info!("Deleting {}", path.display());
        self.remove_tree(&path)
    }

    /// Clone `uri` into `<cache_root>/<name>`, creating the cache root if needed.
    pub async fn materialize(&self, toolchain: &Toolchain, uri: &str, name: &str) -> Result<PathBuf> {
        let path = self.checked_path(name)?;
        if !self.runtime.exists(&self.root) {
            self.runtime
                .create_dir_all(&self.root)
                .with_context(|| format!("Failed to create cache root {:?}", self.root))?;
        }
        toolchain.clone_repository(uri, name, &self.root).await?;
        Ok(path)
    }

    // Post-order: files first, then subdirectories, then the directory itself.
    fn remove_tree(&self, dir: &Path) -> Result<()> {
        self.runtime
            .make_writable(dir)
            .map_err(|e| permission_error(e, dir))?;

        let entries = self.runtime.read_dir(dir)?;
        let (dirs, files): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| self.runtime.is_dir(entry) && !self.runtime.is_symlink(entry));

        for file in files {
            debug!("Removing {:?}", file);
            self.runtime
                .make_writable(&file)
                .map_err(|e| permission_error(e, &file))?;
            self.runtime
                .remove_file(&file)
                .map_err(|e| permission_error(e, &file))?;
        }

        for sub in dirs {
            self.remove_tree(&sub)?;
        }

        self.runtime
            .remove_dir(dir)
            .map_err(|e| permission_error(e, dir))
    }
}

fn permission_error(err: anyhow::Error, path: &Path) -> anyhow::Error {
    match err.downcast_ref::<std::io::Error>() {
        Some(io) if io.kind() == ErrorKind::PermissionDenied => {
            GopkError::Permission(path.to_path_buf()).into()
        }
        _ => err,
    }
}
