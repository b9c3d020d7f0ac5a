//! Install and remove use cases over the manifest's package set.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};

use super::{RestoreOptions, RestoreReport, Restorer};
use crate::cache::PackageCache;
use crate::error::GopkError;
use crate::manifest::{Manifest, PackageRecord, validate_package_name};
use crate::runtime::Runtime;
use crate::toolchain::Toolchain;

/// Options for adding a package
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Clone into the private cache instead of `go get`
    pub private: bool,
    /// Evict an existing cache entry and clone again
    pub update: bool,
    /// Restore the clone as a nested project if it has its own manifest
    pub recursive: bool,
}

#[derive(Debug)]
pub enum AddOutcome {
    /// Public package fetched and recorded.
    Fetched,
    /// Public fetch failed; nothing was recorded.
    FetchFailed(anyhow::Error),
    /// Private package cloned into the cache, optionally restored as a nested
    /// project.
    Cloned { nested: Option<RestoreReport> },
    /// Private package already cached; recorded without cloning.
    Reused,
}

pub struct Resolver<'a, R: Runtime> {
    runtime: &'a R,
    cache: PackageCache<'a, R>,
    toolchain: &'a Toolchain,
    project_root: PathBuf,
}

impl<'a, R: Runtime> Resolver<'a, R> {
    pub fn new(
        runtime: &'a R,
        project_root: &Path,
        cache_root: &Path,
        toolchain: &'a Toolchain,
    ) -> Self {
        Self {
            runtime,
            cache: PackageCache::new(runtime, cache_root),
            toolchain,
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn cache(&self) -> &PackageCache<'a, R> {
        &self.cache
    }

    /// Add `name` to the manifest, materializing it first.
    ///
    /// Fails with `Validation` for names that are not plain relative paths and
    /// with `DuplicatePackage` if the name is taken, leaving the manifest
    /// untouched in both cases. A failed public fetch is reported through
    /// [`AddOutcome::FetchFailed`] rather than as an error.
    #[tracing::instrument(skip(self, manifest))]
    pub async fn add_package(
        &self,
        manifest: &mut Manifest,
        uri: &str,
        name: &str,
        options: &AddOptions,
    ) -> Result<AddOutcome> {
        validate_package_name(name)?;
        if manifest.contains(name) {
            return Err(GopkError::DuplicatePackage(name.to_string()).into());
        }

        let record = PackageRecord {
            uri: uri.to_string(),
            private: options.private,
        };

        if !options.private {
            if let Err(e) = self.toolchain.fetch_package(uri, &self.project_root).await {
                warn!("Failed to fetch {}: {:#}", uri, e);
                return Ok(AddOutcome::FetchFailed(e));
            }
            manifest.insert(name, record)?;
            return Ok(AddOutcome::Fetched);
        }

        let package_dir = self.cache.path_for(name);
        if options.update && self.cache.exists(name) {
            self.cache.evict(name)?;
        }

        if self.cache.exists(name) {
            debug!("{} already cached at {:?}", name, package_dir);
            manifest.insert(name, record)?;
            return Ok(AddOutcome::Reused);
        }

        self.cache.materialize(self.toolchain, uri, name).await?;

        let nested = if options.recursive {
            Restorer::new(self.runtime, self.cache.root(), self.toolchain)
                .restore_checkout(&self.project_root, &package_dir, &RestoreOptions::default())
                .await?
        } else {
            None
        };

        if let Err(e) = self.toolchain.tidy(&package_dir).await {
            warn!("Failed to tidy {}: {:#}", name, e);
        }

        manifest.insert(name, record)?;
        Ok(AddOutcome::Cloned { nested })
    }

    /// Remove `name` from the manifest. Returns whether it was present.
    pub fn delete_package(&self, manifest: &mut Manifest, name: &str) -> bool {
        let removed = manifest.remove(name).is_some();
        debug!("Removing {} from manifest: present={}", name, removed);
        removed
    }
}
