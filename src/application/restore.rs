//! Restore use case - materializes every declared package.
//!
//! Public packages are fetched with `go get`. Private packages are cloned
//! into the cache; a fresh clone that carries its own `package.json` is a
//! nested project and gets the same treatment recursively, followed by a
//! synchronization of its own `go.mod`.
//!
//! One failing package never stops the sweep; failures are collected in the
//! [`RestoreReport`]. The only fatal condition is a dependency cycle.

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use log::{debug, info, warn};

use super::BuildFileSynchronizer;
use crate::buildfile::BUILD_FILE_NAME;
use crate::cache::PackageCache;
use crate::error::GopkError;
use crate::manifest::{Manifest, ManifestStore, PackageRecord};
use crate::runtime::Runtime;
use crate::toolchain::Toolchain;

/// Options for the restore use case
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Evict and re-clone private packages of the project being restored
    pub update: bool,
    /// Also evict and re-clone inside nested private projects
    pub update_nested: bool,
    /// Run `go mod tidy` in every private package directory
    pub tidy: bool,
}

impl RestoreOptions {
    fn for_nested(&self) -> Self {
        Self {
            update: self.update_nested,
            update_nested: self.update_nested,
            tidy: self.tidy,
        }
    }
}

#[derive(Debug)]
pub struct PackageFailure {
    pub package: String,
    pub error: anyhow::Error,
}

/// Outcome of one restore pass. Nested entries are named `parent > child`.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub fetched: Vec<String>,
    pub cloned: Vec<String>,
    pub reused: Vec<String>,
    pub nested: Vec<String>,
    pub failures: Vec<PackageFailure>,
}

impl RestoreReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, parent: &str, nested: RestoreReport) {
        let prefixed = |name: String| format!("{} > {}", parent, name);
        self.fetched.extend(nested.fetched.into_iter().map(prefixed));
        self.cloned.extend(nested.cloned.into_iter().map(prefixed));
        self.reused.extend(nested.reused.into_iter().map(prefixed));
        self.nested.extend(nested.nested.into_iter().map(prefixed));
        self.failures
            .extend(nested.failures.into_iter().map(|f| PackageFailure {
                package: prefixed(f.package),
                error: f.error,
            }));
    }
}

pub struct Restorer<'a, R: Runtime> {
    runtime: &'a R,
    cache: PackageCache<'a, R>,
    toolchain: &'a Toolchain,
}

impl<'a, R: Runtime> Restorer<'a, R> {
    pub fn new(runtime: &'a R, cache_root: &Path, toolchain: &'a Toolchain) -> Self {
        Self {
            runtime,
            cache: PackageCache::new(runtime, cache_root),
            toolchain,
        }
    }

    /// Restore every package declared by `manifest` for the project at
    /// `project_root`.
    #[tracing::instrument(skip(self, manifest, options), fields(module = %manifest.name))]
    pub async fn restore(
        &self,
        project_root: &Path,
        manifest: &Manifest,
        options: &RestoreOptions,
    ) -> Result<RestoreReport> {
        let mut ancestors = vec![project_root.to_path_buf()];
        self.restore_packages(project_root, manifest, options, &mut ancestors)
            .await
    }

    /// Restore a freshly cloned package of the project at `parent_root` if it
    /// is a nested project.
    ///
    /// Returns `None` when the checkout has no manifest of its own.
    pub async fn restore_checkout(
        &self,
        parent_root: &Path,
        package_dir: &Path,
        options: &RestoreOptions,
    ) -> Result<Option<RestoreReport>> {
        let mut ancestors = vec![parent_root.to_path_buf()];
        self.restore_nested(package_dir, options, &mut ancestors)
            .await
    }

    fn restore_packages<'b>(
        &'b self,
        project_root: &'b Path,
        manifest: &'b Manifest,
        options: &'b RestoreOptions,
        ancestors: &'b mut Vec<PathBuf>,
    ) -> BoxFuture<'b, Result<RestoreReport>> {
        async move {
            let mut report = RestoreReport::default();

            for (name, record) in &manifest.packages {
                let result = if record.private {
                    self.restore_private(name, record, options, ancestors, &mut report)
                        .await
                } else {
                    self.toolchain
                        .fetch_package(&record.uri, project_root)
                        .await
                        .map(|()| report.fetched.push(name.clone()))
                };

                if let Err(error) = result {
                    if matches!(
                        error.downcast_ref::<GopkError>(),
                        Some(GopkError::DependencyCycle { .. })
                    ) {
                        return Err(error);
                    }
                    warn!("Failed to restore {}: {:#}", name, error);
                    report.failures.push(PackageFailure {
                        package: name.clone(),
                        error,
                    });
                }
            }

            Ok(report)
        }
        .boxed()
    }

    async fn restore_private(
        &self,
        name: &str,
        record: &PackageRecord,
        options: &RestoreOptions,
        ancestors: &mut Vec<PathBuf>,
        report: &mut RestoreReport,
    ) -> Result<()> {
        let package_dir = self.cache.path_for(name);
        if ancestors.contains(&package_dir) {
            return Err(GopkError::DependencyCycle {
                name: name.to_string(),
                root: package_dir,
            }
            .into());
        }

        if options.update && self.cache.exists(name) {
            self.cache.evict(name)?;
        }

        if self.cache.exists(name) {
            debug!("{} already cached at {:?}", name, package_dir);
            report.reused.push(name.to_string());
        } else {
            self.cache
                .materialize(self.toolchain, &record.uri, name)
                .await?;
            report.cloned.push(name.to_string());

            if let Some(nested) = self.restore_nested(&package_dir, options, ancestors).await? {
                report.nested.push(name.to_string());
                report.absorb(name, nested);
            }
        }

        if options.tidy
            && let Err(e) = self.toolchain.tidy(&package_dir).await
        {
            warn!("Failed to tidy {}: {:#}", name, e);
        }

        Ok(())
    }

    async fn restore_nested(
        &self,
        package_dir: &Path,
        options: &RestoreOptions,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<Option<RestoreReport>> {
        let store = ManifestStore::new(self.runtime, package_dir);
        if !store.exists() {
            return Ok(None);
        }

        let nested = store.load()?;
        if ancestors.iter().any(|root| root == package_dir) {
            return Err(GopkError::DependencyCycle {
                name: nested.name,
                root: package_dir.to_path_buf(),
            }
            .into());
        }

        info!("Restoring nested project {} in {}", nested.name, package_dir.display());
        if !self.runtime.exists(&package_dir.join(BUILD_FILE_NAME)) {
            self.toolchain.init_module(&nested.name, package_dir).await?;
        }

        let nested_options = options.for_nested();
        ancestors.push(package_dir.to_path_buf());
        let result = self
            .restore_packages(package_dir, &nested, &nested_options, ancestors)
            .await;
        ancestors.pop();
        let report = result?;

        BuildFileSynchronizer::new(self.runtime, package_dir, self.cache.root())
            .synchronize(&nested)?;

        Ok(Some(report))
    }
}
