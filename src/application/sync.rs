//! Combined write-back of `go.mod` and the manifest.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::buildfile::{BUILD_FILE_NAME, Override, reconcile};
use crate::cache::PackageCache;
use crate::manifest::{Manifest, ManifestStore};
use crate::runtime::{Runtime, write_atomic};

/// Rewrites the generated `replace`/`require` block of `go.mod` and persists
/// the manifest next to it.
pub struct BuildFileSynchronizer<'a, R: Runtime> {
    runtime: &'a R,
    store: ManifestStore<'a, R>,
    cache: PackageCache<'a, R>,
}

impl<'a, R: Runtime> BuildFileSynchronizer<'a, R> {
    pub fn new(runtime: &'a R, project_root: &Path, cache_root: &Path) -> Self {
        Self {
            runtime,
            store: ManifestStore::new(runtime, project_root),
            cache: PackageCache::new(runtime, cache_root),
        }
    }

    pub fn build_file_path(&self) -> PathBuf {
        self.store.project_root().join(BUILD_FILE_NAME)
    }

    /// One override per private package, in manifest order.
    pub fn overrides(&self, manifest: &Manifest) -> Vec<Override> {
        manifest
            .private_packages()
            .map(|(name, _)| Override::new(name.as_str(), self.cache.path_for(name)))
            .collect()
    }

    /// Everything is computed in memory first; a malformed `go.mod` aborts
    /// before either file is touched.
    #[tracing::instrument(skip(self, manifest), fields(module = %manifest.name))]
    pub fn synchronize(&self, manifest: &Manifest) -> Result<()> {
        let build_file = self.build_file_path();
        if !self.runtime.exists(&build_file) {
            anyhow::bail!(
                "No {} found in {}. Run `gopk restore` to create it.",
                BUILD_FILE_NAME,
                self.store.project_root().display()
            );
        }

        let content = self
            .runtime
            .read_to_string(&build_file)
            .with_context(|| format!("Failed to read {:?}", build_file))?;
        let overrides = self.overrides(manifest);
        let rewritten = reconcile(&content, &overrides)?;
        let manifest_json = ManifestStore::<R>::render(manifest)?;

        debug!(
            "Writing {} override(s) to {:?}",
            overrides.len(),
            build_file
        );
        write_atomic(self.runtime, &build_file, rewritten.as_bytes())
            .with_context(|| format!("Failed to write {:?}", build_file))?;

        let manifest_path = self.store.manifest_path();
        write_atomic(self.runtime, &manifest_path, manifest_json.as_bytes())
            .with_context(|| format!("Failed to save manifest to {:?}", manifest_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GopkError;
    use crate::manifest::PackageRecord;
    use crate::runtime::RealRuntime;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _dir: TempDir,
        project: PathBuf,
        cache: PathBuf,
    }

    fn fixture(go_mod: &str) -> Fixture {
        let dir = tempdir().unwrap();
        let project = dir.path().join("app");
        let cache = dir.path().join("cache");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("go.mod"), go_mod).unwrap();
        Fixture {
            _dir: dir,
            project,
            cache,
        }
    }

    fn manifest_with(private: &[&str]) -> Manifest {
        let mut manifest = Manifest::new("example.com/app", "v0.1.0").unwrap();
        manifest
            .insert(
                "github.com/pkg/errors",
                PackageRecord {
                    uri: "github.com/pkg/errors".into(),
                    private: false,
                },
            )
            .unwrap();
        for name in private {
            manifest
                .insert(
                    name,
                    PackageRecord {
                        uri: format!("git@git.example.com:team/{}.git", name),
                        private: true,
                    },
                )
                .unwrap();
        }
        manifest
    }

    #[test]
    fn test_second_run_is_byte_identical() {
        let fx = fixture("module example.com/app\n\ngo 1.22\n");
        let sync = BuildFileSynchronizer::new(&RealRuntime, &fx.project, &fx.cache);
        let manifest = manifest_with(&["auth", "billing"]);

        sync.synchronize(&manifest).unwrap();
        let first = fs::read(fx.project.join("go.mod")).unwrap();
        sync.synchronize(&manifest).unwrap();
        let second = fs::read(fx.project.join("go.mod")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_swaps_removed_package_for_new_one() {
        let fx = fixture("");
        let foo_path = fx.cache.join("foo");
        fs::write(
            fx.project.join("go.mod"),
            format!(
                "module example.com/app\n// pinned by hand\nreplace foo => \"{}\"\nrequire foo v1.0.0\n",
                foo_path.display()
            ),
        )
        .unwrap();

        let sync = BuildFileSynchronizer::new(&RealRuntime, &fx.project, &fx.cache);
        sync.synchronize(&manifest_with(&["bar"])).unwrap();

        let go_mod = fs::read_to_string(fx.project.join("go.mod")).unwrap();
        assert!(go_mod.contains("// pinned by hand\n"));
        assert!(!go_mod.contains("replace foo"));
        assert!(!go_mod.contains("require foo"));
        let bar_line = Override::new("bar", fx.cache.join("bar")).override_line();
        assert_eq!(go_mod.matches(&bar_line).count(), 1);
        assert_eq!(go_mod.matches("require bar v1.0.0").count(), 1);

        let saved = ManifestStore::new(&RealRuntime, &fx.project).load().unwrap();
        assert_eq!(saved, manifest_with(&["bar"]));
    }

    #[test]
    fn test_malformed_build_file_is_left_untouched() {
        let original = "module example.com/app\nreplace foo => a => b\n";
        let fx = fixture(original);

        let sync = BuildFileSynchronizer::new(&RealRuntime, &fx.project, &fx.cache);
        let err = sync.synchronize(&manifest_with(&["bar"])).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GopkError>(),
            Some(GopkError::MalformedBuildFile { .. })
        ));
        assert_eq!(fs::read_to_string(fx.project.join("go.mod")).unwrap(), original);
        assert!(!fx.project.join("package.json").exists());
    }

    #[test]
    fn test_missing_build_file() {
        let fx = fixture("");
        fs::remove_file(fx.project.join("go.mod")).unwrap();

        let sync = BuildFileSynchronizer::new(&RealRuntime, &fx.project, &fx.cache);
        let err = sync.synchronize(&manifest_with(&[])).unwrap_err();

        assert!(err.to_string().contains("No go.mod found"));
        assert!(!fx.project.join("package.json").exists());
    }

    #[test]
    fn test_overrides_only_cover_private_packages() {
        let fx = fixture("");
        let sync = BuildFileSynchronizer::new(&RealRuntime, &fx.project, &fx.cache);

        let overrides = sync.overrides(&manifest_with(&["auth"]));
        assert_eq!(overrides, vec![Override::new("auth", fx.cache.join("auth"))]);
    }
}
