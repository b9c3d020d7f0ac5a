use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    manifest::ManifestStore,
    runtime::{ProcessRunner, Runtime},
    toolchain::Toolchain,
};

use super::paths::{default_cache_root, resolve_project_root};

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub toolchain: Toolchain,
    pub project_root: PathBuf,
    pub cache_root: PathBuf,
}

impl<R: Runtime> Config<R> {
    pub fn new(
        runtime: R,
        runner: Arc<dyn ProcessRunner>,
        project: Option<PathBuf>,
        cache_root: Option<PathBuf>,
        go: &str,
        git: &str,
    ) -> Result<Self> {
        let project_root = resolve_project_root(&runtime, project)?;
        let cache_root = match cache_root {
            Some(path) => path,
            None => default_cache_root(&runtime)?,
        };
        debug!(
            "Project root: {:?}, cache root: {:?}, go: {}, git: {}",
            project_root, cache_root, go, git
        );

        Ok(Self {
            runtime,
            toolchain: Toolchain::new(runner, go, git),
            project_root,
            cache_root,
        })
    }

    pub fn manifest_store(&self) -> ManifestStore<'_, R> {
        ManifestStore::new(&self.runtime, &self.project_root)
    }
}
